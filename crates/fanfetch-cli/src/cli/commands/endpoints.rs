//! `fanfetch endpoints` – show the endpoint pool.

use anyhow::Result;
use fanfetch_core::config::FanfetchConfig;

pub fn run_endpoints(cfg: &FanfetchConfig) -> Result<()> {
    let pool = cfg.endpoint_pool()?;
    println!("{:<6} {}", "INDEX", "ENDPOINT");
    for (i, endpoint) in pool.iter().enumerate() {
        println!("{:<6} {}", i, endpoint);
    }
    Ok(())
}
