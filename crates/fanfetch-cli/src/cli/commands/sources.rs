//! `fanfetch sources` – show configured sources.

use anyhow::Result;
use fanfetch_core::config::FanfetchConfig;

pub fn run_sources(cfg: &FanfetchConfig) -> Result<()> {
    let plan = cfg.plan()?;
    if plan.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }
    let width = plan
        .sources
        .iter()
        .map(|s| s.id().as_str().len())
        .max()
        .unwrap_or(0)
        .max("SOURCE".len());
    println!("{:<width$} {:<12} {}", "SOURCE", "CREDENTIALS", "URL");
    for s in &plan.sources {
        // Field names only; values stay out of the terminal.
        let fields: Vec<&str> = s.credentials().iter().map(|(k, _)| k).collect();
        let creds = if fields.is_empty() {
            "-".to_string()
        } else {
            fields.join(",")
        };
        println!("{:<width$} {:<12} {}", s.id().as_str(), creds, s.url());
    }
    Ok(())
}
