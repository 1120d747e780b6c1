//! CLI command handlers, one file per subcommand.

mod config_path;
mod endpoints;
mod run;
mod sources;

pub use config_path::run_config_path;
pub use endpoints::run_endpoints;
pub use run::run_fetch;
pub use sources::run_sources;
