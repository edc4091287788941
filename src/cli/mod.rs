//! CLI commands for Drill.
//!
//! - **run**: interactive drill session on stdin/stdout
//! - **catalog**: list the items a session would drill
//! - **init**: write a default project config

pub mod catalog_cmd;
pub mod init;
pub mod run;

pub use catalog_cmd::{load_catalog, CatalogCommand};
pub use init::InitCommand;
pub use run::RunCommand;
