pub mod config;
pub mod core;
pub mod domain;
pub mod prompt;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::cli::LocalStorage;
pub use config::manifest::PackageManifest;
pub use config::toml_config::{TutorConfig, TutorSettings};
pub use core::{agent_client::AgentServerClient, tutor::RunbookTutor};
pub use utils::error::{Result, TutorError};
