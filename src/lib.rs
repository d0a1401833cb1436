pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{Cli, Command, DockerAction};

pub use crate::adapters::LocalStorage;
pub use crate::config::settings::Settings;
pub use crate::core::bootstrap::Bootstrapper;
pub use crate::core::client::ConnectClient;
pub use crate::core::compose::ComposeRunner;
pub use crate::core::readiness::ReadinessProbe;
pub use crate::core::reports::{ReportPlan, ReportPuller, ReportWindow};
pub use crate::utils::error::{OpsError, Result};
