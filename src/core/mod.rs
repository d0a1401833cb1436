pub mod bootstrap;
pub mod client;
pub mod compose;
pub mod readiness;
pub mod reports;

pub use crate::domain::model::{ConnectorStatus, PluginInfo, ReportKind};
pub use crate::domain::ports::{ConfigProvider, Storage};
pub use crate::utils::error::Result;
