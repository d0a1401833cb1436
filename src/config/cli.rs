use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "connect-ops")]
#[command(about = "Deployment and operations tooling for a Kafka Connect cluster")]
pub struct Cli {
    #[arg(long, default_value = "./connect-ops.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Enable resource monitoring")]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the worker, wait for the REST API, submit all connector configs
    Bootstrap {
        #[arg(long, help = "Do not spawn the worker process even if [worker].launch is set")]
        skip_worker: bool,
    },
    /// Submit every configured connector config without launching or waiting
    Apply,
    /// List installed connector plugins
    Plugins,
    /// List active connectors
    Connectors,
    /// Show the status of a connector
    Status { connector: String },
    /// Show the current configuration of a connector
    Config { connector: String },
    /// Delete a connector
    Delete { connector: String },
    /// docker-compose lifecycle for the local deployment
    Docker {
        #[command(subcommand)]
        action: DockerAction,

        #[arg(long, help = "Compose file (overrides COMPOSE_FILE and the settings file)")]
        compose_file: Option<String>,
    },
    /// Pull AppsFlyer raw-data reports
    PullReports {
        #[arg(long, help = "Window start (YYYY-MM-DD), defaults to yesterday")]
        from: Option<String>,

        #[arg(long, help = "Window end (YYYY-MM-DD), defaults to the day before the start")]
        to: Option<String>,

        #[arg(long, help = "Bundle the pulled reports into a ZIP archive")]
        archive: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum DockerAction {
    Build,
    Up,
    Down,
}
