use clap::Parser;
use connect_ops::core::reports::{ReportPlan, ReportPuller, ReportWindow};
use connect_ops::core::ConfigProvider;
use connect_ops::utils::monitor::ResourceMonitor;
use connect_ops::utils::signal::shutdown_signal;
use connect_ops::utils::{logger, validation::Validate};
use connect_ops::{
    Bootstrapper, Cli, Command, ComposeRunner, ConnectClient, DockerAction, LocalStorage, OpsError,
    Result, Settings,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // 設定檔載入失敗時日誌還沒初始化，直接輸出到 stderr
    let settings = match Settings::from_file(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load settings from {}: {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(cli.verbose || settings.is_debug());

    tracing::info!(
        "Starting connect-ops ({})",
        settings.environment.title()
    );
    if cli.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    // 驗證設定
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if cli.monitor {
        tracing::info!("🔍 Resource monitoring enabled");
    }

    match run(&cli, settings).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                connect_ops::utils::error::ErrorSeverity::Low => 0,
                connect_ops::utils::error::ErrorSeverity::Medium => 2,
                connect_ops::utils::error::ErrorSeverity::High => 1,
                connect_ops::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run(cli: &Cli, settings: Settings) -> Result<()> {
    match &cli.command {
        Command::Bootstrap { skip_worker } => {
            let monitor = ResourceMonitor::new(cli.monitor);
            let mut bootstrapper =
                Bootstrapper::new(settings, monitor).with_skip_worker(*skip_worker);

            let report = bootstrapper.run().await?;
            println!(
                "✅ Bootstrap complete: {} connector(s) submitted after {} readiness attempt(s)",
                report.applied.len(),
                report.ready_after_attempts
            );
            for name in &report.applied {
                println!("📁 {}", name);
            }

            if bootstrapper.has_worker() {
                println!("🔍 Supervising Connect worker (Ctrl-C to stop)");
                bootstrapper.supervise().await?;
                println!("✅ Connect worker stopped");
            }
        }

        Command::Apply => {
            let monitor = ResourceMonitor::new(cli.monitor);
            let bootstrapper = Bootstrapper::new(settings, monitor);

            let applied = bootstrapper.apply_connectors().await?;
            println!("✅ Submitted {} connector config(s)", applied.len());
            for name in &applied {
                println!("📁 {}", name);
            }
        }

        Command::Plugins => {
            let client = connect_client(&settings);
            let plugins = client.list_plugins().await?;
            println!("{}", serde_json::to_string_pretty(&plugins)?);
        }

        Command::Connectors => {
            let client = connect_client(&settings);
            let connectors = client.list_connectors().await?;
            println!("{}", serde_json::to_string_pretty(&connectors)?);
        }

        Command::Status { connector } => {
            let client = connect_client(&settings);
            let status = client.connector_status(connector).await?;

            let marker = if status.is_healthy() { "✅" } else { "❌" };
            println!(
                "{} {} is {} ({}/{} tasks running)",
                marker,
                status.name,
                status.connector.state,
                status.running_tasks(),
                status.tasks.len()
            );
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Command::Config { connector } => {
            let client = connect_client(&settings);
            let config = client.connector_config(connector).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Command::Delete { connector } => {
            let client = connect_client(&settings);
            client.delete_connector(connector).await?;
            println!("✅ Connector deleted: {}", connector);
        }

        Command::Docker {
            action,
            compose_file,
        } => {
            let runner = ComposeRunner::resolve(compose_file.clone(), &settings);
            match action {
                DockerAction::Build => runner.build().await?,
                DockerAction::Up => runner.up().await?,
                DockerAction::Down => runner.down().await?,
            }
            println!("✅ docker-compose done ({})", runner.compose_file());
        }

        Command::PullReports { from, to, archive } => {
            let appsflyer = settings.appsflyer()?.clone();
            let window = ReportWindow::parse(from.as_deref(), to.as_deref())?;
            let plan = ReportPlan::new(&appsflyer);

            let monitor = ResourceMonitor::new(cli.monitor);
            let storage = LocalStorage::new(settings.reports.output_path.clone());
            let puller = ReportPuller::new(storage)
                .with_retry(settings.reports.retry_attempts, settings.retry_interval());

            let summary = tokio::select! {
                result = puller.pull(&plan, &window, *archive) => result?,
                _ = shutdown_signal() => return Err(OpsError::Interrupted),
            };
            monitor.log_summary();

            println!(
                "✅ Pulled {} report(s) ({} retry round(s))",
                summary.saved.len(),
                summary.retry_rounds
            );
            for report in &summary.saved {
                println!("📁 {} ({} records)", report.filename, report.records);
            }
            if let Some(archive) = &summary.archive {
                println!("📁 Archive: {}", archive);
            }
        }
    }

    Ok(())
}

fn connect_client(settings: &Settings) -> ConnectClient {
    ConnectClient::new(settings.connect_base_url(), settings.request_timeout())
}
