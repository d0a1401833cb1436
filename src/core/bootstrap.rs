use crate::config::settings::Settings;
use crate::core::client::ConnectClient;
use crate::core::readiness::ReadinessProbe;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OpsError, Result};
use crate::utils::monitor::ResourceMonitor;
use crate::utils::signal::shutdown_signal;
use tokio::process::{Child, Command};

#[derive(Debug)]
pub struct BootstrapReport {
    pub ready_after_attempts: u32,
    pub applied: Vec<String>,
    pub worker_pid: Option<u32>,
}

/// 部署引導：啟動 worker、等待 REST API、提交 connector 設定
pub struct Bootstrapper {
    settings: Settings,
    client: ConnectClient,
    monitor: ResourceMonitor,
    worker: Option<Child>,
    skip_worker: bool,
}

impl Bootstrapper {
    pub fn new(settings: Settings, monitor: ResourceMonitor) -> Self {
        let client = ConnectClient::new(settings.connect_base_url(), settings.request_timeout());

        Self {
            settings,
            client,
            monitor,
            worker: None,
            skip_worker: false,
        }
    }

    pub fn with_skip_worker(mut self, skip_worker: bool) -> Self {
        self.skip_worker = skip_worker;
        self
    }

    pub fn client(&self) -> &ConnectClient {
        &self.client
    }

    fn spawn_worker(&mut self) -> Result<Option<u32>> {
        if self.skip_worker || !self.settings.worker.launch {
            return Ok(None);
        }

        let worker = &self.settings.worker;
        tracing::info!(
            "Launching Connect worker: {} {}",
            worker.command,
            worker.args.join(" ")
        );

        let child = Command::new(&worker.command).args(&worker.args).spawn()?;
        let pid = child.id();
        self.worker = Some(child);
        Ok(pid)
    }

    /// 啟動 worker（如有設定）、等待就緒、依宣告順序提交每個 connector 設定恰好一次
    pub async fn run(&mut self) -> Result<BootstrapReport> {
        let worker_pid = self.spawn_worker()?;

        let probe = ReadinessProbe::new(self.settings.poll_interval())
            .with_max_attempts(self.settings.max_ready_attempts());
        let ready_after_attempts = probe.wait_until_ready(&self.client).await?;
        self.monitor.log_phase("REST API ready");

        let applied = self.apply_connectors().await?;
        self.monitor.log_phase("connectors applied");

        Ok(BootstrapReport {
            ready_after_attempts,
            applied,
            worker_pid,
        })
    }

    /// 設定檔內容原樣送出，不解析 connector 設定的結構
    pub async fn apply_connectors(&self) -> Result<Vec<String>> {
        let mut applied = Vec::with_capacity(self.settings.connectors.len());

        for connector in &self.settings.connectors {
            let body = std::fs::read_to_string(&connector.config_file)?;
            tracing::info!(
                "Submitting connector config: {} ({})",
                connector.name,
                connector.config_file
            );

            self.client
                .put_connector_config(&connector.name, &body)
                .await?;
            applied.push(connector.name.clone());
        }

        Ok(applied)
    }

    pub fn has_worker(&self) -> bool {
        self.worker.is_some()
    }

    /// 監看已啟動的 worker：worker 自行退出視為錯誤，收到關閉訊號則將其停掉
    pub async fn supervise(&mut self) -> Result<()> {
        let Some(worker) = self.worker.as_mut() else {
            return Ok(());
        };

        let outcome = tokio::select! {
            status = worker.wait() => Some(status),
            _ = shutdown_signal() => None,
        };

        match outcome {
            Some(status) => {
                let status = status?;
                Err(OpsError::WorkerExited {
                    code: status.code(),
                })
            }
            None => {
                tracing::info!("Shutdown signal received, stopping Connect worker");
                worker.kill().await?;
                Ok(())
            }
        }
    }
}
