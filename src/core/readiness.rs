use crate::core::client::ConnectClient;
use crate::utils::error::{OpsError, Result};
use std::time::Duration;

/// 以固定間隔輪詢 REST API 直到就緒。
///
/// 刻意不做退避或抖動：原部署腳本就是固定間隔的輪詢，
/// 預設也不設次數上限（`max_attempts = None` 表示永遠等下去）。
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    interval: Duration,
    max_attempts: Option<u32>,
}

impl ReadinessProbe {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// 回傳實際用掉的嘗試次數
    pub async fn wait_until_ready(&self, client: &ConnectClient) -> Result<u32> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            if client.is_ready().await {
                tracing::info!(
                    "Connect REST API at {} is ready (attempt {})",
                    client.base_url(),
                    attempt
                );
                return Ok(attempt);
            }

            if let Some(max) = self.max_attempts {
                if attempt >= max {
                    return Err(OpsError::ReadinessTimeout { attempts: attempt });
                }
            }

            tracing::info!(
                "Connect REST API not ready yet (attempt {}), retrying in {:?}",
                attempt,
                self.interval
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}
