use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 報表輸出的存儲介面，路徑相對於存儲根目錄
#[async_trait]
pub trait Storage: Send + Sync {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn connect_base_url(&self) -> &str;
    fn poll_interval(&self) -> Duration;
    fn max_ready_attempts(&self) -> Option<u32>;
    fn request_timeout(&self) -> Duration;
    fn reports_output_path(&self) -> &str;
}
