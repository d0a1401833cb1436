use crate::config::settings::{Settings, DEFAULT_COMPOSE_FILE};
use crate::utils::error::{OpsError, Result};
use tokio::process::Command;

pub const COMPOSE_FILE_ENV: &str = "COMPOSE_FILE";

/// docker-compose 生命週期的封裝
#[derive(Debug, Clone)]
pub struct ComposeRunner {
    compose_file: String,
}

impl ComposeRunner {
    pub fn new(compose_file: String) -> Self {
        Self { compose_file }
    }

    /// 解析 compose 檔路徑：CLI 參數 > COMPOSE_FILE 環境變數 > 設定檔 > 預設值
    pub fn resolve(cli_override: Option<String>, settings: &Settings) -> Self {
        let compose_file = cli_override
            .or_else(|| std::env::var(COMPOSE_FILE_ENV).ok())
            .or_else(|| settings.docker.compose_file.clone())
            .unwrap_or_else(|| DEFAULT_COMPOSE_FILE.to_string());

        Self { compose_file }
    }

    pub fn compose_file(&self) -> &str {
        &self.compose_file
    }

    pub async fn build(&self) -> Result<()> {
        self.run(&["build"]).await
    }

    pub async fn up(&self) -> Result<()> {
        self.run(&["up", "-d"]).await
    }

    pub async fn down(&self) -> Result<()> {
        self.run(&["down"]).await
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let rendered = format!(
            "docker-compose -f {} {}",
            self.compose_file,
            args.join(" ")
        );
        tracing::info!("Running: {}", rendered);

        let status = Command::new("docker-compose")
            .arg("-f")
            .arg(&self.compose_file)
            .args(args)
            .status()
            .await?;

        if !status.success() {
            return Err(OpsError::CommandFailed {
                command: rendered,
                code: status.code(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_compose(compose_file: Option<&str>) -> Settings {
        let toml = match compose_file {
            Some(path) => format!("[docker]\ncompose_file = \"{}\"\n", path),
            None => String::new(),
        };
        Settings::from_toml_str(&toml).unwrap()
    }

    #[test]
    fn test_resolution_precedence() {
        std::env::remove_var(COMPOSE_FILE_ENV);

        // 預設值
        let runner = ComposeRunner::resolve(None, &settings_with_compose(None));
        assert_eq!(runner.compose_file(), DEFAULT_COMPOSE_FILE);

        // 設定檔優先於預設值
        let runner = ComposeRunner::resolve(None, &settings_with_compose(Some("./from-toml.yaml")));
        assert_eq!(runner.compose_file(), "./from-toml.yaml");

        // 環境變數優先於設定檔
        std::env::set_var(COMPOSE_FILE_ENV, "./from-env.yaml");
        let runner = ComposeRunner::resolve(None, &settings_with_compose(Some("./from-toml.yaml")));
        assert_eq!(runner.compose_file(), "./from-env.yaml");

        // CLI 參數優先於環境變數
        let runner = ComposeRunner::resolve(
            Some("./from-flag.yaml".to_string()),
            &settings_with_compose(Some("./from-toml.yaml")),
        );
        assert_eq!(runner.compose_file(), "./from-flag.yaml");

        std::env::remove_var(COMPOSE_FILE_ENV);
    }
}
