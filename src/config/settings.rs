use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OpsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_COMPOSE_FILE: &str = "./docker-compose-kraft.yaml";

/// 部署環境，控制預設的日誌詳細程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Local,
    Dev,
    #[default]
    Prod,
}

impl Environment {
    pub fn title(&self) -> &'static str {
        match self {
            Environment::Local => "Local environment",
            Environment::Dev => "Development environment",
            Environment::Prod => "Production environment",
        }
    }

    pub fn debug_by_default(&self) -> bool {
        !matches!(self, Environment::Prod)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub connect: ConnectSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub connectors: Vec<ConnectorEntry>,
    #[serde(default)]
    pub docker: DockerSettings,
    pub appsflyer: Option<AppsFlyerSettings>,
    #[serde(default)]
    pub reports: ReportSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// 未設定時無限輪詢
    pub max_ready_attempts: Option<u32>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for ConnectSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_seconds: default_poll_interval(),
            max_ready_attempts: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerSettings {
    #[serde(default)]
    pub launch: bool,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorEntry {
    pub name: String,
    pub config_file: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockerSettings {
    pub compose_file: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AppsFlyerSettings {
    #[serde(default = "default_appsflyer_api_url")]
    pub api_url: String,
    pub token: String,
    pub application_id_ios: String,
    pub application_id_android: String,
}

// token 不能出現在日誌裡
impl std::fmt::Debug for AppsFlyerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppsFlyerSettings")
            .field("api_url", &self.api_url)
            .field("token", &"***")
            .field("application_id_ios", &self.application_id_ios)
            .field("application_id_android", &self.application_id_android)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    #[serde(default = "default_reports_output")]
    pub output_path: String,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_interval")]
    pub retry_interval_seconds: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_path: default_reports_output(),
            retry_attempts: default_retry_attempts(),
            retry_interval_seconds: default_retry_interval(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8083".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_appsflyer_api_url() -> String {
    "https://hq1.appsflyer.com/api".to_string()
}

fn default_reports_output() -> String {
    "./reports".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_interval() -> u64 {
    3
}

impl Settings {
    /// 從 TOML 檔案載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OpsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 先處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OpsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${APPSFLYER_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("connect.base_url", &self.connect.base_url)?;
        validation::validate_positive_number(
            "connect.poll_interval_seconds",
            self.connect.poll_interval_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "connect.request_timeout_seconds",
            self.connect.request_timeout_seconds,
            1,
        )?;

        if let Some(attempts) = self.connect.max_ready_attempts {
            validation::validate_positive_number(
                "connect.max_ready_attempts",
                u64::from(attempts),
                1,
            )?;
        }

        if self.worker.launch {
            validation::validate_non_empty_string("worker.command", &self.worker.command)?;
        }

        for connector in &self.connectors {
            validation::validate_non_empty_string("connectors.name", &connector.name)?;
            validation::validate_path("connectors.config_file", &connector.config_file)?;
            validation::validate_file_extension(
                "connectors.config_file",
                &connector.config_file,
                "json",
            )?;
        }

        if let Some(compose_file) = &self.docker.compose_file {
            validation::validate_path("docker.compose_file", compose_file)?;
        }

        if let Some(appsflyer) = &self.appsflyer {
            validation::validate_url("appsflyer.api_url", &appsflyer.api_url)?;
            validation::validate_non_empty_string("appsflyer.token", &appsflyer.token)?;
            validation::validate_non_empty_string(
                "appsflyer.application_id_ios",
                &appsflyer.application_id_ios,
            )?;
            validation::validate_non_empty_string(
                "appsflyer.application_id_android",
                &appsflyer.application_id_android,
            )?;
        }

        validation::validate_path("reports.output_path", &self.reports.output_path)?;
        validation::validate_positive_number(
            "reports.retry_attempts",
            u64::from(self.reports.retry_attempts),
            1,
        )?;
        validation::validate_positive_number(
            "reports.retry_interval_seconds",
            self.reports.retry_interval_seconds,
            1,
        )?;

        Ok(())
    }

    pub fn is_debug(&self) -> bool {
        self.environment.debug_by_default()
    }

    /// pull-reports 需要 [appsflyer] 區段
    pub fn appsflyer(&self) -> Result<&AppsFlyerSettings> {
        self.appsflyer
            .as_ref()
            .ok_or_else(|| OpsError::MissingConfigError {
                field: "appsflyer".to_string(),
            })
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.reports.retry_interval_seconds)
    }
}

impl ConfigProvider for Settings {
    fn connect_base_url(&self) -> &str {
        &self.connect.base_url
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.connect.poll_interval_seconds)
    }

    fn max_ready_attempts(&self) -> Option<u32> {
        self.connect.max_ready_attempts
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.connect.request_timeout_seconds)
    }

    fn reports_output_path(&self) -> &str {
        &self.reports.output_path
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_settings() {
        let toml_content = r#"
environment = "dev"

[connect]
base_url = "http://connect:8083"
poll_interval_seconds = 2

[[connectors]]
name = "installs-sink"
config_file = "./connectors/installs-sink.json"

[[connectors]]
name = "events-sink"
config_file = "./connectors/events-sink.json"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.environment, Environment::Dev);
        assert!(settings.is_debug());
        assert_eq!(settings.connect.base_url, "http://connect:8083");
        assert_eq!(settings.connect.poll_interval_seconds, 2);
        assert!(settings.connect.max_ready_attempts.is_none());
        assert_eq!(settings.connectors.len(), 2);
        assert_eq!(settings.connectors[0].name, "installs-sink");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_defaults_from_empty_settings() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings.environment, Environment::Prod);
        assert!(!settings.is_debug());
        assert_eq!(settings.connect.base_url, "http://localhost:8083");
        assert_eq!(settings.connect.poll_interval_seconds, 5);
        assert_eq!(settings.connect.request_timeout_seconds, 10);
        assert_eq!(settings.reports.output_path, "./reports");
        assert_eq!(settings.reports.retry_attempts, 3);
        assert!(settings.connectors.is_empty());
        assert!(settings.appsflyer.is_none());
        assert!(settings.appsflyer().is_err());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_AF_TOKEN", "secret-token");

        let toml_content = r#"
[appsflyer]
token = "${TEST_AF_TOKEN}"
application_id_ios = "id123456789"
application_id_android = "com.example.app"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.appsflyer().unwrap().token, "secret-token");

        std::env::remove_var("TEST_AF_TOKEN");
    }

    #[test]
    fn test_unset_env_var_left_verbatim() {
        let toml_content = r#"
[appsflyer]
token = "${DEFINITELY_NOT_SET_ANYWHERE}"
application_id_ios = "id123456789"
application_id_android = "com.example.app"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(
            settings.appsflyer().unwrap().token,
            "${DEFINITELY_NOT_SET_ANYWHERE}"
        );
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let toml_content = r#"
[connect]
base_url = "not-a-url"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_non_json_connector_config() {
        let toml_content = r#"
[[connectors]]
name = "installs-sink"
config_file = "./connectors/installs-sink.yaml"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_launch_without_command() {
        let toml_content = r#"
[worker]
launch = true
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[connect]
base_url = "http://localhost:18083"
max_ready_attempts = 12
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.connect.base_url, "http://localhost:18083");
        assert_eq!(settings.connect.max_ready_attempts, Some(12));
    }

    #[test]
    fn test_appsflyer_token_redacted_in_debug() {
        let appsflyer = AppsFlyerSettings {
            api_url: default_appsflyer_api_url(),
            token: "very-secret".to_string(),
            application_id_ios: "id123456789".to_string(),
            application_id_android: "com.example.app".to_string(),
        };

        let rendered = format!("{:?}", appsflyer);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("***"));
    }
}
