use serde::{Deserialize, Serialize};

/// `GET /connectors/{name}/status` 的回應
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub name: String,
    pub connector: InstanceState,
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
    #[serde(rename = "type")]
    pub connector_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceState {
    pub state: String,
    pub worker_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: u32,
    pub state: String,
    pub worker_id: String,
    pub trace: Option<String>,
}

impl ConnectorStatus {
    pub fn running_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.state == "RUNNING").count()
    }

    pub fn is_healthy(&self) -> bool {
        self.connector.state == "RUNNING" && self.running_tasks() == self.tasks.len()
    }
}

/// `GET /connector-plugins` 的單一項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    pub class: String,
    #[serde(rename = "type")]
    pub plugin_type: Option<String>,
    pub version: Option<String>,
}

/// AppsFlyer raw-data 匯出端點的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Installs,
    InAppEvents,
    OrganicInstalls,
    OrganicInAppEvents,
}

impl ReportKind {
    pub const ALL: [ReportKind; 4] = [
        ReportKind::Installs,
        ReportKind::InAppEvents,
        ReportKind::OrganicInstalls,
        ReportKind::OrganicInAppEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Installs => "installs_report",
            ReportKind::InAppEvents => "in_app_events_report",
            ReportKind::OrganicInstalls => "organic_installs_report",
            ReportKind::OrganicInAppEvents => "organic_in_app_events_report",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單一報表下載的目標：一個 (application id × report kind) 組合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReference {
    pub url: String,
    pub application_id: String,
    pub kind: ReportKind,
}

/// 已存檔的報表
#[derive(Debug, Clone)]
pub struct SavedReport {
    pub filename: String,
    pub application_id: String,
    pub kind: ReportKind,
    pub records: usize,
}
