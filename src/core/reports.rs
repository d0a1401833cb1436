use crate::config::settings::AppsFlyerSettings;
use crate::domain::model::{ReportKind, ReportReference, SavedReport};
use crate::domain::ports::Storage;
use crate::utils::error::{OpsError, Result};
use chrono::{Days, Local, NaiveDate};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION};
use std::io::Write;
use std::time::Duration;
use tokio::task::JoinSet;
use zip::write::{FileOptions, ZipWriter};

pub const ADDITIONAL_FIELDS: &str = "match_type";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 報表的日期區間。預設沿用原始工具的參數順序：from = 昨天、to = 前天
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn default_window() -> Self {
        let from = Local::now().date_naive() - Days::new(1);
        let to = from - Days::new(1);
        Self { from, to }
    }

    /// 解析 CLI 的 --from / --to，缺省時補上預設日期
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let parse_date = |field: &str, value: &str| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
                OpsError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: value.to_string(),
                    reason: format!("Expected YYYY-MM-DD: {}", e),
                }
            })
        };

        let from = match from {
            Some(value) => parse_date("from", value)?,
            None => Local::now().date_naive() - Days::new(1),
        };
        let to = match to {
            Some(value) => parse_date("to", value)?,
            None => from - Days::new(1),
        };

        Ok(Self { from, to })
    }

    pub fn label(&self) -> String {
        format!(
            "{}_{}",
            self.from.format(DATE_FORMAT),
            self.to.format(DATE_FORMAT)
        )
    }
}

/// 由 [appsflyer] 設定展開所有要下載的報表位址
#[derive(Debug, Clone)]
pub struct ReportPlan {
    api_url: String,
    token: String,
    application_ids: Vec<String>,
}

impl ReportPlan {
    pub fn new(settings: &AppsFlyerSettings) -> Self {
        Self {
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            application_ids: vec![
                settings.application_id_ios.clone(),
                settings.application_id_android.clone(),
            ],
        }
    }

    /// 每個 (application id × report kind) 一個下載目標
    pub fn references(&self, window: &ReportWindow) -> Vec<ReportReference> {
        let mut references = Vec::with_capacity(self.application_ids.len() * ReportKind::ALL.len());

        for application_id in &self.application_ids {
            for kind in ReportKind::ALL {
                let url = format!(
                    "{}/raw-data/export/app/{}/{}/v5?from={}&to={}&additional_fields={}",
                    self.api_url,
                    application_id,
                    kind,
                    window.from.format(DATE_FORMAT),
                    window.to.format(DATE_FORMAT),
                    ADDITIONAL_FIELDS
                );
                references.push(ReportReference {
                    url,
                    application_id: application_id.clone(),
                    kind,
                });
            }
        }

        references
    }

    fn bearer_token(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Debug)]
pub struct PullSummary {
    pub saved: Vec<SavedReport>,
    pub retry_rounds: u32,
    pub archive: Option<String>,
}

/// 並發下載報表，失敗的目標分輪重試，輪數用完即放棄
pub struct ReportPuller<S> {
    storage: S,
    http: reqwest::Client,
    retry_attempts: u32,
    retry_interval: Duration,
}

impl<S: Storage> ReportPuller<S> {
    pub fn new(storage: S) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(6))
            .build()
            .expect("failed to build HTTP client");

        Self {
            storage,
            http,
            retry_attempts: 3,
            retry_interval: Duration::from_secs(3),
        }
    }

    pub fn with_retry(mut self, attempts: u32, interval: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_interval = interval;
        self
    }

    pub async fn pull(
        &self,
        plan: &ReportPlan,
        window: &ReportWindow,
        archive: bool,
    ) -> Result<PullSummary> {
        let mut pending = plan.references(window);
        let mut saved: Vec<SavedReport> = Vec::new();
        let mut retry_rounds: u32 = 0;

        tracing::info!(
            "Pulling {} reports for window {}..{}",
            pending.len(),
            window.from,
            window.to
        );

        loop {
            let (done, failed) = self.fetch_round(plan, window, pending).await?;
            saved.extend(done);

            if failed.is_empty() {
                tracing::info!("All reports have been retrieved successfully");
                break;
            }

            if retry_rounds >= self.retry_attempts {
                tracing::error!(
                    "{} reports still pending after {} retry rounds",
                    failed.len(),
                    retry_rounds
                );
                return Err(OpsError::TooManyRetries {
                    attempts: retry_rounds,
                });
            }

            retry_rounds += 1;
            tracing::info!(
                "Retrying {} pending reports, round {}",
                failed.len(),
                retry_rounds
            );
            tokio::time::sleep(self.retry_interval).await;
            pending = failed;
        }

        let archive = if archive {
            Some(self.archive(window, &saved).await?)
        } else {
            None
        };

        Ok(PullSummary {
            saved,
            retry_rounds,
            archive,
        })
    }

    /// 一輪下載：全部並發送出，成功的存檔，失敗的原樣帶回去重試
    async fn fetch_round(
        &self,
        plan: &ReportPlan,
        window: &ReportWindow,
        references: Vec<ReportReference>,
    ) -> Result<(Vec<SavedReport>, Vec<ReportReference>)> {
        let mut join_set = JoinSet::new();

        for reference in references {
            let http = self.http.clone();
            let auth = plan.bearer_token();
            let fallback = fallback_filename(&reference, window);

            join_set.spawn(async move {
                let outcome = fetch_one(&http, &auth, &reference, fallback).await;
                (reference, outcome)
            });
        }

        let mut fetched = Vec::new();
        let mut failed = Vec::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((reference, Ok((filename, body)))) => fetched.push((reference, filename, body)),
                Ok((reference, Err(e))) => {
                    tracing::warn!(
                        "Report fetch failed for {}/{}: {}",
                        reference.application_id,
                        reference.kind,
                        e
                    );
                    failed.push(reference);
                }
                Err(e) => {
                    tracing::warn!("Report fetch task failed to complete: {}", e);
                }
            }
        }

        // 下載完成的才寫檔，和原始工具一樣先收齊再處理
        let mut saved = Vec::with_capacity(fetched.len());
        for (reference, filename, body) in fetched {
            let path = format!("unprocessed/{}", filename);
            self.storage.write_file(&path, &body).await?;

            let records = count_csv_records(&body);
            tracing::info!("CSV report saved: {} ({} records)", filename, records);

            saved.push(SavedReport {
                filename,
                application_id: reference.application_id,
                kind: reference.kind,
                records,
            });
        }

        Ok((saved, failed))
    }

    /// 把本次存下的報表打包成一個 ZIP
    async fn archive(&self, window: &ReportWindow, saved: &[SavedReport]) -> Result<String> {
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for report in saved {
                let data = self
                    .storage
                    .read_file(&format!("unprocessed/{}", report.filename))
                    .await?;
                zip.start_file::<_, ()>(report.filename.as_str(), FileOptions::default())?;
                zip.write_all(&data)?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        let archive_path = format!("archive/{}.zip", window.label());
        self.storage.write_file(&archive_path, &zip_data).await?;
        tracing::info!("Report archive saved: {}", archive_path);

        Ok(archive_path)
    }
}

async fn fetch_one(
    http: &reqwest::Client,
    auth: &str,
    reference: &ReportReference,
    fallback: String,
) -> Result<(String, Vec<u8>)> {
    let response = http
        .get(&reference.url)
        .header(ACCEPT, "text/csv")
        .header(AUTHORIZATION, auth)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(OpsError::UnexpectedStatus {
            endpoint: reference.url.clone(),
            status: status.as_u16(),
            body,
        });
    }

    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_attachment_filename)
        .unwrap_or(fallback);

    let body = response.bytes().await?.to_vec();
    Ok((filename, body))
}

/// Content-Disposition 裡的 filename，引號去掉
fn parse_attachment_filename(header: &str) -> Option<String> {
    header
        .split("filename=")
        .nth(1)
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

fn fallback_filename(reference: &ReportReference, window: &ReportWindow) -> String {
    format!(
        "{}_{}_{}.csv",
        reference.application_id,
        reference.kind,
        window.label()
    )
}

fn count_csv_records(data: &[u8]) -> usize {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data)
        .records()
        .filter(|record| record.is_ok())
        .count()
}
