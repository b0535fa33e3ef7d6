//! REST数据源
//!
//! 通过PostgREST风格的后端服务接口直接读写 `patients` 表，并读取 `beds` 表

use crate::rows::{BedRow, PatientPatch, PatientRow};
use crate::source::{rows_to_beds, rows_to_roster, RosterSource};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use triage_core::{Bed, Patient, PatientIntake, Result, TriageError};

/// REST数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestSourceConfig {
    /// 服务地址，例如 `https://project.supabase.co`
    pub base_url: String,
    /// 匿名或服务端访问密钥
    pub api_key: String,
    /// 患者表名
    pub table: String,
    /// 床位表名
    pub bed_table: String,
    /// 请求超时时间
    pub timeout: Duration,
}

/// REST数据源
#[derive(Debug, Clone)]
pub struct RestRosterSource {
    config: RestSourceConfig,
    client: reqwest::Client,
}

impl RestRosterSource {
    pub fn new(config: RestSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TriageError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Self::with_client(config, client)
    }

    /// 使用外部构造的HTTP客户端，`config.timeout` 不再生效
    pub fn with_client(config: RestSourceConfig, client: reqwest::Client) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(TriageError::Config("REST store base_url is empty".to_string()));
        }

        info!("REST roster source configured for {}", config.base_url);
        Ok(Self { config, client })
    }

    fn resource_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    /// 患者表的资源地址
    pub fn table_url(&self) -> String {
        self.resource_url(&self.config.table)
    }

    /// 床位表的资源地址
    pub fn bed_table_url(&self) -> String {
        self.resource_url(&self.config.bed_table)
    }

    /// 添加认证头
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| TriageError::Store(format!("Failed to {}: {}", action, e)))?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TriageError::Store(format!("Failed to {}: {} {}", action, status, body)))
        }
    }
}

#[async_trait]
impl RosterSource for RestRosterSource {
    fn name(&self) -> &str {
        "rest"
    }

    async fn fetch_roster(&self) -> Result<Vec<Patient>> {
        let request = self.client.get(self.table_url()).query(&[("select", "*")]);
        let response = self.send(request, "fetch roster").await?;

        let rows: Vec<PatientRow> = response
            .json()
            .await
            .map_err(|e| TriageError::Store(format!("Invalid roster payload: {}", e)))?;

        debug!("Fetched {} rows from {}", rows.len(), self.table_url());
        Ok(rows_to_roster(self.name(), rows))
    }

    async fn insert_patient(&self, patient: &Patient, intake: &PatientIntake) -> Result<()> {
        let row = PatientRow::for_insert(patient, intake);
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(&row);

        self.send(request, "insert patient").await?;
        debug!("Inserted patient {} into {}", patient.id, self.config.table);
        Ok(())
    }

    async fn update_patient(&self, id: &str, patch: &PatientPatch) -> Result<()> {
        let filter = format!("eq.{}", id);
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(patch);

        self.send(request, "update patient").await?;
        debug!("Updated patient {} in {}", id, self.config.table);
        Ok(())
    }

    async fn fetch_beds(&self) -> Result<Vec<Bed>> {
        let request = self.client.get(self.bed_table_url()).query(&[("select", "*")]);
        let response = self.send(request, "fetch beds").await?;

        let rows: Vec<BedRow> = response
            .json()
            .await
            .map_err(|e| TriageError::Store(format!("Invalid bed payload: {}", e)))?;

        debug!("Fetched {} bed rows from {}", rows.len(), self.bed_table_url());
        Ok(rows_to_beds(self.name(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;
    use triage_core::{BedStatus, PatientStatus, PatientUpdate, Priority};

    fn config(base_url: &str) -> RestSourceConfig {
        RestSourceConfig {
            base_url: base_url.to_string(),
            api_key: "anon-key".to_string(),
            table: "patients".to_string(),
            bed_table: "beds".to_string(),
            timeout: Duration::from_millis(200),
        }
    }

    /// 读取一个完整的HTTP请求（请求头加 `Content-Length` 指定的请求体）
    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// 本地桩服务：按顺序以给定的JSON响应每个连接，并返回收到的原始请求
    async fn stub_store(bodies: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut captured = Vec::new();
            for body in bodies {
                let (mut stream, _) = listener.accept().await.unwrap();
                captured.push(read_request(&mut stream).await);

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
            captured
        });

        (base_url, handle)
    }

    /// 直连桩服务，不经过环境中的代理
    fn stub_source(base_url: &str) -> RestRosterSource {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        RestRosterSource::with_client(config(base_url), client).unwrap()
    }

    fn request_line(raw: &str) -> &str {
        raw.lines().next().unwrap_or_default()
    }

    fn header<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
        raw.split("\r\n\r\n")
            .next()?
            .lines()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value.trim())
    }

    fn body(raw: &str) -> serde_json::Value {
        let payload = raw.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or_default();
        serde_json::from_str(payload).unwrap()
    }

    #[test]
    fn test_table_url_trims_trailing_slash() {
        let source = RestRosterSource::new(config("https://example.supabase.co/")).unwrap();
        assert_eq!(source.table_url(), "https://example.supabase.co/rest/v1/patients");
        assert_eq!(source.bed_table_url(), "https://example.supabase.co/rest/v1/beds");
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        assert!(matches!(
            RestRosterSource::new(config("  ")),
            Err(TriageError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store_reports_store_error() {
        let source = stub_source("http://127.0.0.1:9");
        let result = source.fetch_roster().await;
        assert!(matches!(result, Err(TriageError::Store(_))));
    }

    #[tokio::test]
    async fn test_fetch_roster_sends_select_and_credentials() {
        let (base_url, server) = stub_store(vec![
            r#"[{"id":"P-12345","name":"John Doe","wait_time":45,"priority":"medium","department":"Emergency","arrival_time":"10:30 AM","status":"waiting"},
                {"id":"P-12347","name":"Robert Johnson","wait_time":15,"priority":"critical","department":"Emergency","arrival_time":"11:00 AM","status":"in-progress"},
                {"id":"P-bad","name":"Broken","status":"updated"}]"#,
        ])
        .await;
        let source = stub_source(&base_url);

        let roster = source.fetch_roster().await.unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].wait_time, 45);
        assert_eq!(roster[1].priority, Priority::Critical);
        assert_eq!(roster[1].status, PatientStatus::InProgress);

        let requests = server.await.unwrap();
        let raw = &requests[0];
        assert_eq!(request_line(raw), "GET /rest/v1/patients?select=* HTTP/1.1");
        assert_eq!(header(raw, "apikey"), Some("anon-key"));
        assert_eq!(header(raw, "authorization"), Some("Bearer anon-key"));
    }

    #[tokio::test]
    async fn test_writes_use_minimal_return_and_id_filter() {
        let (base_url, server) = stub_store(vec!["", ""]).await;
        let source = stub_source(&base_url);

        let patient = triage_core::utils::sample_roster().remove(0);
        let intake = PatientIntake {
            chief_complaint: Some("Chest pain".to_string()),
            ..Default::default()
        };
        source.insert_patient(&patient, &intake).await.unwrap();

        let patch = PatientPatch::from(&PatientUpdate::status(PatientStatus::Completed));
        source.update_patient("P-12345", &patch).await.unwrap();

        let requests = server.await.unwrap();

        let insert = &requests[0];
        assert_eq!(request_line(insert), "POST /rest/v1/patients HTTP/1.1");
        assert_eq!(header(insert, "prefer"), Some("return=minimal"));
        assert_eq!(header(insert, "authorization"), Some("Bearer anon-key"));
        let row = body(insert);
        assert_eq!(row["id"], "P-12345");
        assert_eq!(row["wait_time"], 45);
        assert_eq!(row["chief_complaint"], "Chest pain");

        let update = &requests[1];
        assert_eq!(request_line(update), "PATCH /rest/v1/patients?id=eq.P-12345 HTTP/1.1");
        assert_eq!(header(update, "prefer"), Some("return=minimal"));
        assert_eq!(header(update, "apikey"), Some("anon-key"));
        let patch = body(update);
        assert_eq!(patch["status"], "completed");
        assert!(patch.get("wait_time").is_none());
    }

    #[tokio::test]
    async fn test_fetch_beds_reads_bed_table() {
        let (base_url, server) = stub_store(vec![
            r#"[{"id":"B-1001","status":"Available","department":"ICU","patient_id":null,"admission_time":null},
                {"id":"B-1002","status":"Occupied","department":"Emergency","patient_id":"P-12347","admission_time":"11:00 AM"}]"#,
        ])
        .await;
        let source = stub_source(&base_url);

        let beds = source.fetch_beds().await.unwrap();
        assert_eq!(beds.len(), 2);
        assert_eq!(beds[1].status, BedStatus::Occupied);
        assert_eq!(beds[1].patient_id.as_deref(), Some("P-12347"));

        let requests = server.await.unwrap();
        assert_eq!(request_line(&requests[0]), "GET /rest/v1/beds?select=* HTTP/1.1");
        assert_eq!(header(&requests[0], "apikey"), Some("anon-key"));
    }

    #[tokio::test]
    async fn test_error_status_reports_store_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_request(&mut stream).await;
            let body = r#"{"message":"JWT expired"}"#;
            let response = format!(
                "HTTP/1.1 401 Unauthorized\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        let source = stub_source(&base_url);
        match source.fetch_roster().await {
            Err(TriageError::Store(message)) => {
                assert!(message.contains("401"));
                assert!(message.contains("JWT expired"));
            }
            other => panic!("expected store error, got {:?}", other),
        }
        server.await.unwrap();
    }
}
