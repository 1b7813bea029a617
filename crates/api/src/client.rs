//! HTTP client for the project backend

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::requests::Endpoint;
use forge_ir::{MigrationRequest, Project, ProjectId};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the `/project` routes
///
/// Calls are independent: nothing is retried or cancelled here, and a
/// failed call leaves the caller's model untouched.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build a client after validating `config`
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Client configured from the environment
    pub fn from_env() -> ApiResult<Self> {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // ========================================================================
    // Projects
    // ========================================================================

    /// One page of projects
    pub async fn list_projects(&self, skip: u32, limit: u32) -> ApiResult<Vec<Project>> {
        self.send(&Endpoint::ListProjects { skip, limit }, None::<&()>)
            .await
    }

    pub async fn get_project(&self, id: &ProjectId) -> ApiResult<Project> {
        self.send(&Endpoint::GetProject(id.clone()), None::<&()>)
            .await
    }

    pub async fn create_project(&self, project: &Project) -> ApiResult<Value> {
        self.send(&Endpoint::CreateProject, Some(project)).await
    }

    pub async fn update_project(&self, project: &Project) -> ApiResult<Value> {
        let id = project.require_id()?.clone();
        self.send(&Endpoint::UpdateProject(id), Some(project)).await
    }

    pub async fn delete_project(&self, id: &ProjectId) -> ApiResult<Value> {
        self.send(&Endpoint::DeleteProject(id.clone()), None::<&()>)
            .await
    }

    // ========================================================================
    // Diagram
    // ========================================================================

    /// Store the project with its current diagram snapshot
    pub async fn save_diagram(&self, project: &Project) -> ApiResult<Value> {
        let id = project.require_id()?.clone();
        self.send(&Endpoint::SaveDiagram(id), Some(project)).await
    }

    /// Ask the backend to generate a migration for the class model
    pub async fn generate_migration(
        &self,
        id: &ProjectId,
        request: &MigrationRequest,
    ) -> ApiResult<Value> {
        self.send(&Endpoint::GenerateMigration(id.clone()), Some(request))
            .await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    async fn send<B, T>(&self, endpoint: &Endpoint, body: Option<&B>) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = endpoint.url(&self.config.base_url)?;
        debug!("{} {}", endpoint.method(), url);

        let mut request = self.http.request(endpoint.method(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", endpoint.method(), url, e);
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        check_status(status, &text).inspect_err(|e| warn!("{}: {}", endpoint, e))?;
        decode_body(&text).inspect_err(|e| warn!("{}: {}", endpoint, e))
    }
}

/// Map a non-2xx status to `ApiError::Status`, keeping the body text
pub fn check_status(status: StatusCode, body: &str) -> ApiResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

/// Decode a JSON body; an empty body reads as `null`
pub fn decode_body<T: DeserializeOwned>(text: &str) -> ApiResult<T> {
    let text = text.trim();
    let text = if text.is_empty() { "null" } else { text };
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response on a local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    fn client(base: String) -> ApiClient {
        ApiClient::new(ApiConfig::new().with_base_url(base).with_timeout(5)).unwrap()
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK, "").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "").is_ok());

        let err = check_status(StatusCode::NOT_FOUND, " missing\n").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Server responded with 404: missing");
    }

    #[test]
    fn test_decode_body() {
        let value: Value = decode_body("").unwrap();
        assert_eq!(value, Value::Null);

        let projects: Vec<Project> = decode_body(r#"[{"id": 1, "name": "Shop"}]"#).unwrap();
        assert_eq!(projects[0].name, "Shop");

        let err = decode_body::<Vec<Project>>("{oops").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = ApiClient::new(ApiConfig::new().with_base_url("localhost:8000")).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[tokio::test]
    async fn test_list_projects() {
        let base = serve_once("200 OK", r#"[{"id": 3, "name": "Shop", "nodes": null}]"#).await;
        let projects = client(base).list_projects(0, 10).await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, Some(ProjectId::Number(3)));
        assert!(projects[0].nodes.nodes.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let base = serve_once("404 Not Found", r#"{"detail":"Project not found"}"#).await;
        let err = client(base)
            .get_project(&ProjectId::Number(9))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Project not found"));
    }

    #[tokio::test]
    async fn test_delete_acknowledgement() {
        let base = serve_once("200 OK", r#"{"ok": true}"#).await;
        let ack = client(base)
            .delete_project(&ProjectId::Number(2))
            .await
            .unwrap();
        assert_eq!(ack["ok"], Value::Bool(true));
    }

    #[tokio::test]
    async fn test_save_requires_id() {
        let client = client("http://127.0.0.1:9".to_string());
        let err = client.save_diagram(&Project::new("Unsaved")).await.unwrap_err();
        assert!(matches!(err, ApiError::Model(_)));
    }
}
