//! Backend routes

use crate::error::{ApiError, ApiResult};
use forge_ir::ProjectId;
use reqwest::{Method, Url};

/// First page of the project list
pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 10;

/// One backend call, before it is bound to a base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    ListProjects { skip: u32, limit: u32 },
    GetProject(ProjectId),
    SaveDiagram(ProjectId),
    GenerateMigration(ProjectId),
    CreateProject,
    UpdateProject(ProjectId),
    DeleteProject(ProjectId),
}

impl Endpoint {
    pub fn method(&self) -> Method {
        match self {
            Endpoint::ListProjects { .. } | Endpoint::GetProject(_) => Method::GET,
            Endpoint::CreateProject => Method::POST,
            Endpoint::SaveDiagram(_)
            | Endpoint::GenerateMigration(_)
            | Endpoint::UpdateProject(_) => Method::PUT,
            Endpoint::DeleteProject(_) => Method::DELETE,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::ListProjects { .. } => "/project/",
            Endpoint::GetProject(_) => "/project/by_id",
            Endpoint::SaveDiagram(_) => "/project/diagram",
            Endpoint::CreateProject | Endpoint::UpdateProject(_) => "/project/config",
            Endpoint::GenerateMigration(_) | Endpoint::DeleteProject(_) => "/project",
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Endpoint::ListProjects { skip, limit } => {
                vec![("skip", skip.to_string()), ("limit", limit.to_string())]
            }
            Endpoint::CreateProject => Vec::new(),
            Endpoint::GetProject(id)
            | Endpoint::SaveDiagram(id)
            | Endpoint::GenerateMigration(id)
            | Endpoint::UpdateProject(id)
            | Endpoint::DeleteProject(id) => vec![("project_id", id.to_string())],
        }
    }

    /// Full URL under `base`, query values encoded
    pub fn url(&self, base: &str) -> ApiResult<Url> {
        let raw = format!("{}{}", base.trim_end_matches('/'), self.path());
        let mut url =
            Url::parse(&raw).map_err(|e| ApiError::config(format!("Invalid URL '{}': {}", raw, e)))?;

        let query = self.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "http://127.0.0.1:8000";

    fn url(endpoint: Endpoint) -> String {
        endpoint.url(BASE).unwrap().to_string()
    }

    #[test]
    fn test_project_list_url() {
        assert_eq!(
            url(Endpoint::ListProjects {
                skip: DEFAULT_SKIP,
                limit: DEFAULT_LIMIT
            }),
            "http://127.0.0.1:8000/project/?skip=0&limit=10"
        );
    }

    #[test]
    fn test_project_scoped_urls() {
        let id = ProjectId::Number(7);
        assert_eq!(
            url(Endpoint::GetProject(id.clone())),
            "http://127.0.0.1:8000/project/by_id?project_id=7"
        );
        assert_eq!(
            url(Endpoint::SaveDiagram(id.clone())),
            "http://127.0.0.1:8000/project/diagram?project_id=7"
        );
        assert_eq!(
            url(Endpoint::GenerateMigration(id.clone())),
            "http://127.0.0.1:8000/project?project_id=7"
        );
        assert_eq!(
            url(Endpoint::UpdateProject(id.clone())),
            "http://127.0.0.1:8000/project/config?project_id=7"
        );
        assert_eq!(url(Endpoint::CreateProject), "http://127.0.0.1:8000/project/config");
    }

    #[test]
    fn test_methods() {
        let id = ProjectId::Number(1);
        assert_eq!(Endpoint::CreateProject.method(), Method::POST);
        assert_eq!(Endpoint::GenerateMigration(id.clone()).method(), Method::PUT);
        assert_eq!(Endpoint::DeleteProject(id.clone()).method(), Method::DELETE);
        assert_eq!(Endpoint::GetProject(id).to_string(), "GET /project/by_id");
    }

    #[test]
    fn test_text_ids_are_encoded() {
        let endpoint = Endpoint::GetProject(ProjectId::Text("a b&c".to_string()));
        assert_eq!(
            endpoint.url("https://api.example.com/").unwrap().as_str(),
            "https://api.example.com/project/by_id?project_id=a+b%26c"
        );
    }

    #[test]
    fn test_bad_base_is_a_config_error() {
        let err = Endpoint::CreateProject.url("not a url").unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }
}
