//! Project definitions for SchemaForge
//!
//! A `Project` is the unit exchanged with the backend: deployment
//! configuration, the flat class model used for code generation, and the
//! diagram snapshot (`nodes`) the editor restores from.

use crate::class::{ClassData, ClassRegistry};
use crate::enums::EnumRegistry;
use crate::relationship::Edge;
use crate::serde_helpers::null_as_default;
use forge_core::{ForgeError, ForgeResult, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// ProjectId
// ============================================================================

/// Backend project identifier
///
/// The backend issues integers, but ids arriving as strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectId::Number(n) => write!(f, "{}", n),
            ProjectId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        ProjectId::Number(id)
    }
}

impl std::str::FromStr for ProjectId {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ForgeError::validation("Project id is required"));
        }
        Ok(s.parse::<i64>()
            .map(ProjectId::Number)
            .unwrap_or_else(|_| ProjectId::Text(s.to_string())))
    }
}

// ============================================================================
// ProjectConfig
// ============================================================================

/// Deployment configuration of the generated backend
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub docker_image_backend: String,
    pub host_port: String,
    pub container_port: String,
    pub backend_cors_origins: Vec<String>,
    pub project_name: String,

    pub secret_key: String,
    pub first_superuser: String,
    pub first_name_superuser: String,
    pub last_name_superuser: String,
    pub first_superuser_password: String,

    pub mysql_host: String,
    pub mysql_port: u16,
    pub mysql_user: String,
    pub mysql_password: String,
    pub mysql_database: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            docker_image_backend: String::new(),
            host_port: String::new(),
            container_port: String::new(),
            backend_cors_origins: Vec::new(),
            project_name: String::new(),
            secret_key: String::new(),
            first_superuser: String::new(),
            first_name_superuser: String::new(),
            last_name_superuser: String::new(),
            first_superuser_password: String::new(),
            mysql_host: "localhost".to_string(),
            mysql_port: 3306,
            mysql_user: String::new(),
            mysql_password: String::new(),
            mysql_database: String::new(),
        }
    }
}

const REDACTED: &str = "***";

fn redact(secret: &str) -> &str {
    if secret.is_empty() { "" } else { REDACTED }
}

impl std::fmt::Debug for ProjectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectConfig")
            .field("docker_image_backend", &self.docker_image_backend)
            .field("host_port", &self.host_port)
            .field("container_port", &self.container_port)
            .field("backend_cors_origins", &self.backend_cors_origins)
            .field("project_name", &self.project_name)
            .field("secret_key", &redact(&self.secret_key))
            .field("first_superuser", &self.first_superuser)
            .field("first_name_superuser", &self.first_name_superuser)
            .field("last_name_superuser", &self.last_name_superuser)
            .field(
                "first_superuser_password",
                &redact(&self.first_superuser_password),
            )
            .field("mysql_host", &self.mysql_host)
            .field("mysql_port", &self.mysql_port)
            .field("mysql_user", &self.mysql_user)
            .field("mysql_password", &redact(&self.mysql_password))
            .field("mysql_database", &self.mysql_database)
            .finish()
    }
}

/// Optional features of the generated backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherConfig {
    pub use_docker: bool,
    pub use_authentication: bool,
    pub use_socket: bool,
}

// ============================================================================
// Diagram snapshot / export
// ============================================================================

/// Everything needed to restore the editor
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: ClassRegistry,

    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<Edge>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub enums: EnumRegistry,
}

/// Contents of `diagram-interface.json`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagramExport {
    #[serde(default)]
    pub nodes: ClassRegistry,

    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl From<DiagramSnapshot> for DiagramExport {
    fn from(snapshot: DiagramSnapshot) -> Self {
        Self {
            nodes: snapshot.nodes,
            edges: snapshot.edges,
        }
    }
}

impl From<DiagramExport> for DiagramSnapshot {
    fn from(export: DiagramExport) -> Self {
        Self {
            nodes: export.nodes,
            edges: export.edges,
            enums: EnumRegistry::new(),
        }
    }
}

// ============================================================================
// Project
// ============================================================================

/// A backend project record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProjectId>,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub config: ProjectConfig,

    #[serde(default, deserialize_with = "null_as_default")]
    pub other_config: OtherConfig,

    /// Flat class list, always the projection of `nodes.nodes`
    #[serde(default, deserialize_with = "null_as_default")]
    pub class_model: Vec<ClassData>,

    /// Diagram snapshot; absent or `null` on a brand-new project
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: DiagramSnapshot,

    /// Fields this crate does not model, kept for the round trip
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Create an empty project
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the id
    pub fn with_id(mut self, id: impl Into<ProjectId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Replace the diagram and recompute `class_model` from it
    pub fn refresh_from(&mut self, snapshot: DiagramSnapshot) {
        self.class_model = snapshot.nodes.class_model();
        self.nodes = snapshot;
    }

    /// Id, or an error for a project that was never stored
    pub fn require_id(&self) -> ForgeResult<&ProjectId> {
        self.id.as_ref().ok_or_else(|| {
            ForgeError::validation(format!("Project '{}' has no id", self.name))
        })
    }
}

impl Validatable for Project {
    fn validate(&self) -> ForgeResult<()> {
        if self.name.trim().is_empty() {
            return Err(ForgeError::validation("Project name is required"));
        }
        Ok(())
    }
}

// ============================================================================
// Migration request
// ============================================================================

/// Body of a migration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationRequest {
    pub project_in: MigrationPayload,
    #[serde(default)]
    pub updated_class: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPayload {
    pub class_model: Vec<ClassData>,
    pub migration_message: String,
}

impl MigrationRequest {
    pub fn new(
        class_model: Vec<ClassData>,
        message: impl Into<String>,
        updated_class: Vec<String>,
    ) -> Self {
        Self {
            project_in: MigrationPayload {
                class_model,
                migration_message: message.into(),
            },
            updated_class,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::class::ClassNode;
    use forge_core::{NodeId, Position};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_project_id_parsing() {
        assert_eq!("42".parse::<ProjectId>().unwrap(), ProjectId::Number(42));
        assert_eq!(
            "abc".parse::<ProjectId>().unwrap(),
            ProjectId::Text("abc".to_string())
        );
        assert!(" ".parse::<ProjectId>().is_err());

        let id: ProjectId = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(id.to_string(), "7");
        let id: ProjectId = serde_json::from_value(json!("7a")).unwrap();
        assert_eq!(id.to_string(), "7a");
    }

    #[test]
    fn test_new_project_with_null_sections() {
        let project: Project = serde_json::from_value(json!({
            "id": 3,
            "name": "Shop",
            "config": {},
            "other_config": null,
            "class_model": [],
            "nodes": null
        }))
        .unwrap();

        assert_eq!(project.id, Some(ProjectId::Number(3)));
        assert!(project.nodes.nodes.is_empty());
        assert_eq!(project.config.mysql_port, 3306);
        assert!(!project.other_config.use_docker);
    }

    #[test]
    fn test_unknown_fields_survive() {
        let input = json!({
            "id": 1,
            "name": "Shop",
            "owner_id": 9,
            "nodes": { "nodes": [], "edges": [], "enums": [] }
        });
        let project: Project = serde_json::from_value(input).unwrap();
        let output = serde_json::to_value(&project).unwrap();
        assert_eq!(output["owner_id"], 9);
    }

    #[test]
    fn test_refresh_from_projects_class_model() {
        let mut project = Project::new("Shop");
        let user = ClassData::new("User").with_attribute(Attribute::primary_key("id"));
        let snapshot = DiagramSnapshot {
            nodes: ClassRegistry::from_nodes(vec![ClassNode::new(
                NodeId::new("u"),
                Position::zero(),
                user.clone(),
            )]),
            ..Default::default()
        };

        project.refresh_from(snapshot);
        assert_eq!(project.class_model, vec![user]);
        assert_eq!(project.nodes.nodes.len(), 1);
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = ProjectConfig {
            secret_key: "hunter2".to_string(),
            mysql_password: "root".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("\"root\""));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn test_migration_request_shape() {
        let request = MigrationRequest::new(
            vec![ClassData::new("User")],
            "add user",
            vec!["User".to_string()],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["project_in"]["migration_message"], "add user");
        assert_eq!(json["project_in"]["class_model"][0]["name"], "User");
        assert_eq!(json["updated_class"], json!(["User"]));
    }

    #[test]
    fn test_project_validation() {
        assert!(Project::new("").validate().is_err());
        assert!(Project::new("Shop").validate().is_ok());
        assert!(Project::new("Shop").require_id().is_err());
        assert!(Project::new("Shop").with_id(1_i64).require_id().is_ok());
    }
}
