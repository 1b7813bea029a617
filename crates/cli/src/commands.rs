//! Command implementations
//!
//! Diagram commands work on local files and never touch the network;
//! project commands and `migrate` go through the backend client.

use crate::output;
use anyhow::{Context, Result};
use forge_api::ApiClient;
use forge_editor::{DiagramSession, SessionConfig};
use forge_ir::{
    DiagramFile, ProjectId, Validator, export_diagram, open_diagram_file, save_project_file,
    serialization::default_file_name,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// How a command ended when it did not error out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Ran to completion but found problems (e.g. `diagram check`)
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

// ============================================================================
// Projects
// ============================================================================

pub async fn list_projects(client: &ApiClient, skip: u32, limit: u32) -> Result<Outcome> {
    let projects = client
        .list_projects(skip, limit)
        .await
        .context("Failed to fetch projects")?;
    output::print_projects(&projects);
    Ok(Outcome::Success)
}

pub async fn show_project(client: &ApiClient, id: &ProjectId) -> Result<Outcome> {
    let project = client
        .get_project(id)
        .await
        .with_context(|| format!("Failed to fetch project {}", id))?;
    output::print_project(&project);
    Ok(Outcome::Success)
}

pub async fn delete_project(client: &ApiClient, id: &ProjectId) -> Result<Outcome> {
    client
        .delete_project(id)
        .await
        .with_context(|| format!("Failed to delete project {}", id))?;
    output::success(format!("Project {} deleted", id));
    Ok(Outcome::Success)
}

// ============================================================================
// Diagram (offline)
// ============================================================================

/// Open a project or export file as an editing session
pub fn open_session(path: &Path) -> Result<DiagramSession> {
    let file = open_diagram_file(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(DiagramSession::from_project(
        file.into_project(),
        SessionConfig::default(),
    ))
}

/// Re-derive edges and write `{nodes, edges}`
pub fn export(file: &Path, output_path: &Path) -> Result<Outcome> {
    let session = open_session(file)?;
    export_diagram(&session.export(), output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    output::success(format!(
        "Exported {} classes and {} relationships to {}",
        session.classes().len(),
        session.edges().len(),
        output_path.display()
    ));
    Ok(Outcome::Success)
}

pub fn edges(file: &Path) -> Result<Outcome> {
    let session = open_session(file)?;
    output::print_edges(session.edges(), session.issues());
    Ok(Outcome::Success)
}

pub fn search(file: &Path, query: Option<&str>) -> Result<Outcome> {
    let mut session = open_session(file)?;
    session.set_search_query(query.unwrap_or_default());
    output::print_summaries(&session.search_results());
    Ok(Outcome::Success)
}

/// Validate a file as stored; fails when any error is found
pub fn check(file: &Path) -> Result<Outcome> {
    let opened = open_diagram_file(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let validator = Validator::with_default_rules();
    debug!("Running rules: {}", validator.rule_names().join(", "));
    let result = match &opened {
        DiagramFile::Project(project) => validator.validate_project(project),
        DiagramFile::Diagram(snapshot) => validator.validate(snapshot),
    };

    output::print_validation(&result);
    Ok(if result.has_errors() {
        Outcome::Failed
    } else {
        Outcome::Success
    })
}

// ============================================================================
// Diagram (backend)
// ============================================================================

/// Fetch a project and store it as a local file
pub async fn pull(client: &ApiClient, id: &ProjectId, output_path: Option<PathBuf>) -> Result<Outcome> {
    let project = client
        .get_project(id)
        .await
        .with_context(|| format!("Failed to fetch project {}", id))?;

    let path = output_path.unwrap_or_else(|| PathBuf::from(default_file_name(&project.name)));
    save_project_file(&project, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    output::success(format!("Project '{}' saved to {}", project.name, path.display()));
    Ok(Outcome::Success)
}

/// Upload a local project with its diagram brought up to date
pub async fn push(client: &ApiClient, file: &Path) -> Result<Outcome> {
    let mut session = open_session(file)?;
    let project = session.begin_save();
    project
        .require_id()
        .with_context(|| format!("{} has no project id; pull it first", file.display()))?;

    info!("Saving diagram of '{}'", project.name);
    let result = client.save_diagram(&project).await;
    session.finish_save(result.as_ref().map(|_| ())).ok();
    output::print_notices(&session.take_notices());

    result.context("Failed to save diagram")?;
    Ok(Outcome::Success)
}

/// Send the project's class model for migration generation
pub async fn migrate(
    client: &ApiClient,
    id: &ProjectId,
    message: &str,
    classes: &[String],
) -> Result<Outcome> {
    let project = client
        .get_project(id)
        .await
        .with_context(|| format!("Failed to fetch project {}", id))?;

    let mut session = DiagramSession::from_project(project, SessionConfig::default());
    for class in classes {
        session.mark_updated(class.as_str());
    }
    let request = session.migration_request(message)?;

    let result = client.generate_migration(id, &request).await;
    session.finish_migration(result.as_ref().map(|_| ())).ok();
    output::print_notices(&session.take_notices());

    let ack = result.context("Failed to generate migration")?;
    if !ack.is_null() {
        println!("{}", serde_json::to_string_pretty(&ack)?);
    }
    Ok(Outcome::Success)
}
