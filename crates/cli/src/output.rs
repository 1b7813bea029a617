//! Terminal output
//!
//! `format_*` functions build the text; `print_*` wrappers write it to
//! stdout. Colours follow `colored`'s usual `NO_COLOR` / `CLICOLOR` rules.

use colored::Colorize;
use forge_editor::{ClassSummary, Notice, NoticeLevel};
use forge_ir::{DerivationIssue, Edge, Project, ValidationResult};
use std::fmt::Write;

/// One line per project: id, name, class count
pub fn format_projects(projects: &[Project]) -> String {
    if projects.is_empty() {
        return format!("{}\n", "No projects found".dimmed());
    }

    let mut out = String::new();
    for project in projects {
        let id = project
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>6}  {}  ({} classes)",
            id.cyan(),
            project.name.bold(),
            project.nodes.nodes.len()
        );
    }
    out
}

/// Project header, connection settings and class list
///
/// Secrets are never printed.
pub fn format_project(project: &Project) -> String {
    let mut out = String::new();
    let id = project
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());

    let _ = writeln!(out, "{} {}", project.name.bold(), format!("#{}", id).dimmed());
    let _ = writeln!(
        out,
        "  database: {}@{}:{}/{}",
        project.config.mysql_user,
        project.config.mysql_host,
        project.config.mysql_port,
        project.config.mysql_database
    );
    let _ = writeln!(
        out,
        "  docker: {}  auth: {}  socket: {}",
        yes_no(project.other_config.use_docker),
        yes_no(project.other_config.use_authentication),
        yes_no(project.other_config.use_socket)
    );

    let snapshot = &project.nodes;
    let _ = writeln!(
        out,
        "  {} classes, {} enums",
        snapshot.nodes.len(),
        snapshot.enums.len()
    );
    for node in snapshot.nodes.iter() {
        let _ = writeln!(
            out,
            "    {} ({} attributes)",
            node.data.display_name(),
            node.data.attributes.len()
        );
    }
    out
}

fn yes_no(on: bool) -> &'static str {
    if on { "yes" } else { "no" }
}

/// Derived edges, then the foreign keys that produced none
pub fn format_edges(edges: &[Edge], issues: &[DerivationIssue]) -> String {
    let mut out = String::new();
    if edges.is_empty() {
        let _ = writeln!(out, "{}", "No relationships".dimmed());
    }
    for edge in edges {
        let _ = writeln!(out, "{}  {}", edge.label, edge.id.dimmed());
    }
    for issue in issues {
        let _ = writeln!(
            out,
            "{} {}: {}",
            "unresolved".yellow(),
            issue.location(),
            issue
        );
    }
    out
}

pub fn format_summaries(summaries: &[ClassSummary]) -> String {
    if summaries.is_empty() {
        return format!("{}\n", "No matching classes".dimmed());
    }

    let mut out = String::new();
    for summary in summaries {
        let _ = writeln!(
            out,
            "{}  {} attributes  at ({}, {})",
            summary.name.bold(),
            summary.attribute_count,
            summary.position.x,
            summary.position.y
        );
    }
    out
}

/// Errors, warnings and a closing verdict
pub fn format_validation(result: &ValidationResult) -> String {
    let mut out = String::new();
    for error in &result.errors {
        let _ = writeln!(out, "{} {}", "error:".red().bold(), error);
        if let Some(suggestion) = &error.suggestion {
            let _ = writeln!(out, "  {} {}", "hint:".cyan(), suggestion);
        }
    }
    for warning in &result.warnings {
        let _ = writeln!(out, "{} {}", "warning:".yellow().bold(), warning);
    }

    let verdict = if result.has_errors() {
        format!(
            "{} ({} errors, {} warnings)",
            "Diagram is invalid".red(),
            result.errors.len(),
            result.warnings.len()
        )
    } else {
        format!(
            "{} ({} warnings)",
            "Diagram is valid".green(),
            result.warnings.len()
        )
    };
    let _ = writeln!(out, "{}", verdict);
    out
}

pub fn format_notice(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info:".normal(),
        NoticeLevel::Success => "ok:".green(),
        NoticeLevel::Warning => "warning:".yellow(),
        NoticeLevel::Error => "error:".red(),
    };
    format!("{} {}", tag, notice.text)
}

pub fn print_projects(projects: &[Project]) {
    print!("{}", format_projects(projects));
}

pub fn print_project(project: &Project) {
    print!("{}", format_project(project));
}

pub fn print_edges(edges: &[Edge], issues: &[DerivationIssue]) {
    print!("{}", format_edges(edges, issues));
}

pub fn print_summaries(summaries: &[ClassSummary]) {
    print!("{}", format_summaries(summaries));
}

pub fn print_validation(result: &ValidationResult) {
    print!("{}", format_validation(result));
}

/// Print session notices; errors go to stderr
pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        if notice.level.is_error() {
            eprintln!("{}", format_notice(notice));
        } else {
            println!("{}", format_notice(notice));
        }
    }
}

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green(), message.as_ref());
}
