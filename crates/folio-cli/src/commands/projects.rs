use std::io::BufRead;
use std::path::Path;

use folio_core::models::{FilterCategory, Project};
use folio_core::{Dashboard, EditSession, EditTarget, RemoteStore};

use crate::commands::common::{
    edit_and_save, format_project_lines, guess_content_type, report, require_text, resolve_prompt,
};
use crate::error::CliError;

pub fn run_list<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    search: Option<&str>,
    as_json: bool,
) -> Result<(), CliError> {
    let projects = dashboard.projects().filtered(search.unwrap_or_default());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
    } else {
        for line in format_project_lines(&projects) {
            println!("{line}");
        }
    }
    Ok(())
}

pub struct NewProject<'a> {
    pub title: &'a str,
    pub category: Option<&'a str>,
    pub filter: Option<&'a str>,
    pub description: Option<&'a str>,
    pub featured: bool,
    pub tags: &'a [String],
}

pub async fn run_add<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    input: NewProject<'_>,
) -> Result<Project, CliError> {
    let mut project = Project::draft();
    project.title = require_text("title", input.title)?;
    if let Some(category) = input.category {
        project.category = require_text("category", category)?;
    }
    if let Some(filter) = input.filter {
        project.filter_category = filter.parse::<FilterCategory>()?;
    }
    if let Some(description) = input.description {
        project.description = description.trim().to_string();
    }
    project.featured = input.featured;
    for tag in input.tags {
        project.add_tag(tag)?;
    }

    let created = dashboard.projects().create(project).await?;
    report(dashboard.notifier());
    println!("{}", created.id);
    Ok(created)
}

pub struct ProjectEdits<'a> {
    pub assignments: &'a [String],
    pub add_tags: &'a [String],
    pub remove_tags: &'a [String],
    pub add_colors: &'a [String],
}

pub async fn run_edit<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    edits: ProjectEdits<'_>,
) -> Result<bool, CliError> {
    let changed = edit_and_save(
        dashboard,
        EditTarget::Project(id.to_string()),
        edits.assignments,
        |session: &mut EditSession| {
            let Some(buffer) = session.as_project_mut() else {
                return Ok(());
            };
            buffer.try_update(|project| {
                for tag in edits.add_tags {
                    project.add_tag(tag)?;
                }
                for tag in edits.remove_tags {
                    project.remove_tag(tag);
                }
                for color in edits.add_colors {
                    project.add_color(color)?;
                }
                Ok(())
            })
        },
    )
    .await?;

    if changed {
        report(dashboard.notifier());
        println!("{id}");
    } else {
        eprintln!("No changes");
    }
    Ok(changed)
}

/// Move a project and write the new sequence before returning.
pub async fn run_move<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    to: usize,
) -> Result<(), CliError> {
    let moved = dashboard.projects().move_to(id, to)?;
    if moved.from == moved.to {
        eprintln!("Already at position {}", moved.to);
        return Ok(());
    }

    dashboard.projects().flush_pending().await?;
    report(dashboard.notifier());
    for line in format_project_lines(&dashboard.projects().items()) {
        println!("{line}");
    }
    Ok(())
}

/// Upload a file into a project's gallery and save the project.
pub async fn run_upload<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    file: &Path,
    content_type: Option<&str>,
) -> Result<String, CliError> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::InvalidMediaPath(file.display().to_string()))?;
    let bytes = std::fs::read(file)?;
    let content_type = content_type.or_else(|| guess_content_type(file));

    dashboard.begin_edit(EditTarget::Project(id.to_string()))?;
    let uploaded = dashboard
        .upload_to_gallery(file_name, &bytes, content_type)
        .await;
    let url = match uploaded {
        Ok(url) => url,
        Err(error) => {
            dashboard.discard_session().await;
            return Err(error.into());
        }
    };

    let saved = dashboard.save_session().await;
    dashboard.discard_session().await;
    saved?;
    report(dashboard.notifier());
    println!("{url}");
    Ok(url)
}

pub async fn run_delete<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    assume_yes: bool,
    input: &mut impl BufRead,
) -> Result<bool, CliError> {
    dashboard.projects().request_delete(dashboard.gate(), id)?;
    let deleted = resolve_prompt(dashboard.gate(), assume_yes, input).await?;
    if deleted {
        report(dashboard.notifier());
        println!("{id}");
    } else {
        eprintln!("Cancelled");
    }
    Ok(deleted)
}
