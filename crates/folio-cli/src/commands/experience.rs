use std::io::BufRead;

use folio_core::models::{Experience, ExperienceKind};
use folio_core::{Dashboard, EditTarget, RemoteStore};

use crate::commands::common::{
    delete_with_confirmation, edit_and_save, format_experience_lines, report, require_text,
};
use crate::error::CliError;

pub fn run_list<S: RemoteStore>(dashboard: &Dashboard<S>, as_json: bool) -> Result<(), CliError> {
    let entries = dashboard.experience().items();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for line in format_experience_lines(&entries) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_add<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    role: &str,
    company: &str,
    period: Option<&str>,
    description: Option<&str>,
    education: bool,
) -> Result<Experience, CliError> {
    let mut entry = Experience::draft();
    entry.role = require_text("role", role)?;
    entry.company = require_text("company", company)?;
    if let Some(period) = period {
        entry.period = require_text("period", period)?;
    }
    if let Some(description) = description {
        entry.description = description.trim().to_string();
    }
    if education {
        entry.kind = ExperienceKind::Education;
    }

    let saved = dashboard.experience().save(entry).await?;
    report(dashboard.notifier());
    println!("{}", saved.id);
    Ok(saved)
}

pub async fn run_edit<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    assignments: &[String],
) -> Result<bool, CliError> {
    let changed = edit_and_save(
        dashboard,
        EditTarget::Experience(id.to_string()),
        assignments,
        |_| Ok(()),
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

pub async fn run_delete<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    id: &str,
    assume_yes: bool,
    input: &mut impl BufRead,
) -> Result<bool, CliError> {
    let deleted =
        delete_with_confirmation(dashboard.experience(), dashboard.gate(), id, assume_yes, input)
            .await?;
    if deleted {
        report(dashboard.notifier());
        println!("{id}");
    } else {
        eprintln!("Cancelled");
    }
    Ok(deleted)
}
