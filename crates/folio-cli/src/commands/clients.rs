use std::io::BufRead;

use folio_core::models::Client;
use folio_core::{Dashboard, EditTarget, RemoteStore};

use crate::commands::common::{
    delete_with_confirmation, edit_and_save, format_client_lines, report, require_text,
};
use crate::error::CliError;

pub fn run_list<S: RemoteStore>(dashboard: &Dashboard<S>, as_json: bool) -> Result<(), CliError> {
    let clients = dashboard.clients().items();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
    } else {
        for line in format_client_lines(&clients) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_add<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    name: &str,
    role: Option<&str>,
    year: Option<&str>,
    description: Option<&str>,
) -> Result<Client, CliError> {
    let mut client = Client::draft();
    client.name = require_text("name", name)?;
    if let Some(role) = role {
        client.role = role.trim().to_string();
    }
    if let Some(year) = year {
        client.year = require_text("year", year)?;
    }
    if let Some(description) = description {
        client.description = description.trim().to_string();
    }

    let saved = dashboard.clients().save(client).await?;
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
        EditTarget::Client(id.to_string()),
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
        delete_with_confirmation(dashboard.clients(), dashboard.gate(), id, assume_yes, input)
            .await?;
    if deleted {
        report(dashboard.notifier());
        println!("{id}");
    } else {
        eprintln!("Cancelled");
    }
    Ok(deleted)
}
