use folio_core::{Dashboard, EditTarget, Error, RemoteStore};

use crate::commands::common::{edit_and_save, report, require_text};
use crate::error::CliError;

pub fn run_show<S: RemoteStore>(dashboard: &Dashboard<S>, as_json: bool) -> Result<(), CliError> {
    let overview = dashboard.overview();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
        return Ok(());
    }

    println!("{}", overview.title);
    if !overview.subtitle.is_empty() {
        println!("{}", overview.subtitle);
    }
    if !overview.description.is_empty() {
        println!();
        println!("{}", overview.description);
    }
    if !overview.stats.is_empty() {
        println!();
        for (index, stat) in overview.stats.iter().enumerate() {
            println!("{index:>3}  {:<12}  {}", stat.value, stat.label);
        }
    }
    Ok(())
}

pub async fn run_set<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    assignments: &[String],
) -> Result<bool, CliError> {
    let changed = edit_and_save(dashboard, EditTarget::Overview, assignments, |_| Ok(())).await?;
    if changed {
        report(dashboard.notifier());
    } else {
        eprintln!("No changes");
    }
    Ok(changed)
}

pub async fn run_add_stat<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    label: &str,
    value: &str,
) -> Result<(), CliError> {
    let label = require_text("label", label)?;
    let value = require_text("value", value)?;
    edit_and_save(dashboard, EditTarget::Overview, &[], |session| {
        if let Some(buffer) = session.as_overview_mut() {
            buffer.update(|overview| overview.add_stat(label, value));
        }
        Ok(())
    })
    .await?;
    report(dashboard.notifier());
    Ok(())
}

pub async fn run_remove_stat<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    index: usize,
) -> Result<(), CliError> {
    edit_and_save(dashboard, EditTarget::Overview, &[], |session| {
        let Some(buffer) = session.as_overview_mut() else {
            return Ok(());
        };
        buffer.try_update(|overview| {
            overview
                .remove_stat(index)
                .map(|_| ())
                .ok_or_else(|| Error::InvalidInput(format!("no stat at position {index}")))
        })
    })
    .await?;
    report(dashboard.notifier());
    Ok(())
}
