use std::path::Path;

use folio_core::{Dashboard, RemoteStore};

use crate::error::CliError;

pub fn run_export<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(&dashboard.export())?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

pub fn run_stats<S: RemoteStore>(dashboard: &Dashboard<S>, as_json: bool) -> Result<(), CliError> {
    let stats = dashboard.stats();
    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("projects    {} ({} featured)", stats.projects, stats.featured_projects);
        println!("experience  {}", stats.experience);
        println!("clients     {}", stats.clients);
        println!("stats       {}", stats.profile_stats);
    }
    Ok(())
}
