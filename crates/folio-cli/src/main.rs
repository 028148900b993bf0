//! Folio CLI - Command-line interface for the portfolio dashboard
//!
//! Edit projects, the career timeline, clients and the profile overview in
//! a local document store.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use std::io;

use clap::Parser;
use folio_core::{Dashboard, LibSqlStore};
use tracing_subscriber::EnvFilter;

use crate::cli::{
    Cli, ClientCommands, Commands, ExperienceCommands, OverviewCommands, ProjectCommands,
    SecurityCommands,
};
use crate::commands::common::{load_config, open_dashboard, resolve_db_path};
use crate::commands::completions::run_completions;
use crate::commands::projects::{NewProject, ProjectEdits};
use crate::commands::{clients, experience, export, overview, projects, security};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "folio=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let config = load_config(cli.config.as_deref())?;
    let db_path = resolve_db_path(cli.db_path, &config);
    let dashboard = open_dashboard(&db_path, &config).await?;

    let result = dispatch(&dashboard, cli.command).await;
    let flushed = dashboard.projects().flush_pending().await;
    result?;
    flushed?;
    Ok(())
}

async fn dispatch(dashboard: &Dashboard<LibSqlStore>, command: Commands) -> Result<(), CliError> {
    let mut input = io::stdin().lock();

    match command {
        Commands::Projects { command } => match command {
            ProjectCommands::List { search, json } => {
                projects::run_list(dashboard, search.as_deref(), json)?;
            }
            ProjectCommands::Add {
                title,
                category,
                filter,
                description,
                featured,
                tags,
            } => {
                let project = NewProject {
                    title: &title,
                    category: category.as_deref(),
                    filter: filter.as_deref(),
                    description: description.as_deref(),
                    featured,
                    tags: &tags,
                };
                projects::run_add(dashboard, project).await?;
            }
            ProjectCommands::Edit {
                id,
                assignments,
                add_tag,
                remove_tag,
                add_color,
            } => {
                let edits = ProjectEdits {
                    assignments: &assignments,
                    add_tags: &add_tag,
                    remove_tags: &remove_tag,
                    add_colors: &add_color,
                };
                projects::run_edit(dashboard, &id, edits).await?;
            }
            ProjectCommands::Move { id, to } => projects::run_move(dashboard, &id, to).await?,
            ProjectCommands::Upload {
                id,
                file,
                content_type,
            } => {
                projects::run_upload(dashboard, &id, &file, content_type.as_deref()).await?;
            }
            ProjectCommands::Delete { id, yes } => {
                projects::run_delete(dashboard, &id, yes, &mut input).await?;
            }
        },
        Commands::Experience { command } => match command {
            ExperienceCommands::List { json } => experience::run_list(dashboard, json)?,
            ExperienceCommands::Add {
                role,
                company,
                period,
                description,
                education,
            } => {
                experience::run_add(
                    dashboard,
                    &role,
                    &company,
                    period.as_deref(),
                    description.as_deref(),
                    education,
                )
                .await?;
            }
            ExperienceCommands::Edit { id, assignments } => {
                experience::run_edit(dashboard, &id, &assignments).await?;
            }
            ExperienceCommands::Delete { id, yes } => {
                experience::run_delete(dashboard, &id, yes, &mut input).await?;
            }
        },
        Commands::Clients { command } => match command {
            ClientCommands::List { json } => clients::run_list(dashboard, json)?,
            ClientCommands::Add {
                name,
                role,
                year,
                description,
            } => {
                clients::run_add(
                    dashboard,
                    &name,
                    role.as_deref(),
                    year.as_deref(),
                    description.as_deref(),
                )
                .await?;
            }
            ClientCommands::Edit { id, assignments } => {
                clients::run_edit(dashboard, &id, &assignments).await?;
            }
            ClientCommands::Delete { id, yes } => {
                clients::run_delete(dashboard, &id, yes, &mut input).await?;
            }
        },
        Commands::Overview { command } => match command {
            OverviewCommands::Show { json } => overview::run_show(dashboard, json)?,
            OverviewCommands::Set { assignments } => {
                overview::run_set(dashboard, &assignments).await?;
            }
            OverviewCommands::AddStat { label, value } => {
                overview::run_add_stat(dashboard, &label, &value).await?;
            }
            OverviewCommands::RemoveStat { index } => {
                overview::run_remove_stat(dashboard, index).await?;
            }
        },
        Commands::Security { command } => match command {
            SecurityCommands::Show => security::run_show(dashboard).await?,
            SecurityCommands::Set {
                allow_sign_up,
                maintenance_mode,
                webhook_url,
            } => {
                security::run_set(
                    dashboard,
                    allow_sign_up,
                    maintenance_mode,
                    webhook_url.as_deref(),
                )
                .await?;
            }
        },
        Commands::Stats { json } => export::run_stats(dashboard, json)?,
        Commands::Export { output } => export::run_export(dashboard, output.as_deref())?,
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref())?,
    }

    Ok(())
}
