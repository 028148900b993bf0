use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use folio_core::models::{ExperienceKind, MediaKind};
use folio_core::{Dashboard, DashboardConfig, LibSqlStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

use crate::cli::{Cli, Commands, CompletionShell, OverviewCommands, ProjectCommands};
use crate::commands::common::{
    guess_content_type, load_config, open_dashboard, parse_assignment, read_yes, resolve_db_path,
    truncate,
};
use crate::commands::completions::run_completions;
use crate::commands::export::run_export;
use crate::commands::projects::{NewProject, ProjectEdits};
use crate::commands::{clients, experience, overview, projects, security};
use crate::error::CliError;

async fn open_temp() -> (TempDir, PathBuf, Dashboard<LibSqlStore>) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("data").join("folio.db");
    let dashboard = open_dashboard(&db_path, &DashboardConfig::default())
        .await
        .unwrap();
    (dir, db_path, dashboard)
}

fn new_project(title: &str) -> NewProject<'_> {
    NewProject {
        title,
        category: None,
        filter: None,
        description: None,
        featured: false,
        tags: &[],
    }
}

fn no_edits(assignments: &[String]) -> ProjectEdits<'_> {
    ProjectEdits {
        assignments,
        add_tags: &[],
        remove_tags: &[],
        add_colors: &[],
    }
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_project_edit_arguments() {
    let cli = Cli::try_parse_from([
        "folio",
        "projects",
        "edit",
        "proj_1",
        "--set",
        "title=Neon",
        "--add-tag",
        "Branding",
        "--add-color",
        "#ff0055",
        "--db-path",
        "/tmp/folio.db",
    ])
    .unwrap();

    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/folio.db")));
    let Commands::Projects {
        command:
            ProjectCommands::Edit {
                id,
                assignments,
                add_tag,
                add_color,
                ..
            },
    } = cli.command
    else {
        panic!("expected projects edit");
    };
    assert_eq!(id, "proj_1");
    assert_eq!(assignments, vec!["title=Neon"]);
    assert_eq!(add_tag, vec!["Branding"]);
    assert_eq!(add_color, vec!["#ff0055"]);
}

#[test]
fn profile_alias_and_required_assignments() {
    let cli = Cli::try_parse_from(["folio", "profile", "show", "--json"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Overview {
            command: OverviewCommands::Show { json: true }
        }
    ));

    assert!(Cli::try_parse_from(["folio", "overview", "set"]).is_err());
}

#[test]
fn parse_assignment_reads_json_or_plain_text() {
    assert_eq!(
        parse_assignment("featured=true").unwrap(),
        ("featured".to_string(), json!(true))
    );
    assert_eq!(
        parse_assignment("title=Neon Brand System").unwrap(),
        ("title".to_string(), json!("Neon Brand System"))
    );
    assert_eq!(
        parse_assignment("specs.colors=[\"#000000\"]").unwrap(),
        ("specs.colors".to_string(), json!(["#000000"]))
    );
    assert_eq!(
        parse_assignment("description=").unwrap(),
        ("description".to_string(), json!(""))
    );

    assert!(matches!(
        parse_assignment("title"),
        Err(CliError::InvalidAssignment(_))
    ));
    assert!(matches!(
        parse_assignment(" =value"),
        Err(CliError::InvalidAssignment(_))
    ));
}

#[test]
fn content_type_guessing() {
    assert_eq!(guess_content_type(Path::new("cover.PNG")), Some("image/png"));
    assert_eq!(guess_content_type(Path::new("reel.mov")), Some("video/quicktime"));
    assert_eq!(guess_content_type(Path::new("notes.txt")), None);
    assert_eq!(guess_content_type(Path::new("README")), None);
}

#[test]
fn read_yes_accepts_only_explicit_yes() {
    assert!(read_yes(&mut "y\n".as_bytes()).unwrap());
    assert!(read_yes(&mut " YES \n".as_bytes()).unwrap());
    assert!(!read_yes(&mut "\n".as_bytes()).unwrap());
    assert!(!read_yes(&mut "nope\n".as_bytes()).unwrap());
    assert!(!read_yes(&mut "".as_bytes()).unwrap());
}

#[test]
fn truncate_collapses_whitespace() {
    assert_eq!(truncate("  Neon   Brand ", 20), "Neon Brand");
    assert_eq!(truncate("A very long project title", 10), "A very ...");
}

#[test]
fn db_path_prefers_flag_then_config() {
    let config = DashboardConfig {
        db_path: Some(PathBuf::from("/srv/folio.db")),
        ..DashboardConfig::default()
    };
    assert_eq!(
        resolve_db_path(Some(PathBuf::from("local.db")), &config),
        PathBuf::from("local.db")
    );
    assert_eq!(resolve_db_path(None, &config), PathBuf::from("/srv/folio.db"));
    assert!(resolve_db_path(None, &DashboardConfig::default()).ends_with("folio/folio.db"));
}

#[test]
fn load_config_reads_file_and_reports_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("folio.json");
    std::fs::write(&path, r#"{ "reorder_debounce_ms": 500 }"#).unwrap();
    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.reorder_debounce_ms, 500);

    std::fs::write(&path, r#"{ "reorder_debounce": 500 }"#).unwrap();
    assert!(matches!(load_config(Some(&path)), Err(CliError::Config(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn add_and_move_projects_persist_order() {
    let (_dir, db_path, dashboard) = open_temp().await;

    let first = projects::run_add(&dashboard, new_project("First")).await.unwrap();
    let second = projects::run_add(&dashboard, new_project("Second")).await.unwrap();
    assert_eq!(first.order, Some(0));
    assert_eq!(second.order, Some(1));

    projects::run_move(&dashboard, &second.id, 0).await.unwrap();
    assert!(!dashboard.projects().has_pending_sync());
    drop(dashboard);

    let reopened = open_dashboard(&db_path, &DashboardConfig::default())
        .await
        .unwrap();
    assert_eq!(reopened.projects().ids(), vec![second.id, first.id]);
}

#[tokio::test(flavor = "multi_thread")]
async fn add_project_validates_input() {
    let (_dir, _db_path, dashboard) = open_temp().await;

    assert!(projects::run_add(&dashboard, new_project("  ")).await.is_err());
    let bad_filter = NewProject {
        filter: Some("sculpture"),
        ..new_project("Neon")
    };
    assert!(projects::run_add(&dashboard, bad_filter).await.is_err());
    assert!(dashboard.projects().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_project_fields_and_tags() {
    let (_dir, _db_path, dashboard) = open_temp().await;
    let created = projects::run_add(&dashboard, new_project("Neon")).await.unwrap();

    let assignments = vec![
        "narrative.challenge=Rebuild the identity".to_string(),
        "featured=true".to_string(),
    ];
    let tags = vec!["Branding".to_string()];
    let colors = vec!["#FF0055".to_string()];
    let changed = projects::run_edit(
        &dashboard,
        &created.id,
        ProjectEdits {
            assignments: &assignments,
            add_tags: &tags,
            remove_tags: &[],
            add_colors: &colors,
        },
    )
    .await
    .unwrap();
    assert!(changed);

    let saved = dashboard.projects().get(&created.id).unwrap();
    assert_eq!(saved.narrative.challenge, "Rebuild the identity");
    assert!(saved.featured);
    assert!(saved.tags.contains(&"Branding".to_string()));
    assert_eq!(saved.order, Some(0));
    assert!(dashboard.session().is_none());

    let unchanged = projects::run_edit(&dashboard, &created.id, no_edits(&[]))
        .await
        .unwrap();
    assert!(!unchanged);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_edit_closes_the_editor() {
    let (_dir, _db_path, dashboard) = open_temp().await;
    let created = projects::run_add(&dashboard, new_project("Neon")).await.unwrap();

    let bad = vec!["featured=\"yes\"".to_string()];
    assert!(projects::run_edit(&dashboard, &created.id, no_edits(&bad))
        .await
        .is_err());
    assert!(dashboard.session().is_none());

    let good = vec!["title=Neon Brand".to_string()];
    assert!(projects::run_edit(&dashboard, &created.id, no_edits(&good))
        .await
        .unwrap());
    assert_eq!(dashboard.projects().get(&created.id).unwrap().title, "Neon Brand");
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_project_asks_for_confirmation() {
    let (_dir, _db_path, dashboard) = open_temp().await;
    let created = projects::run_add(&dashboard, new_project("Neon")).await.unwrap();

    let deleted = projects::run_delete(&dashboard, &created.id, false, &mut "n\n".as_bytes())
        .await
        .unwrap();
    assert!(!deleted);
    assert!(!dashboard.gate().is_pending());
    assert_eq!(dashboard.projects().len(), 1);

    let deleted = projects::run_delete(&dashboard, &created.id, false, &mut "y\n".as_bytes())
        .await
        .unwrap();
    assert!(deleted);
    assert!(dashboard.projects().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_adds_media_to_gallery() {
    let (dir, _db_path, dashboard) = open_temp().await;
    let created = projects::run_add(&dashboard, new_project("Neon")).await.unwrap();
    let file = dir.path().join("hero shot.png");
    std::fs::write(&file, b"png-bytes").unwrap();

    let url = projects::run_upload(&dashboard, &created.id, &file, None)
        .await
        .unwrap();
    assert!(url.starts_with("folio://media/portfolio/"));
    assert!(url.ends_with("_hero_shot.png"));

    let saved = dashboard.projects().get(&created.id).unwrap();
    assert_eq!(saved.gallery.len(), 1);
    assert_eq!(saved.gallery[0].kind, MediaKind::Image);
    assert_eq!(saved.gallery[0].url, url);

    let key = url.trim_start_matches("folio://media/");
    let (content_type, bytes) = dashboard.store().blob(key).await.unwrap().unwrap();
    assert_eq!(content_type, "image/png");
    assert_eq!(bytes, b"png-bytes".to_vec());
}

#[tokio::test(flavor = "multi_thread")]
async fn experience_and_clients_round_trip() {
    let (_dir, db_path, dashboard) = open_temp().await;

    let degree = experience::run_add(&dashboard, "BFA", "Art School", Some("2014 - 2018"), None, true)
        .await
        .unwrap();
    assert_eq!(degree.kind, ExperienceKind::Education);
    let job = experience::run_add(&dashboard, "Designer", "Studio", None, None, false)
        .await
        .unwrap();
    let ids = dashboard
        .experience()
        .items()
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![job.id.clone(), degree.id.clone()]);

    let client = clients::run_add(&dashboard, "Acme", Some("Identity"), Some("2023"), None)
        .await
        .unwrap();
    let edits = vec!["description=Long-running partnership".to_string()];
    assert!(clients::run_edit(&dashboard, &client.id, &edits).await.unwrap());

    assert!(experience::run_delete(&dashboard, &degree.id, true, &mut "".as_bytes())
        .await
        .unwrap());
    drop(dashboard);

    let reopened = open_dashboard(&db_path, &DashboardConfig::default())
        .await
        .unwrap();
    assert_eq!(reopened.experience().len(), 1);
    assert_eq!(
        reopened.clients().get(&client.id).unwrap().description,
        "Long-running partnership"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn overview_stats_are_edited_through_the_profile() {
    let (_dir, _db_path, dashboard) = open_temp().await;

    let assignments = vec!["title=Motion Designer".to_string()];
    assert!(overview::run_set(&dashboard, &assignments).await.unwrap());
    overview::run_add_stat(&dashboard, "Clients", "40+").await.unwrap();
    overview::run_add_stat(&dashboard, "Awards", "12").await.unwrap();
    overview::run_remove_stat(&dashboard, 0).await.unwrap();

    let profile = dashboard.overview();
    assert_eq!(profile.title, "Motion Designer");
    assert_eq!(profile.stats.len(), 1);
    assert_eq!(profile.stats[0].label, "Awards");

    assert!(overview::run_remove_stat(&dashboard, 5).await.is_err());
    assert_eq!(dashboard.overview().stats.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn security_settings_are_validated() {
    let (_dir, _db_path, dashboard) = open_temp().await;

    assert!(security::run_set(&dashboard, None, None, Some("hooks.example.com"))
        .await
        .is_err());

    let settings = security::run_set(
        &dashboard,
        None,
        Some(true),
        Some("https://hooks.example.com/build"),
    )
    .await
    .unwrap();
    assert!(settings.maintenance_mode);

    let cleared = security::run_set(&dashboard, None, None, Some(" ")).await.unwrap();
    assert_eq!(cleared.webhook_url, None);
    assert!(cleared.maintenance_mode);
}

#[tokio::test(flavor = "multi_thread")]
async fn export_writes_json_file() {
    let (dir, _db_path, dashboard) = open_temp().await;
    projects::run_add(&dashboard, new_project("Export me")).await.unwrap();

    let output = dir.path().join("export.json");
    run_export(&dashboard, Some(&output)).unwrap();

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(exported["projects"][0]["title"], "Export me");
    assert!(exported["exportedAt"].is_string());
}

#[test]
fn completions_write_bash_script_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("folio.bash");

    run_completions(CompletionShell::Bash, Some(&output)).unwrap();

    let script = std::fs::read_to_string(&output).unwrap();
    assert!(script.contains("folio"));
}
