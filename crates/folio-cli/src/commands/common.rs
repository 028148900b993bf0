use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use folio_core::board::{ManagedRecord, RecordBoard};
use folio_core::confirm::ConfirmationGate;
use folio_core::models::{Client, Experience, Project};
use folio_core::notify::{NotificationChannel, NotificationKind};
use folio_core::{Dashboard, DashboardConfig, EditSession, EditTarget, LibSqlStore, RemoteStore};
use serde_json::Value;

use crate::error::CliError;

const TITLE_WIDTH: usize = 32;

/// Read the optional config file and apply `FOLIO_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, CliError> {
    let config = match path {
        Some(path) => DashboardConfig::load(path)
            .map_err(|error| CliError::Config(format!("{}: {error}", path.display())))?,
        None => DashboardConfig::default(),
    };
    config
        .with_env()
        .map_err(|error| CliError::Config(error.to_string()))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &DashboardConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("folio")
        .join("folio.db")
}

pub async fn open_dashboard(
    db_path: &Path,
    config: &DashboardConfig,
) -> Result<Dashboard<LibSqlStore>, CliError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut store = LibSqlStore::open(db_path).await?;
    if let Some(base_url) = config.media_base_url.as_deref() {
        store = store.with_media_base_url(base_url);
    }

    let dashboard = Dashboard::new(std::sync::Arc::new(store), config);
    dashboard.load_all().await?;
    Ok(dashboard)
}

/// Split `path=value`. The value is read as JSON, falling back to a plain
/// string so `title=Hello` works without quoting.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), CliError> {
    let (path, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::InvalidAssignment(raw.to_string()))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(CliError::InvalidAssignment(raw.to_string()));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((path.to_string(), value))
}

pub fn parse_assignments(raw: &[String]) -> Result<Vec<(String, Value)>, CliError> {
    raw.iter().map(|item| parse_assignment(item)).collect()
}

/// Open an editor on `target`, apply the assignments and save. The editor
/// is closed afterwards either way.
///
/// Returns whether anything was written.
pub async fn edit_and_save<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    target: EditTarget,
    assignments: &[String],
    extra: impl FnOnce(&mut EditSession) -> folio_core::Result<()>,
) -> Result<bool, CliError> {
    let parsed = parse_assignments(assignments)?;
    dashboard.begin_edit(target)?;
    let result = apply_and_save(dashboard, parsed, extra).await;
    dashboard.discard_session().await;
    result
}

async fn apply_and_save<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    parsed: Vec<(String, Value)>,
    extra: impl FnOnce(&mut EditSession) -> folio_core::Result<()>,
) -> Result<bool, CliError> {
    dashboard.edit_session(|session| {
        for (path, value) in parsed {
            session.set_path(&path, value)?;
        }
        extra(session)
    })??;

    if !dashboard.is_dirty() {
        return Ok(false);
    }
    dashboard.save_session().await?;
    Ok(true)
}

/// Request a confirmed delete, then ask on `input` unless `assume_yes`.
pub async fn delete_with_confirmation<S: RemoteStore, D: ManagedRecord>(
    board: &RecordBoard<S, D>,
    gate: &ConfirmationGate,
    id: &str,
    assume_yes: bool,
    input: &mut impl BufRead,
) -> Result<bool, CliError> {
    board.request_delete(gate, id)?;
    resolve_prompt(gate, assume_yes, input).await
}

/// Answer the pending confirmation. Returns whether its action ran.
pub async fn resolve_prompt(
    gate: &ConfirmationGate,
    assume_yes: bool,
    input: &mut impl BufRead,
) -> Result<bool, CliError> {
    let Some(prompt) = gate.active() else {
        return Ok(false);
    };

    let confirmed = assume_yes || {
        let mut stderr = io::stderr();
        writeln!(stderr, "{}", prompt.title)?;
        writeln!(stderr, "{}", prompt.message)?;
        write!(stderr, "{}? [y/N] ", prompt.confirm_label())?;
        stderr.flush()?;
        read_yes(input)?
    };

    if confirmed {
        Ok(gate.accept().await?)
    } else {
        gate.cancel();
        Ok(false)
    }
}

pub fn read_yes(input: &mut impl BufRead) -> io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Print the latest success notice to stderr.
pub fn report(notifier: &NotificationChannel) {
    if let Some(notification) = notifier.current() {
        if notification.kind == NotificationKind::Success {
            eprintln!("{}", notification.message);
        }
    }
}

pub fn require_text(field: &str, value: &str) -> Result<String, CliError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(folio_core::Error::InvalidInput(format!("{field} must not be empty")).into());
    }
    Ok(value.to_string())
}

/// MIME type from a file extension.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => return None,
    };
    Some(content_type)
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_project_lines(projects: &[Project]) -> Vec<String> {
    projects
        .iter()
        .enumerate()
        .map(|(index, project)| {
            let title = truncate(&project.title, TITLE_WIDTH);
            let featured = if project.featured { "*" } else { " " };
            let order = project
                .order
                .map_or_else(|| "-".to_string(), |order| order.to_string());
            format!(
                "{index:>3} {featured} {:<24}  {title:<32}  {:<9} order={order}",
                project.id,
                project.filter_category.as_str(),
            )
        })
        .collect()
}

pub fn format_experience_lines(entries: &[Experience]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{:<24}  {:<32}  {}",
                entry.id,
                truncate(&format!("{} at {}", entry.role, entry.company), TITLE_WIDTH),
                entry.period
            )
        })
        .collect()
}

pub fn format_client_lines(clients: &[Client]) -> Vec<String> {
    clients
        .iter()
        .map(|client| {
            format!(
                "{:<24}  {:<32}  {}",
                client.id,
                truncate(&client.name, TITLE_WIDTH),
                client.year
            )
        })
        .collect()
}
