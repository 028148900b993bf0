use folio_core::models::SecuritySettings;
use folio_core::{Dashboard, RemoteStore};

use crate::commands::common::report;
use crate::error::CliError;

pub async fn run_show<S: RemoteStore>(dashboard: &Dashboard<S>) -> Result<(), CliError> {
    let settings = dashboard.security().await?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub async fn run_set<S: RemoteStore>(
    dashboard: &Dashboard<S>,
    allow_sign_up: Option<bool>,
    maintenance_mode: Option<bool>,
    webhook_url: Option<&str>,
) -> Result<SecuritySettings, CliError> {
    let mut settings = dashboard.security().await?;
    if let Some(allow_sign_up) = allow_sign_up {
        settings.allow_sign_up = allow_sign_up;
    }
    if let Some(maintenance_mode) = maintenance_mode {
        settings.maintenance_mode = maintenance_mode;
    }
    if let Some(url) = webhook_url {
        let url = url.trim();
        settings.webhook_url = (!url.is_empty()).then(|| url.to_string());
    }

    dashboard.save_security(&settings).await?;
    report(dashboard.notifier());
    Ok(settings)
}
