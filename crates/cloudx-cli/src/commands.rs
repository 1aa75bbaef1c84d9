//! CLI command implementations

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use cloudx_api::{ContainerBackend, LifecycleRequest};
use cloudx_config::GlobalConfig;
use cloudx_core::html::HtmlSurface;
use cloudx_core::{
    ButtonKind, DispatchOutcome, InventoryFetcher, InventoryPanel, InventoryState,
    LifecycleDispatcher, LogViewState, LogViewer, NoopNotifier, Notifier, RefreshScheduler,
    ToastLevel, TriggerButton,
};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::path::Path;
use std::sync::Arc;

/// Prints notifications: successes to stdout, errors to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, level: ToastLevel) {
        match level {
            ToastLevel::Success => println!("✓ {}", message),
            ToastLevel::Error => eprintln!("✗ {}", message),
            ToastLevel::Info => println!("{}", message),
        }
    }
}

/// A failure the notifier already printed; the process exits non-zero without repeating it
#[derive(Debug)]
pub struct AlreadyReported(pub String);

impl std::fmt::Display for AlreadyReported {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for AlreadyReported {}

/// Ask for a yes/no answer, defaulting to no
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Confirmation needs an interactive terminal (use -y to skip it)")
}

/// List containers
pub async fn list(backend: Arc<dyn ContainerBackend>) -> Result<()> {
    let fetcher = InventoryFetcher::new(backend, Arc::new(NoopNotifier));
    let mut state = InventoryState::default();
    fetcher
        .load(&mut state)
        .await
        .map_err(|e| anyhow!("Failed to load containers: {}", e))?;

    let InventoryPanel::Table(rows) = &state.panel else {
        println!("No containers found.");
        return Ok(());
    };

    // Column widths
    const NAME_WIDTH: usize = 24;
    const STATUS_WIDTH: usize = 12;
    const IMAGE_WIDTH: usize = 28;
    const CREATED_WIDTH: usize = 12;

    println!(
        "  {:<NAME_WIDTH$} {:<STATUS_WIDTH$} {:<IMAGE_WIDTH$} {:<CREATED_WIDTH$} ID",
        "NAME", "STATUS", "IMAGE", "CREATED"
    );
    println!("{}", "-".repeat(92));

    for row in rows {
        println!(
            "{} {:<NAME_WIDTH$} {:<STATUS_WIDTH$} {:<IMAGE_WIDTH$} {:<CREATED_WIDTH$} {}",
            row.status_icon.glyph(),
            truncate(&row.name, NAME_WIDTH),
            truncate(&row.status, STATUS_WIDTH),
            truncate(&row.image, IMAGE_WIDTH),
            row.created_label,
            row.id
        );
    }

    println!(
        "\n{} running, {} stopped",
        state.stats.running, state.stats.stopped
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Press one lifecycle button, then show the container's state after the refresh delay
pub async fn action(
    backend: Arc<dyn ContainerBackend>,
    config: &GlobalConfig,
    container: &str,
    kind: ButtonKind,
) -> Result<()> {
    let action = kind
        .action()
        .ok_or_else(|| anyhow!("{} is not a lifecycle action", kind.label()))?;
    let (scheduler, mut refreshes) = RefreshScheduler::new(config.refresh_delay());
    let dispatcher = LifecycleDispatcher::new(backend.clone(), Arc::new(ConsoleNotifier), scheduler);
    let mut trigger = TriggerButton::new(kind);

    match dispatcher
        .dispatch(LifecycleRequest::new(container, action), &mut trigger)
        .await
    {
        DispatchOutcome::Succeeded => {}
        DispatchOutcome::Failed(e) => return Err(AlreadyReported(e.to_string()).into()),
        DispatchOutcome::Ignored => return Ok(()),
    }

    if refreshes.recv().await.is_none() {
        return Ok(());
    }
    match backend.list().await {
        Ok(records) => match records.iter().find(|r| r.id == container) {
            Some(record) => println!("{} is now {}", record.name, record.status),
            None => println!("{} is no longer listed", container),
        },
        Err(e) => tracing::warn!("Could not refresh containers: {}", e),
    }
    Ok(())
}

/// Print or export a container's logs
pub async fn logs(
    backend: Arc<dyn ContainerBackend>,
    config: &GlobalConfig,
    container: &str,
    name: Option<&str>,
    export: bool,
) -> Result<()> {
    let mut viewer = LogViewer::new();
    viewer
        .open(backend.as_ref(), container, name.unwrap_or_default())
        .await;

    match viewer.state() {
        LogViewState::Loaded { text, .. } => {
            if export {
                let path = viewer.export(&config.export_dir(), Utc::now(), &ConsoleNotifier)?;
                println!("{}", path.display());
            } else {
                println!("{}", text);
            }
            Ok(())
        }
        LogViewState::Failed { message, .. } => bail!("Failed to fetch logs: {}", message),
        other => bail!("Log viewer did not finish loading: {:?}", other),
    }
}

/// Render the inventory as HTML
pub async fn html(backend: Arc<dyn ContainerBackend>, output: Option<&Path>) -> Result<()> {
    let fetcher = InventoryFetcher::new(backend, Arc::new(NoopNotifier));
    let mut surface = HtmlSurface::new();
    // A failed load is rendered into the page as the error state
    if let Err(e) = fetcher.load(&mut surface).await {
        tracing::warn!("Rendering error state: {}", e);
    }
    let document = surface.into_document();

    match output {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", document),
    }
    Ok(())
}

/// Show the effective configuration
pub fn config(config: &GlobalConfig, path: &Path) -> Result<()> {
    if path.exists() {
        println!("# Config file: {:?}\n", path);
    } else {
        println!("# Config file: {:?} (not created yet, showing defaults)\n", path);
    }
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
