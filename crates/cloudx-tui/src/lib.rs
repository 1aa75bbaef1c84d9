//! Terminal UI for cloudx
//!
//! Built with Ratatui. Network work runs on spawned tasks; results come back
//! to the UI loop as [`AppEvent`]s and are applied there.

pub mod app;
mod event;
pub mod ui;

pub use app::{App, AppError, AppResult, ToastBar, View};
pub use event::{AppEvent, Event, EventHandler};

use cloudx_api::ContainerBackend;
use cloudx_config::GlobalConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;

/// Run the TUI application
pub async fn run(config: GlobalConfig, backend: Arc<dyn ContainerBackend>) -> AppResult<()> {
    // Log lines would corrupt the display; the guard restores the previous subscriber
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(tracing_subscriber::layer::Identity::new()),
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut app = App::new(config, backend);
    let res = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}
