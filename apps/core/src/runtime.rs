use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::config::{self, Config, ConfigError};
use crate::contract::Ack;
use crate::coordinator::Coordinator;
use crate::dispatcher::{CommandDispatcher, DispatchError, DispatchOutcome};
use crate::host::{StaticTabHost, TabHost};
use crate::model::Tab;
use crate::overlay::{HeadlessPage, OverlayController, OverlayMarkup, PageError};
use crate::overlay_state::{Key, OverlayEvent, OverlayPhase};
use crate::transport::{self, RequestSender, RequestSink};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to read tabs from {path}: {message}")]
    Tabs { path: PathBuf, message: String },
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    #[error("overlay error: {0}")]
    Overlay(#[from] PageError),
    #[error("logging setup failed: {0}")]
    Logging(std::io::Error),
    #[error("async runtime failed: {0}")]
    Executor(std::io::Error),
}

#[derive(Debug, Parser)]
#[command(name = "tabspot-core")]
#[command(about = "Simulates the tab quick switcher against a tab snapshot")]
pub struct CliOptions {
    /// JSON5 file holding the window's tabs
    #[arg(long)]
    pub tabs: PathBuf,

    /// 0-based position of the active tab
    #[arg(long, default_value_t = 0)]
    pub active: u32,

    /// Config file (defaults to the app data dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to the configured log dir
    #[arg(long)]
    pub log: bool,

    /// Text typed into the overlay before Enter
    pub query: String,
}

/// Session report printed by the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub ack: Option<Ack>,
    pub active: Option<Tab>,
}

/// Starts the coordinator on the current runtime and returns the page-side
/// sender.
pub fn spawn_coordinator<H>(coordinator: Coordinator<H>) -> (RequestSender, tokio::task::JoinHandle<()>)
where
    H: TabHost + 'static,
{
    let (sender, receiver) = transport::channel();
    let handle = tokio::spawn(async move { coordinator.run(receiver).await });
    (sender, handle)
}

pub fn load_tabs(path: &Path) -> Result<Vec<Tab>, RuntimeError> {
    let raw = std::fs::read_to_string(path).map_err(|error| RuntimeError::Tabs {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    json5::from_str::<Vec<Tab>>(&raw).map_err(|error| RuntimeError::Tabs {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

/// Runs one shortcut press, types `query` into the overlay it opened, presses
/// Enter, and waits for the coordinator to finish.
pub async fn simulate_switch(
    cfg: &Config,
    host: StaticTabHost,
    query: &str,
) -> Result<SwitchReport, RuntimeError> {
    let markup = OverlayMarkup::from_config(cfg);
    let host = host.with_markup(markup.clone());
    let outcome = CommandDispatcher::new(&host, cfg)
        .on_command(&cfg.command)
        .await?;

    let (sender, receiver) = transport::channel();
    let acking = AckingSink::new(sender);
    if let DispatchOutcome::Injected(tab_id) = outcome {
        host.with_page(tab_id, |page| type_and_submit(page, &acking, markup, query))
            .transpose()?;
    }
    let pending = acking.take();
    drop(acking);

    let coordinator = Coordinator::new(host);
    coordinator.run(receiver).await;
    let ack = match pending {
        Some(receiver) => receiver.await.ok(),
        None => None,
    };
    let active = coordinator.host().active_tab().await.ok().flatten();
    Ok(SwitchReport { ack, active })
}

fn type_and_submit(
    page: &mut HeadlessPage,
    sink: &AckingSink,
    markup: OverlayMarkup,
    query: &str,
) -> Result<(), PageError> {
    let mut controller = OverlayController::new(page, sink, markup);
    if controller.phase() != OverlayPhase::Open {
        return Ok(());
    }
    for ch in query.chars() {
        controller.handle(OverlayEvent::Key(Key::Char(ch)))?;
    }
    controller.handle(OverlayEvent::Key(Key::Enter))?;
    Ok(())
}

pub fn run_with_options(options: CliOptions) -> Result<SwitchReport, RuntimeError> {
    let cfg = config::load(options.config.as_deref())?;
    if options.log {
        crate::logging::init(&cfg).map_err(RuntimeError::Logging)?;
    } else {
        crate::logging::init_stderr(&cfg).map_err(RuntimeError::Logging)?;
    }
    info!(
        command = cfg.command.as_str(),
        config_path = %cfg.config_path.display(),
        "starting switch simulation"
    );

    let tabs = load_tabs(&options.tabs)?;
    let active = tabs
        .iter()
        .find(|tab| tab.position_index == options.active)
        .map(|tab| tab.id);
    let host = StaticTabHost::new(tabs, active);

    let executor = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(RuntimeError::Executor)?;
    executor.block_on(simulate_switch(&cfg, host, &options.query))
}

/// Keeps the ack receiver of the last request so the CLI can report it.
struct AckingSink {
    sender: RequestSender,
    pending: std::cell::RefCell<Option<tokio::sync::oneshot::Receiver<Ack>>>,
}

impl AckingSink {
    fn new(sender: RequestSender) -> Self {
        Self {
            sender,
            pending: std::cell::RefCell::new(None),
        }
    }

    fn take(&self) -> Option<tokio::sync::oneshot::Receiver<Ack>> {
        self.pending.borrow_mut().take()
    }
}

impl RequestSink for AckingSink {
    fn send(&self, request: crate::contract::MatchRequest) -> Result<(), transport::SendError> {
        let receiver = self.sender.send_with_ack(request)?;
        *self.pending.borrow_mut() = Some(receiver);
        Ok(())
    }
}

pub fn describe(report: &SwitchReport) -> String {
    let outcome = match &report.ack {
        Some(Ack::Activated { tab_id }) => format!("activated tab {tab_id}"),
        Some(Ack::NoMatch) => "no matching tab".to_string(),
        Some(Ack::Failed { message, .. }) => format!("failed: {message}"),
        None => "nothing submitted".to_string(),
    };
    match &report.active {
        Some(tab) => format!("{outcome}; active: #{} {}", tab.position_index + 1, tab.title),
        None => outcome,
    }
}
