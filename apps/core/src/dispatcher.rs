use tracing::{error, info, warn};

use crate::config::Config;
use crate::host::{HostError, TabHost};
use crate::model::TabId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("no active tab found")]
    NoActiveTab,
    #[error("cannot open the switcher on privileged page {url}")]
    Unscriptable { tab_id: TabId, url: String },
    #[error("failed to look up the active tab: {0}")]
    ActiveTabQuery(HostError),
    #[error("script injection failed for tab {tab_id}: {source}")]
    Injection { tab_id: TabId, source: HostError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Injected(TabId),
    Ignored,
}

/// Handles the registered shortcut by injecting the overlay into the active
/// tab of the current window.
pub struct CommandDispatcher<'a, H> {
    host: &'a H,
    command: String,
    privileged_schemes: Vec<String>,
}

impl<'a, H: TabHost> CommandDispatcher<'a, H> {
    pub fn new(host: &'a H, config: &Config) -> Self {
        Self {
            host,
            command: config.command.clone(),
            privileged_schemes: config.privileged_schemes.clone(),
        }
    }

    pub async fn on_command(&self, command: &str) -> Result<DispatchOutcome, DispatchError> {
        if command != self.command {
            return Ok(DispatchOutcome::Ignored);
        }

        let result = self.inject_into_active_tab().await;
        match &result {
            Ok(DispatchOutcome::Injected(tab_id)) => info!(%tab_id, "overlay injected"),
            Ok(DispatchOutcome::Ignored) => {}
            Err(DispatchError::Unscriptable { url, .. }) => {
                warn!(url = url.as_str(), "cannot activate overlay on privileged pages")
            }
            Err(other) => error!("{other}"),
        }
        result
    }

    async fn inject_into_active_tab(&self) -> Result<DispatchOutcome, DispatchError> {
        let tab = self
            .host
            .active_tab()
            .await
            .map_err(DispatchError::ActiveTabQuery)?
            .ok_or(DispatchError::NoActiveTab)?;

        if tab.is_chrome_page(&self.privileged_schemes) {
            return Err(DispatchError::Unscriptable {
                tab_id: tab.id,
                url: tab.url,
            });
        }

        self.host
            .inject_overlay(tab.id)
            .await
            .map_err(|source| DispatchError::Injection {
                tab_id: tab.id,
                source,
            })?;
        Ok(DispatchOutcome::Injected(tab.id))
    }
}
