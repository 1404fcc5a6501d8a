use tracing::{debug, info, warn};

use crate::contract::MatchRequest;
use crate::host::{HostError, TabHost};
use crate::matcher;
use crate::model::TabId;
use crate::transport::{Envelope, RequestReceiver};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("failed to list tabs: {0}")]
    TabQuery(HostError),
    #[error("failed to activate tab {tab_id}: {source}")]
    Activation { tab_id: TabId, source: HostError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated(TabId),
    NoMatch,
}

/// Privileged side of the switcher: resolves requests against live tabs.
pub struct Coordinator<H> {
    host: H,
}

impl<H: TabHost> Coordinator<H> {
    pub fn new(host: H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub async fn handle_request(&self, request: &MatchRequest) -> Result<Activation, CoordinatorError> {
        let snapshot = self
            .host
            .list_tabs()
            .await
            .map_err(CoordinatorError::TabQuery)?;
        debug!(action = request.action(), tabs = snapshot.len(), "resolving request");

        let Some(tab) = matcher::resolve(request, &snapshot) else {
            match request {
                MatchRequest::ByIndex { index } => {
                    warn!(index, "no tab found at index");
                }
                MatchRequest::ByTitle { query } => {
                    warn!(query = query.as_str(), "no matching tab found for query");
                }
            }
            return Ok(Activation::NoMatch);
        };

        let tab_id = tab.id;
        self.host
            .activate_tab(tab_id)
            .await
            .map_err(|source| CoordinatorError::Activation { tab_id, source })?;
        info!(%tab_id, position = tab.position_index, "activated tab");
        Ok(Activation::Activated(tab_id))
    }

    /// Processes envelopes one at a time until every sender is dropped.
    pub async fn run(&self, mut receiver: RequestReceiver) {
        while let Some(Envelope { request, ack }) = receiver.recv().await {
            let reply = crate::transport::handle_request(self, request).await;
            if let crate::contract::Ack::Failed { message, .. } = &reply {
                warn!(message = message.as_str(), "request failed");
            }
            if let Some(ack) = ack {
                let _ = ack.send(reply);
            }
        }
        debug!("request channel closed; coordinator stopping");
    }
}
