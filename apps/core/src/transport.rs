use tokio::sync::{mpsc, oneshot};

use crate::contract::{Ack, ErrorCode, MatchRequest};
use crate::coordinator::{Activation, Coordinator, CoordinatorError};
use crate::host::TabHost;

#[derive(Debug)]
pub struct Envelope {
    pub request: MatchRequest,
    pub ack: Option<oneshot::Sender<Ack>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("coordinator channel is closed")]
    Closed,
}

/// Outbound side of the page-to-coordinator channel.
pub trait RequestSink {
    fn send(&self, request: MatchRequest) -> Result<(), SendError>;
}

impl<T: RequestSink + ?Sized> RequestSink for &T {
    fn send(&self, request: MatchRequest) -> Result<(), SendError> {
        (**self).send(request)
    }
}

#[derive(Debug, Clone)]
pub struct RequestSender {
    tx: mpsc::UnboundedSender<Envelope>,
}

pub type RequestReceiver = mpsc::UnboundedReceiver<Envelope>;

pub fn channel() -> (RequestSender, RequestReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RequestSender { tx }, rx)
}

impl RequestSender {
    pub fn send_with_ack(&self, request: MatchRequest) -> Result<oneshot::Receiver<Ack>, SendError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                ack: Some(ack_tx),
            })
            .map_err(|_| SendError::Closed)?;
        Ok(ack_rx)
    }
}

impl RequestSink for RequestSender {
    fn send(&self, request: MatchRequest) -> Result<(), SendError> {
        self.tx
            .send(Envelope { request, ack: None })
            .map_err(|_| SendError::Closed)
    }
}

pub async fn handle_request<H: TabHost>(coordinator: &Coordinator<H>, request: MatchRequest) -> Ack {
    match coordinator.handle_request(&request).await {
        Ok(Activation::Activated(tab_id)) => Ack::Activated { tab_id },
        Ok(Activation::NoMatch) => Ack::NoMatch,
        Err(error) => map_coordinator_error(error),
    }
}

pub async fn handle_json<H: TabHost>(coordinator: &Coordinator<H>, payload: &str) -> String {
    let ack = match decode_request(payload) {
        Ok(request) => handle_request(coordinator, request).await,
        Err(ack) => ack,
    };

    serde_json::to_string(&ack)
        .unwrap_or_else(|_| r#"{"status":"failed","code":"invalid_request","message":"unencodable ack"}"#.to_string())
}

fn decode_request(payload: &str) -> Result<MatchRequest, Ack> {
    let value = serde_json::from_str::<serde_json::Value>(payload).map_err(|error| Ack::Failed {
        code: ErrorCode::InvalidJson,
        message: error.to_string(),
    })?;
    serde_json::from_value::<MatchRequest>(value).map_err(|error| Ack::Failed {
        code: ErrorCode::InvalidRequest,
        message: error.to_string(),
    })
}

fn map_coordinator_error(error: CoordinatorError) -> Ack {
    let code = match &error {
        CoordinatorError::TabQuery(_) => ErrorCode::TabQuery,
        CoordinatorError::Activation { .. } => ErrorCode::Activation,
    };
    Ack::Failed {
        code,
        message: error.to_string(),
    }
}
