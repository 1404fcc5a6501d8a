pub mod config;
pub mod contract;
pub mod coordinator;
pub mod dispatcher;
pub mod host;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod overlay;
pub mod overlay_state;
pub mod query;
pub mod runtime;
pub mod transport;
