use thiserror::Error;

use crate::{
    config_manager::ConfigError, daemon_manager::DaemonState, link::LinkError,
    protocol::Frame,
};

// The main daemon error type
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("Device ready request failed: {0}")]
    Startup(#[source] LinkError),
    #[error("Thermal code {0} is out of the table range")]
    InvalidReading(u8),
    #[error("Thermal status response {0} is too short")]
    ShortResponse(Frame),
    #[error("Control loop can't run from the {0:?} state")]
    NotRunnable(DaemonState),
}
