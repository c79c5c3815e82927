use std::io;

use tokio::{
    select,
    signal::unix::{Signal, SignalKind, signal},
};
use tokio_util::sync::CancellationToken;
use tracing::info;

// SIGINT and SIGTERM handlers. Both are registered on install, from then
// on a termination signal is queued instead of killing the process
pub struct TerminationSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl TerminationSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    // Wait for a termination signal or for the token to be cancelled
    // elsewhere, return the signal that arrived if any
    pub async fn wait(mut self, token: &CancellationToken) -> Option<SignalKind> {
        select! {
            _ = token.cancelled() => None,
            _ = self.interrupt.recv() => {
                info!("Received SIGINT");
                Some(SignalKind::interrupt())
            },
            _ = self.terminate.recv() => {
                info!("Received SIGTERM");
                Some(SignalKind::terminate())
            },
        }
    }
}
