//! Cancellation and timeout for long-running build steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Shared flag a host flips to abort a running build.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancellation token combined with an optional deadline.
///
/// Checked between stages and between archive entries.
#[derive(Debug, Clone, Default)]
pub struct BuildSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl BuildSignal {
    pub fn new(token: CancellationToken, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| Instant::now() + t),
        }
    }

    /// A signal that never fires.
    pub fn none() -> Self {
        Self::default()
    }

    /// Fails with [`Error::Cancelled`] once the token is cancelled or the deadline passed.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                tracing::warn!("Build deadline elapsed");
                return Err(Error::Cancelled);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let signal = BuildSignal::new(token.clone(), None);
        assert!(signal.check().is_ok());

        token.cancel();
        assert!(matches!(signal.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn zero_timeout_fires() {
        let signal = BuildSignal::new(CancellationToken::new(), Some(Duration::ZERO));
        assert!(matches!(signal.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn none_never_fires() {
        assert!(BuildSignal::none().check().is_ok());
    }
}
