//! Cancellation scopes for page views.
//!
//! Every page view runs its fetches inside a [`ViewScope`]. When the user
//! navigates away the scope is cancelled and any fetch still in flight
//! resolves to `None`, so its result is never applied to a page that is
//! no longer shown.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    /// A scope that is cancelled together with `parent`.
    pub fn child_of(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
        }
    }

    /// Drive `fut` to completion unless the scope is cancelled first.
    ///
    /// Returns `None` if the scope was already cancelled or is cancelled
    /// while `fut` is pending.
    pub async fn run<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future,
    {
        if self.token.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            out = fut => Some(out),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
