//! kube-runtime adapter for the User reconciler
//!
//! Maps each pass [`Outcome`] to a controller [`Action`]: converged records
//! are re-checked after the resync interval so remote-side drift is noticed,
//! retries go through the per-key [`KeyBackoff`].

use std::sync::Arc;
use std::time::Duration;

use kube::runtime::controller::Action;
use kube::ResourceExt;
use tracing::{debug, error};

use reqres_common::crd::User;

use crate::backoff::KeyBackoff;
use crate::error::Error;
use crate::reconciler::{Outcome, Reconciler};
use crate::store::RecordKey;

/// Shared context for the User controller
pub struct Context {
    /// State machine run for every event
    pub reconciler: Reconciler,
    /// Consecutive-retry tracking per record
    pub backoff: KeyBackoff,
    /// Requeue interval for converged records
    pub resync: Duration,
}

impl Context {
    /// Create a context with an empty backoff table
    pub fn new(reconciler: Reconciler, resync: Duration) -> Self {
        Self {
            reconciler,
            backoff: KeyBackoff::new(),
            resync,
        }
    }
}

/// Reconcile a User resource
pub async fn reconcile(user: Arc<User>, ctx: Arc<Context>) -> Result<Action, Error> {
    let key = RecordKey::for_user(&user).map_err(|_| Error::MissingNamespace)?;
    let backoff_key = key.to_string();

    match ctx.reconciler.reconcile(&key).await {
        Outcome::Converged => {
            ctx.backoff.reset(&backoff_key);
            Ok(Action::requeue(ctx.resync))
        }
        Outcome::RetryAfter(delay) => {
            let delay = ctx.backoff.next_delay(&backoff_key, delay);
            debug!(user = %backoff_key, ?delay, "requeueing user");
            Ok(Action::requeue(delay))
        }
        Outcome::Fatal(e) => Err(e),
    }
}

/// Error policy for User reconciliation
pub fn error_policy(user: Arc<User>, error: &Error, ctx: Arc<Context>) -> Action {
    let backoff_key = format!("{}/{}", user.namespace().unwrap_or_default(), user.name_any());
    error!(?error, user = %backoff_key, "user reconciliation failed");
    Action::requeue(
        ctx.backoff
            .next_delay(&backoff_key, ctx.reconciler.config().retry_delay),
    )
}
