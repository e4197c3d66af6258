//! Controller runner - builds the User controller future
//!
//! Construction is split from execution so `main` decides when to drive it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client};

use reqres_client::{ClientError, ReqresClient};
use reqres_common::crd::User;
use reqres_controller::{error_policy, reconcile, Context, KubeUserStore, Reconciler};

use crate::config::OperatorConfig;

/// Watcher timeout (seconds) - must be less than client read_timeout (30s)
/// This forces the API server to close the watch before the client times out,
/// preventing "body read timed out" errors on idle watches.
const WATCH_TIMEOUT_SECS: u32 = 25;

/// Build the shared controller context from configuration
pub fn build_context(client: Client, config: &OperatorConfig) -> Result<Arc<Context>, ClientError> {
    let remote = ReqresClient::new(config.client_config())?;
    let reconciler = Reconciler::new(
        Arc::new(KubeUserStore::new(client)),
        Arc::new(remote),
        config.reconciler_config(),
    );
    Ok(Arc::new(Context::new(reconciler, config.resync)))
}

/// Build the User controller future. It completes on SIGTERM/SIGINT.
pub fn build_user_controller(
    client: Client,
    ctx: Arc<Context>,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    let users: Api<User> = Api::all(client);

    tracing::info!("- User controller");

    Box::pin(
        Controller::new(users, WatcherConfig::default().timeout(WATCH_TIMEOUT_SECS))
            .shutdown_on_signal()
            .run(reconcile, error_policy, ctx)
            .for_each(log_reconcile_result("User")),
    )
}

fn log_reconcile_result<T: std::fmt::Debug, E: std::fmt::Debug>(
    controller_name: &'static str,
) -> impl Fn(Result<T, E>) -> std::future::Ready<()> {
    move |result| {
        match result {
            Ok(action) => tracing::debug!(?action, "{} reconciliation completed", controller_name),
            Err(e) => tracing::error!(error = ?e, "{} reconciliation error", controller_name),
        }
        std::future::ready(())
    }
}
