//! Optional deadline around backend round-trips

use sqlprobe_core::{Connection, ProbeError, Result};
use std::future::Future;
use std::time::Duration;

/// Await `fut`, failing with `ProbeError::Timeout` if `limit` is set and
/// elapses first. With no limit the future runs to completion.
pub(crate) async fn within<T>(
    limit: Option<Duration>,
    operation: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        None => fut.await,
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            ProbeError::Timeout(format!("{} did not finish within {:?}", operation, limit))
        })?,
    }
}

/// Release `conn` once a call is done with it.
///
/// After a timed-out round-trip the connection is dropped without a graceful
/// close: closing may first wait for the abandoned statement to finish.
/// Otherwise `close` runs under the same deadline as the round-trips.
pub(crate) async fn release(
    conn: Box<dyn Connection>,
    limit: Option<Duration>,
    timed_out: bool,
) {
    if timed_out {
        tracing::warn!("dropping connection after timeout without closing it");
        drop(conn);
        return;
    }
    if let Err(e) = within(limit, "close", conn.close()).await {
        tracing::warn!(error = %e, "failed to close connection");
    }
}

/// Whether `result` failed because a deadline expired
pub(crate) fn timed_out<T>(result: &Result<T>) -> bool {
    matches!(result, Err(ProbeError::Timeout(_)))
}
