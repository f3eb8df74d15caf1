//! Hand-off between async callers and the blocking `SQLite` work.
//!
//! Every request becomes one task on tokio's blocking pool. The task locks the shared
//! connection slot when it starts running, not when it is queued, so it always sees the
//! current lifecycle state. Runs against the same slot are serialized by its mutex; across
//! requests there is no ordering guarantee.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::SqliteBridgeError;
use crate::executor::execute_batch;
use crate::results::ResultSet;
use crate::types::ColumnPolicy;

/// The connection owned by one [`Database`](crate::Database), plus the settings its executor
/// runs read.
#[derive(Debug, Default)]
pub(crate) struct ConnectionState {
    pub(crate) conn: Option<rusqlite::Connection>,
    pub(crate) policy: ColumnPolicy,
}

pub(crate) type SharedConnection = Arc<Mutex<ConnectionState>>;

/// Run synchronous work against the shared connection on the blocking pool.
pub(crate) async fn run_blocking<F, R>(
    shared: SharedConnection,
    func: F,
) -> Result<R, SqliteBridgeError>
where
    F: FnOnce(&mut ConnectionState) -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = shared.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(SqliteBridgeError::from)
}

/// Queue one batch for execution and return its completion handle right away.
pub(crate) fn dispatch(shared: SharedConnection, sql: String) -> PendingQuery {
    let Ok(handle) = Handle::try_current() else {
        return PendingQuery::failed(SqliteBridgeError::ConnectionError(
            "no async runtime available".into(),
        ));
    };

    tracing::trace!(bytes = sql.len(), "dispatching sqlite batch");
    let task = handle.spawn_blocking(move || {
        let guard = shared.blocking_lock();
        let outcome = execute_batch(guard.conn.as_ref(), &sql, guard.policy);
        if let Err(err) = &outcome {
            tracing::debug!(error = %err, "sqlite batch failed");
        }
        outcome
    });
    PendingQuery {
        state: PendingState::Running(task),
    }
}

/// Completion handle for one `exec` call.
///
/// The batch is already queued when this value is created; awaiting it yields the batch's
/// outcome exactly once. Dropping it does not cancel the work, which still runs to the end.
#[must_use = "the query runs regardless, but its outcome is only observable by awaiting"]
#[derive(Debug)]
pub struct PendingQuery {
    state: PendingState,
}

#[derive(Debug)]
enum PendingState {
    Running(JoinHandle<Result<ResultSet, SqliteBridgeError>>),
    Failed(Option<SqliteBridgeError>),
}

impl PendingQuery {
    fn failed(err: SqliteBridgeError) -> Self {
        Self {
            state: PendingState::Failed(Some(err)),
        }
    }

    /// Whether the outcome is ready to be taken without waiting.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.state {
            PendingState::Running(task) => task.is_finished(),
            PendingState::Failed(_) => true,
        }
    }
}

impl Future for PendingQuery {
    type Output = Result<ResultSet, SqliteBridgeError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            PendingState::Running(task) => match Pin::new(task).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(join_err)) => Poll::Ready(Err(join_err.into())),
                Poll::Pending => Poll::Pending,
            },
            PendingState::Failed(err) => Poll::Ready(Err(err.take().unwrap_or_else(|| {
                SqliteBridgeError::ExecutionError("query outcome already taken".into())
            }))),
        }
    }
}
