//! Single-writer actor.
//!
//! All mutations go through one dedicated connection processed serially by
//! a background task, and every job runs inside an immediate transaction.
//! This is what makes a contribution's read-plan-apply cycle atomic: two
//! transactions matching the same goal near-simultaneously are applied one
//! after the other against committed state, so neither is lost and the
//! completion check never sees a stale amount.

use std::any::Any;

use diesel::SqliteConnection;
use tokio::sync::{mpsc, oneshot};

use fintrack_core::errors::Result;

use super::DbPool;
use crate::errors::StorageError;

// Boxed closure executed on the writer's connection. Uses core::Result
// since that is what callers expect back.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

/// Handle for sending jobs to the writer actor. Cheap to clone; every
/// repository holds one.
#[derive(Clone)]
pub struct WriteHandle {
    // Box<dyn Any + Send> erases the job's return type so one channel can
    // carry jobs with different result types.
    #[allow(clippy::type_complexity)]
    tx: mpsc::Sender<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection
    /// and returns its result once the transaction commits or rolls back.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor's receiving channel was closed, indicating the actor stopped.");

        ret_rx
            .await
            .expect("Writer actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. The actor owns one connection from the pool for its whole
/// lifetime and processes jobs strictly in arrival order.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<(
        Job<Box<dyn Any + Send + 'static>>,
        oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>,
    )>(1024);

    tokio::spawn(async move {
        let mut conn = pool
            .get()
            .expect("Failed to get a connection from the DB pool for the writer actor.");

        while let Some((job, reply_tx)) = rx.recv().await {
            // StorageError::Core keeps typed domain errors (duplicate
            // contribution, auto-tracking disabled) intact across the
            // transaction boundary.
            let result: Result<Box<dyn Any + Send + 'static>> = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    job(c).map_err(StorageError::from)
                })
                .map_err(|e: StorageError| e.into());

            // Receiver may have been dropped (request cancelled); that is
            // not the actor's problem.
            let _ = reply_tx.send(result);
        }
        // Channel closed: all WriteHandles dropped, actor terminates.
    });

    WriteHandle { tx }
}
