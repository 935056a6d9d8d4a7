//! Transaction envelope used by the transactional repository decorators.

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, warn};

use crate::libsql::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionErrorKind {
    Begin,
    Operation,
    Commit,
    Rollback,
}

/// Failure of one [`Transactioner::run`] call.
///
/// `Operation` carries the error of the wrapped operation untouched, so callers
/// can recover its original kind after the transaction layer.
#[derive(Error, Debug)]
pub enum TransactionError<E> {
    #[error("transactioner: cannot begin transaction")]
    Begin(#[source] anyhow::Error),
    #[error("transactioner: operation failed")]
    Operation(#[source] E),
    #[error("transactioner: cannot commit transaction")]
    Commit(#[source] anyhow::Error),
    #[error("transactioner: cannot rollback transaction")]
    Rollback {
        #[source]
        source: anyhow::Error,
        operation: E,
    },
}

impl<E> TransactionError<E> {
    pub fn kind(&self) -> TransactionErrorKind {
        match self {
            TransactionError::Begin(_) => TransactionErrorKind::Begin,
            TransactionError::Operation(_) => TransactionErrorKind::Operation,
            TransactionError::Commit(_) => TransactionErrorKind::Commit,
            TransactionError::Rollback { .. } => TransactionErrorKind::Rollback,
        }
    }

    /// The error returned by the wrapped operation, if it failed.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            TransactionError::Operation(e) | TransactionError::Rollback { operation: e, .. } => {
                Some(e)
            }
            TransactionError::Begin(_) | TransactionError::Commit(_) => None,
        }
    }

    /// Unwraps an `Operation` failure, handing back every other variant as is.
    pub fn into_operation(self) -> Result<E, Self> {
        match self {
            TransactionError::Operation(e) => Ok(e),
            other => Err(other),
        }
    }
}

/// Runs one logical operation inside a begin/commit/rollback envelope.
///
/// Implementors provide the three primitives; [`Transactioner::run`] owns the
/// envelope, so exactly one of `commit` or `rollback` follows a successful
/// `begin`, and nothing is retried.
pub trait Transactioner: Send + Sync {
    type Scope: Send;

    fn begin(&self) -> impl Future<Output = Result<Self::Scope, anyhow::Error>> + Send;

    fn commit(&self, scope: Self::Scope) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn rollback(
        &self,
        scope: Self::Scope,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;

    fn run<T, E, F>(
        &self,
        operation: F,
    ) -> impl Future<Output = Result<T, TransactionError<E>>> + Send
    where
        F: Future<Output = Result<T, E>> + Send,
        T: Send,
        E: Send,
    {
        async move {
            let scope = self.begin().await.map_err(|e| {
                error!(error = ?e, "failed to begin transaction");
                TransactionError::Begin(e)
            })?;

            match operation.await {
                Ok(value) => {
                    self.commit(scope).await.map_err(|e| {
                        error!(error = ?e, "failed to commit transaction");
                        TransactionError::Commit(e)
                    })?;
                    Ok(value)
                }
                Err(operation) => {
                    warn!("operation failed, rolling back transaction");
                    match self.rollback(scope).await {
                        Ok(()) => Err(TransactionError::Operation(operation)),
                        Err(source) => {
                            error!(error = ?source, "failed to rollback transaction");
                            Err(TransactionError::Rollback { source, operation })
                        }
                    }
                }
            }
        }
    }
}

/// Transactioner over the shared libsql connection.
///
/// All repositories share one connection, so only one transaction scope may be
/// open at a time; scopes are serialised by an async mutex held until the scope
/// is committed, rolled back or dropped.
#[derive(Clone)]
pub struct LibsqlTransactioner {
    conn: Connection,
    lock: Arc<Mutex<()>>,
}

impl LibsqlTransactioner {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            lock: Arc::new(Mutex::new(())),
        }
    }
}

/// An open libsql transaction. Dropping it unfinished rolls the transaction back.
pub struct LibsqlScope {
    tx: Option<libsql::Transaction>,
    permit: Option<OwnedMutexGuard<()>>,
}

impl LibsqlScope {
    fn take(
        &mut self,
    ) -> Result<(libsql::Transaction, Option<OwnedMutexGuard<()>>), anyhow::Error> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| anyhow::anyhow!("transaction scope already finished"))?;
        Ok((tx, self.permit.take()))
    }
}

impl Drop for LibsqlScope {
    fn drop(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let permit = self.permit.take();
        warn!("transaction scope dropped before completion, rolling back");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = tx.rollback().await {
                        error!(error = ?e, "failed to rollback abandoned transaction");
                    }
                    drop(permit);
                });
            }
            Err(_) => {
                // libsql's own drop rolls back; the permit must outlive it.
                error!("no runtime available to rollback abandoned transaction");
                drop(tx);
                drop(permit);
            }
        }
    }
}

impl Transactioner for LibsqlTransactioner {
    type Scope = LibsqlScope;

    async fn begin(&self) -> Result<LibsqlScope, anyhow::Error> {
        let permit = self.lock.clone().lock_owned().await;
        let tx = self
            .conn
            .transaction()
            .await
            .context("failed to begin libsql transaction")?;
        debug!("transaction started");
        Ok(LibsqlScope {
            tx: Some(tx),
            permit: Some(permit),
        })
    }

    async fn commit(&self, mut scope: LibsqlScope) -> Result<(), anyhow::Error> {
        let (tx, _permit) = scope.take()?;
        tx.commit()
            .await
            .context("failed to commit libsql transaction")?;
        debug!("transaction committed");
        Ok(())
    }

    async fn rollback(&self, mut scope: LibsqlScope) -> Result<(), anyhow::Error> {
        let (tx, _permit) = scope.take()?;
        tx.rollback()
            .await
            .context("failed to rollback libsql transaction")?;
        debug!("transaction rolled back");
        Ok(())
    }
}
