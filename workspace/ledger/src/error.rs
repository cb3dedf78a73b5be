use thiserror::Error;

/// Error taxonomy for the ledger engine.
///
/// Everything except `Database` is a typed, recoverable outcome that the API
/// boundary maps to a 4xx response. `Database` means the transaction was
/// rolled back by the storage layer and nothing was committed.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The action is not legal from the entity's current state.
    #[error("{entity} cannot '{action}' from state {from}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        action: &'static str,
    },

    /// The action is legal in principle but the entity fails a precondition,
    /// e.g. submitting an expense with no line items.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The authorization collaborator declined the action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Optimistic version mismatch on the entity or a shared balance. The
    /// caller must refetch and resubmit; the ledger never retries on its own.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Error from the database operations
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Type alias for Result with LedgerError
pub type Result<T> = std::result::Result<T, LedgerError>;
