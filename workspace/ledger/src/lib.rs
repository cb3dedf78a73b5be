//! The budget ledger and approval-workflow engine.
//!
//! Everything that has to be correct under concurrent writes lives here: the
//! per-entity state machines, the balance store that mutates shared budget
//! aggregates, the workflow coordinator that ties a transition and its ledger
//! effect into one atomic unit of work, the append-only history log, and the
//! read-side rollups. The crate knows nothing about HTTP or rendering; a thin
//! API layer invokes it with an already-authenticated actor.

pub mod audit;
pub mod auth;
pub mod balance;
pub mod error;
pub mod machine;
pub mod summary;
pub mod workflow;

pub use auth::{Actor, Authorizer, EntityRef, RoleAuthorizer};
pub use error::{LedgerError, Result};
pub use workflow::{Coordinator, MonthlyRecordUpdate, NewOmExpense, TransitionRequest};
