//! Common transport-layer types shared between the ledger crate and the
//! API layer. These are plain read-model shapes with no persistence or
//! workflow logic attached.

mod summary;

pub use summary::{
    CategoryUtilization, OmExpenseSummary, OmSummary, OpCoRollup, OpCoSummary, PoolSummary,
};
