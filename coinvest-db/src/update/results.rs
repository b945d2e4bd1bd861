use thiserror::Error;

use crate::queries;
use crate::state::StateUpdateErr;

#[derive(Error, Debug)]
pub enum UpdateFailure {
    #[error("Failed to apply state update: {0}")]
    Apply(#[from] StateUpdateErr),
    #[error("Failed to store state update: {0}")]
    Store(#[from] queries::Error),
    #[error("Update worker is not running")]
    WorkerClosed,
}

/// Outcome of a single update as reported by the update worker
pub type UpdateResult = Result<(), UpdateFailure>;
