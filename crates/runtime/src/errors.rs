//! The runtime's own error type, wrapping each core error family behind
//! one `?`-friendly enum (spec §7, "[ADDED] Error handling").

use thiserror::Error;

use dialog_engine_core::{RegistrationError, ResolverError, StoreError};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
