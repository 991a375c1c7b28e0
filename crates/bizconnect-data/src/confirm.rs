// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delete behind a blocking confirmation prompt.

use tracing::{info, warn};

use bizconnect_core::error::{BizError, Result};
use bizconnect_core::types::Entity;

use crate::binding::CollectionBinding;
use crate::cancel::CancelToken;

/// Blocking yes/no prompt.
pub trait Confirm {
    /// Ask the user; `true` means go ahead.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// What happened to a delete request.
#[derive(Debug)]
pub enum DeleteOutcome {
    /// The user said no; nothing was sent.
    Declined,
    /// Deleted remotely and the binding has resynced.
    Deleted,
    /// The view went away before the delete settled.
    Cancelled,
    Failed(BizError),
}

/// Ask `confirm` with `prompt`; on yes, delete `id` through `binding` and
/// wait for it to settle.
///
/// The prompt runs before anything else, so declining issues no request.
/// The post-delete resync is the binding's, so a reload-after-mutation
/// binding refetches exactly once per confirmed delete.
pub async fn delete_with_confirmation<T: Entity>(
    binding: &CollectionBinding<T>,
    id: T::Id,
    prompt: &str,
    confirm: &impl Confirm,
    cancel: &CancelToken,
) -> DeleteOutcome {
    if !confirm.confirm(prompt) {
        info!(collection = T::COLLECTION, %id, "delete declined");
        return DeleteOutcome::Declined;
    }
    match binding.delete(id, cancel).await {
        Ok(()) => DeleteOutcome::Deleted,
        Err(BizError::Cancelled) => DeleteOutcome::Cancelled,
        Err(e) => {
            warn!(collection = T::COLLECTION, %id, error = %e, "confirmed delete failed");
            DeleteOutcome::Failed(e)
        }
    }
}

impl DeleteOutcome {
    pub fn into_result(self) -> Result<bool> {
        match self {
            Self::Declined => Ok(false),
            Self::Deleted => Ok(true),
            Self::Cancelled => Err(BizError::Cancelled),
            Self::Failed(e) => Err(e),
        }
    }
}
