// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for BizConnect.

use thiserror::Error;

use crate::forms::FormErrors;

/// Top-level error type for all BizConnect operations.
#[derive(Debug, Error)]
pub enum BizError {
    // -- Session --
    #[error("no authenticated user")]
    Unauthenticated,

    #[error("sign-in failed: {0}")]
    SignIn(String),

    // -- Collections --
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("invalid input: {0}")]
    Validation(FormErrors),

    #[error("remote request failed: {0}")]
    Remote(String),

    #[error("request cancelled")]
    Cancelled,

    // -- Storage / persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BizError>;
