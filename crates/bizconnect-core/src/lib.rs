// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// BizConnect core: types, errors, forms, and display formatting shared
// across all crates.

pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod forms;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, SyncPolicy};
pub use error::BizError;
pub use types::*;
