// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// BizConnect data access layer.
//
// Views never talk to storage directly. They bind to a remote collection
// through `CollectionBinding`, which publishes whole snapshots (items plus
// loading/mutating flags) and owns the post-mutation sync policy. The
// façade traits in `traits` are the boundary; `sqlite` and `memory` are the
// two implementations shipped with the app.

pub mod auth;
pub mod binding;
pub mod cancel;
pub mod confirm;
pub mod memory;
pub mod session;
pub mod sqlite;
pub mod traits;

pub use auth::LocalAuth;
pub use binding::{CollectionBinding, CollectionSnapshot};
pub use cancel::CancelToken;
pub use confirm::{Confirm, DeleteOutcome, delete_with_confirmation};
pub use memory::MemoryCollection;
pub use session::{Session, SessionReader, SessionState};
pub use sqlite::{SqliteInvoices, SqliteServices, SqliteStore};
pub use traits::{AuthProvider, RemoteCollection, ServiceCatalog};
