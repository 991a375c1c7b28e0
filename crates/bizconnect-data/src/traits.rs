// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data façade boundary.
//
// These traits are everything the UI layer knows about persistence and
// authentication. Ownership is the implementation's job: a
// `RemoteCollection` handed to a view is already scoped to one user.

use async_trait::async_trait;

use bizconnect_core::error::Result;
use bizconnect_core::types::{Entity, Profile, Service, ServiceId, User, UserId};

/// One user's view of a named remote collection.
#[async_trait]
pub trait RemoteCollection<T: Entity>: Send + Sync {
    /// The full collection, newest first.
    async fn fetch_all(&self) -> Result<Vec<T>>;

    /// Persist a new record and return it with server-assigned fields.
    async fn create(&self, draft: T::Draft) -> Result<T>;

    /// Remove a record. Fails with `NotFound` if it does not exist or
    /// belongs to someone else.
    async fn delete(&self, id: T::Id) -> Result<()>;
}

/// Public, read-only listing of services for the browse page.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Active services from every owner, newest first, with owner info joined.
    async fn browse(&self) -> Result<Vec<Service>>;

    async fn service(&self, id: ServiceId) -> Result<Option<Service>>;
}

/// Account boundary.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The user remembered from a previous run, if any.
    async fn restore(&self) -> Result<Option<User>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    async fn sign_out(&self) -> Result<()>;

    async fn update_profile(&self, user: UserId, profile: Profile) -> Result<User>;
}
