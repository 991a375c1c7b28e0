// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the BizConnect marketplace.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse the hyphenated string form used in routes and storage.
            pub fn parse(s: &str) -> Option<Self> {
                Uuid::parse_str(s).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an authenticated account.
    UserId
);
uuid_id!(
    /// Identifier of a listed service.
    ServiceId
);
uuid_id!(
    /// Identifier of an invoice.
    InvoiceId
);

/// A record type that lives in a remote collection.
///
/// `Draft` is the create payload; the data façade assigns `id`, ownership and
/// timestamps.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    type Id: Copy + Eq + Ord + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;
    type Draft: Clone + fmt::Debug + Send + Sync + 'static;

    /// Collection name used in logs and errors.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Build the stored record for `draft`, owned by `owner`, with a fresh id
    /// and timestamps.
    fn materialize(owner: UserId, draft: Self::Draft) -> Self;
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Public display information attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: Option<String>,
    pub company_name: Option<String>,
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub profile: Option<Profile>,
}

impl User {
    /// Name shown in greetings: the profile display name, else the email.
    pub fn greeting_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Denormalized owner info joined onto a service for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOwner {
    pub company_name: Option<String>,
    pub display_name: Option<String>,
}

/// A business offering listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub category: String,
    /// Free-form display string, e.g. "$2,500" or "$50/hr".
    pub price_range: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<ServiceOwner>,
}

impl Service {
    /// Materialize a draft into a stored record owned by `user_id`.
    pub fn from_draft(user_id: UserId, draft: NewService) -> Self {
        let now = Utc::now();
        Self {
            id: ServiceId::new(),
            user_id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            price_range: draft.price_range,
            location: draft.location,
            is_active: true,
            created_at: now,
            updated_at: now,
            owner: None,
        }
    }
}

impl Entity for Service {
    type Id = ServiceId;
    type Draft = NewService;
    const COLLECTION: &'static str = "services";

    fn id(&self) -> ServiceId {
        self.id
    }

    fn materialize(owner: UserId, draft: NewService) -> Self {
        Self::from_draft(owner, draft)
    }
}

/// Create payload for a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Categories offered as browse chips and in the create dialog.
pub const SERVICE_CATEGORIES: &[&str] = &[
    "Marketing",
    "Development",
    "Design",
    "Finance",
    "Consulting",
    "Legal",
    "HR",
    "Sales",
];

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

/// A billing record for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub user_id: UserId,
    /// Calendar month, 1 = January.
    pub month: u8,
    /// Amount in minor currency units (cents).
    pub sales_amount: i64,
    pub invoice_date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Materialize a draft into a stored record owned by `user_id`.
    pub fn from_draft(user_id: UserId, draft: NewInvoice) -> Self {
        Self {
            id: InvoiceId::new(),
            user_id,
            month: draft.month,
            sales_amount: draft.sales_amount,
            invoice_date: draft.invoice_date,
            description: draft.description,
            created_at: Utc::now(),
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;
    type Draft = NewInvoice;
    const COLLECTION: &'static str = "invoices";

    fn id(&self) -> InvoiceId {
        self.id
    }

    fn materialize(owner: UserId, draft: NewInvoice) -> Self {
        Self::from_draft(owner, draft)
    }
}

/// Create payload for an invoice.
///
/// Serializes as `{ month, sales_amount, invoice_date: "YYYY-MM-DD",
/// description? }`; `description` is omitted when empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    pub month: u8,
    pub sales_amount: i64,
    pub invoice_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_prefers_display_name() {
        let mut user = User {
            id: UserId::new(),
            email: "ada@example.com".into(),
            profile: Some(Profile {
                display_name: Some("Ada".into()),
                company_name: None,
            }),
        };
        assert_eq!(user.greeting_name(), "Ada");

        user.profile = Some(Profile::default());
        assert_eq!(user.greeting_name(), "ada@example.com");

        user.profile = None;
        assert_eq!(user.greeting_name(), "ada@example.com");
    }

    #[test]
    fn new_invoice_serializes_iso_date_and_omits_empty_description() {
        let draft = NewInvoice {
            month: 3,
            sales_amount: 15_000,
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: None,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "month": 3,
                "sales_amount": 15000,
                "invoice_date": "2024-03-01"
            })
        );
    }

    #[test]
    fn ids_round_trip_through_display() {
        let id = ServiceId::new();
        assert_eq!(ServiceId::parse(&id.to_string()), Some(id));
        assert_eq!(ServiceId::parse("not-a-uuid"), None);
    }
}
