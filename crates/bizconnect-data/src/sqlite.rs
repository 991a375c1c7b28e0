// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local SQLite backend.
//
// One database holds accounts, the remembered session, services and
// invoices. Every owner-scoped query filters on `user_id`, so a collection
// handed to a view can only ever see or delete its owner's rows.
//
// Calls are short and synchronous; the connection sits behind a
// `std::sync::Mutex` that is never held across an await.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument};

use bizconnect_core::error::{BizError, Result};
use bizconnect_core::forms::ISO_DATE;
use bizconnect_core::types::{
    Invoice, InvoiceId, NewInvoice, NewService, Profile, Service, ServiceId, ServiceOwner, User,
    UserId,
};

use crate::traits::{RemoteCollection, ServiceCatalog};

const CREATE_TABLES_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        display_name TEXT,
        company_name TEXT,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS session (
        slot INTEGER PRIMARY KEY CHECK (slot = 0),
        user_id TEXT NOT NULL REFERENCES users(id)
    );
    CREATE TABLE IF NOT EXISTS services (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        price_range TEXT,
        location TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS services_user ON services(user_id);
    CREATE TABLE IF NOT EXISTS invoices (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL REFERENCES users(id),
        month INTEGER NOT NULL,
        sales_amount INTEGER NOT NULL,
        invoice_date TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS invoices_user ON invoices(user_id);
"#;

const SERVICE_COLUMNS: &str = "s.id, s.user_id, s.title, s.description, s.category,
    s.price_range, s.location, s.is_active, s.created_at, s.updated_at,
    u.id, u.display_name, u.company_name
    FROM services s LEFT JOIN users u ON u.id = s.user_id";

const INVOICE_COLUMNS: &str =
    "id, user_id, month, sales_amount, invoice_date, description, created_at FROM invoices";

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> BizError + '_ {
    move |e| BizError::Database(format!("{context}: {e}"))
}

/// Shared handle to the BizConnect database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) the database at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref()).map_err(db_err("open"))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(db_err("WAL pragma"))?;
        let store = Self::init(conn)?;
        info!("database opened");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err("open in-memory"))?;
        let store = Self::init(conn)?;
        debug!("in-memory database opened");
        Ok(store)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(db_err("foreign_keys pragma"))?;
        conn.execute_batch(CREATE_TABLES_SQL)
            .map_err(db_err("create tables"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BizError::Database("connection lock poisoned".into()))
    }

    // -- Accounts -----------------------------------------------------------

    /// Return the account for `email`, creating it on first use.
    #[instrument(skip(self))]
    pub fn upsert_user(&self, email: &str) -> Result<User> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
            params![UserId::new().to_string(), email, Utc::now().to_rfc3339()],
        )
        .map_err(db_err("insert user"))?;
        conn.query_row(
            "SELECT id, email, display_name, company_name FROM users WHERE email = ?1",
            params![email],
            row_to_user,
        )
        .map_err(db_err("select user"))
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.conn()?
            .query_row(
                "SELECT id, email, display_name, company_name FROM users WHERE id = ?1",
                params![id.to_string()],
                row_to_user,
            )
            .optional()
            .map_err(db_err("get user"))
    }

    #[instrument(skip(self, profile), fields(user = %id))]
    pub fn update_profile(&self, id: UserId, profile: &Profile) -> Result<User> {
        let rows = self
            .conn()?
            .execute(
                "UPDATE users SET display_name = ?1, company_name = ?2 WHERE id = ?3",
                params![profile.display_name, profile.company_name, id.to_string()],
            )
            .map_err(db_err("update profile"))?;
        if rows == 0 {
            return Err(BizError::NotFound {
                collection: "users",
                id: id.to_string(),
            });
        }
        self.get_user(id)?.ok_or(BizError::NotFound {
            collection: "users",
            id: id.to_string(),
        })
    }

    /// Remember (or forget, with `None`) the signed-in user across runs.
    pub fn set_current_user(&self, id: Option<UserId>) -> Result<()> {
        let conn = self.conn()?;
        match id {
            Some(id) => conn.execute(
                "INSERT INTO session (slot, user_id) VALUES (0, ?1)
                 ON CONFLICT(slot) DO UPDATE SET user_id = excluded.user_id",
                params![id.to_string()],
            ),
            None => conn.execute("DELETE FROM session", []),
        }
        .map_err(db_err("write session"))?;
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        self.conn()?
            .query_row(
                "SELECT u.id, u.email, u.display_name, u.company_name
                 FROM session s JOIN users u ON u.id = s.user_id WHERE s.slot = 0",
                [],
                row_to_user,
            )
            .optional()
            .map_err(db_err("read session"))
    }

    // -- Services -----------------------------------------------------------

    #[instrument(skip(self, service), fields(service_id = %service.id))]
    pub fn insert_service(&self, service: &Service) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO services (id, user_id, title, description, category,
                 price_range, location, is_active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    service.id.to_string(),
                    service.user_id.to_string(),
                    service.title,
                    service.description,
                    service.category,
                    service.price_range,
                    service.location,
                    service.is_active,
                    service.created_at.to_rfc3339(),
                    service.updated_at.to_rfc3339(),
                ],
            )
            .map_err(db_err("insert service"))?;
        Ok(())
    }

    /// One owner's services, active or not, newest first.
    pub fn services_for_user(&self, owner: UserId) -> Result<Vec<Service>> {
        self.query_services(
            "WHERE s.user_id = ?1 ORDER BY s.created_at DESC, s.rowid DESC",
            params![owner.to_string()],
        )
    }

    /// Every owner's active services, newest first.
    pub fn active_services(&self) -> Result<Vec<Service>> {
        self.query_services(
            "WHERE s.is_active = 1 ORDER BY s.created_at DESC, s.rowid DESC",
            [],
        )
    }

    pub fn get_service(&self, id: ServiceId) -> Result<Option<Service>> {
        Ok(self
            .query_services("WHERE s.id = ?1", params![id.to_string()])?
            .into_iter()
            .next())
    }

    /// Delete `id` if `owner` owns it.
    #[instrument(skip(self), fields(service_id = %id))]
    pub fn delete_service(&self, owner: UserId, id: ServiceId) -> Result<()> {
        let rows = self
            .conn()?
            .execute(
                "DELETE FROM services WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(db_err("delete service"))?;
        if rows == 0 {
            return Err(BizError::NotFound {
                collection: "services",
                id: id.to_string(),
            });
        }
        info!(service_id = %id, "service deleted");
        Ok(())
    }

    pub fn service_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))
            .map_err(db_err("count services"))?;
        Ok(count as usize)
    }

    fn query_services(&self, clause: &str, args: impl rusqlite::Params) -> Result<Vec<Service>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!("SELECT {SERVICE_COLUMNS} {clause}"))
            .map_err(db_err("prepare services"))?;
        let services = stmt
            .query_map(args, row_to_service)
            .map_err(db_err("query services"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect services"))?;
        debug!(count = services.len(), "services loaded");
        Ok(services)
    }

    // -- Invoices -----------------------------------------------------------

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    pub fn insert_invoice(&self, invoice: &Invoice) -> Result<()> {
        self.conn()?
            .execute(
                "INSERT INTO invoices (id, user_id, month, sales_amount, invoice_date,
                 description, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    invoice.id.to_string(),
                    invoice.user_id.to_string(),
                    invoice.month,
                    invoice.sales_amount,
                    invoice.invoice_date.format(ISO_DATE).to_string(),
                    invoice.description,
                    invoice.created_at.to_rfc3339(),
                ],
            )
            .map_err(db_err("insert invoice"))?;
        Ok(())
    }

    pub fn invoices_for_user(&self, owner: UserId) -> Result<Vec<Invoice>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {INVOICE_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))
            .map_err(db_err("prepare invoices"))?;
        let invoices = stmt
            .query_map(params![owner.to_string()], row_to_invoice)
            .map_err(db_err("query invoices"))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err("collect invoices"))?;
        debug!(count = invoices.len(), "invoices loaded");
        Ok(invoices)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    pub fn delete_invoice(&self, owner: UserId, id: InvoiceId) -> Result<()> {
        let rows = self
            .conn()?
            .execute(
                "DELETE FROM invoices WHERE id = ?1 AND user_id = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(db_err("delete invoice"))?;
        if rows == 0 {
            return Err(BizError::NotFound {
                collection: "invoices",
                id: id.to_string(),
            });
        }
        info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }

    // -- Demo data ----------------------------------------------------------

    /// Populate the featured listings shown on the browse page. Does nothing
    /// if any service already exists. Returns the number of rows added.
    #[instrument(skip(self))]
    pub fn seed_demo(&self) -> Result<usize> {
        if self.service_count()? > 0 {
            return Ok(0);
        }
        for demo in DEMO_LISTINGS {
            let owner = self.upsert_user(demo.email)?;
            self.update_profile(
                owner.id,
                &Profile {
                    display_name: Some(demo.display_name.into()),
                    company_name: Some(demo.company_name.into()),
                },
            )?;
            self.insert_service(&Service::from_draft(
                owner.id,
                NewService {
                    title: demo.title.into(),
                    description: demo.description.into(),
                    category: demo.category.into(),
                    price_range: Some(demo.price_range.into()),
                    location: Some(demo.location.into()),
                },
            ))?;
        }
        info!(count = DEMO_LISTINGS.len(), "demo listings seeded");
        Ok(DEMO_LISTINGS.len())
    }

    /// The services collection as seen by `owner`.
    pub fn services(&self, owner: UserId) -> SqliteServices {
        SqliteServices {
            store: self.clone(),
            owner,
        }
    }

    /// The invoices collection as seen by `owner`.
    pub fn invoices(&self, owner: UserId) -> SqliteInvoices {
        SqliteInvoices {
            store: self.clone(),
            owner,
        }
    }
}

struct DemoListing {
    email: &'static str,
    display_name: &'static str,
    company_name: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    price_range: &'static str,
    location: &'static str,
}

const DEMO_LISTINGS: &[DemoListing] = &[
    DemoListing {
        email: "hello@marketpro.example",
        display_name: "Marketing Expert",
        company_name: "MarketPro Solutions",
        title: "Digital Marketing Strategy",
        description: "Comprehensive digital marketing strategies to boost your online presence and drive conversions.",
        category: "Marketing",
        price_range: "$2,500",
        location: "New York, NY",
    },
    DemoListing {
        email: "team@techcraft.example",
        display_name: "Dev Team",
        company_name: "TechCraft Studios",
        title: "Web Development & Design",
        description: "Custom web applications and responsive designs that engage users and drive business growth.",
        category: "Development",
        price_range: "$5,000",
        location: "San Francisco, CA",
    },
    DemoListing {
        email: "advice@financewise.example",
        display_name: "Finance Advisor",
        company_name: "FinanceWise Inc",
        title: "Financial Consulting",
        description: "Expert financial advisory services to optimize your business finances and investment strategies.",
        category: "Finance",
        price_range: "$1,200",
        location: "Chicago, IL",
    },
];

// ---------------------------------------------------------------------------
// Collection adapters
// ---------------------------------------------------------------------------

/// `services` scoped to one owner.
#[derive(Debug, Clone)]
pub struct SqliteServices {
    store: SqliteStore,
    owner: UserId,
}

#[async_trait]
impl RemoteCollection<Service> for SqliteServices {
    async fn fetch_all(&self) -> Result<Vec<Service>> {
        self.store.services_for_user(self.owner)
    }

    async fn create(&self, draft: NewService) -> Result<Service> {
        let service = Service::from_draft(self.owner, draft);
        self.store.insert_service(&service)?;
        // Re-read so the owner join is populated.
        Ok(self.store.get_service(service.id)?.unwrap_or(service))
    }

    async fn delete(&self, id: ServiceId) -> Result<()> {
        self.store.delete_service(self.owner, id)
    }
}

/// `invoices` scoped to one owner.
#[derive(Debug, Clone)]
pub struct SqliteInvoices {
    store: SqliteStore,
    owner: UserId,
}

#[async_trait]
impl RemoteCollection<Invoice> for SqliteInvoices {
    async fn fetch_all(&self) -> Result<Vec<Invoice>> {
        self.store.invoices_for_user(self.owner)
    }

    async fn create(&self, draft: NewInvoice) -> Result<Invoice> {
        let invoice = Invoice::from_draft(self.owner, draft);
        self.store.insert_invoice(&invoice)?;
        Ok(invoice)
    }

    async fn delete(&self, id: InvoiceId) -> Result<()> {
        self.store.delete_invoice(self.owner, id)
    }
}

#[async_trait]
impl ServiceCatalog for SqliteStore {
    async fn browse(&self) -> Result<Vec<Service>> {
        self.active_services()
    }

    async fn service(&self, id: ServiceId) -> Result<Option<Service>> {
        self.get_service(id)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn conversion_err(
    index: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
}

fn uuid_at(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<uuid::Uuid> {
    let raw: String = row.get(index)?;
    uuid::Uuid::parse_str(&raw).map_err(|e| conversion_err(index, e))
}

fn timestamp_at(row: &rusqlite::Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(index, e))
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let display_name: Option<String> = row.get(2)?;
    let company_name: Option<String> = row.get(3)?;
    let profile = (display_name.is_some() || company_name.is_some()).then_some(Profile {
        display_name,
        company_name,
    });
    Ok(User {
        id: UserId(uuid_at(row, 0)?),
        email: row.get(1)?,
        profile,
    })
}

/// Columns follow `SERVICE_COLUMNS`.
fn row_to_service(row: &rusqlite::Row<'_>) -> rusqlite::Result<Service> {
    let owner_id: Option<String> = row.get(10)?;
    let owner = match owner_id {
        Some(_) => Some(ServiceOwner {
            display_name: row.get(11)?,
            company_name: row.get(12)?,
        }),
        None => None,
    };
    Ok(Service {
        id: ServiceId(uuid_at(row, 0)?),
        user_id: UserId(uuid_at(row, 1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        price_range: row.get(5)?,
        location: row.get(6)?,
        is_active: row.get(7)?,
        created_at: timestamp_at(row, 8)?,
        updated_at: timestamp_at(row, 9)?,
        owner,
    })
}

fn row_to_invoice(row: &rusqlite::Row<'_>) -> rusqlite::Result<Invoice> {
    let date_raw: String = row.get(4)?;
    let invoice_date =
        NaiveDate::parse_from_str(&date_raw, ISO_DATE).map_err(|e| conversion_err(4, e))?;
    Ok(Invoice {
        id: InvoiceId(uuid_at(row, 0)?),
        user_id: UserId(uuid_at(row, 1)?),
        month: row.get(2)?,
        sales_amount: row.get(3)?,
        invoice_date,
        description: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_draft(title: &str) -> NewService {
        NewService {
            title: title.into(),
            description: "Hands-on help".into(),
            category: "Consulting".into(),
            price_range: Some("$50/hr".into()),
            location: None,
        }
    }

    fn invoice_draft(month: u8) -> NewInvoice {
        NewInvoice {
            month,
            sales_amount: 15_000,
            invoice_date: NaiveDate::from_ymd_opt(2024, month as u32, 1).unwrap(),
            description: None,
        }
    }

    #[test]
    fn upsert_user_is_stable_per_email() {
        let store = SqliteStore::open_in_memory().expect("open");
        let first = store.upsert_user("ada@example.com").unwrap();
        let again = store.upsert_user("ada@example.com").unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.profile, None);
    }

    #[test]
    fn profile_update_and_missing_user() {
        let store = SqliteStore::open_in_memory().expect("open");
        let user = store.upsert_user("ada@example.com").unwrap();
        let profile = Profile {
            display_name: Some("Ada".into()),
            company_name: None,
        };
        let updated = store.update_profile(user.id, &profile).unwrap();
        assert_eq!(updated.profile, Some(profile.clone()));

        let err = store.update_profile(UserId::new(), &profile).unwrap_err();
        assert!(matches!(err, BizError::NotFound { collection: "users", .. }));
    }

    #[test]
    fn session_round_trips_and_clears() {
        let store = SqliteStore::open_in_memory().expect("open");
        let user = store.upsert_user("ada@example.com").unwrap();
        assert_eq!(store.current_user().unwrap(), None);

        store.set_current_user(Some(user.id)).unwrap();
        store.set_current_user(Some(user.id)).unwrap();
        assert_eq!(store.current_user().unwrap().map(|u| u.id), Some(user.id));

        store.set_current_user(None).unwrap();
        assert_eq!(store.current_user().unwrap(), None);
    }

    #[tokio::test]
    async fn services_are_scoped_to_owner() {
        let store = SqliteStore::open_in_memory().expect("open");
        let ada = store.upsert_user("ada@example.com").unwrap();
        let bob = store.upsert_user("bob@example.com").unwrap();

        let ada_services = store.services(ada.id);
        let bob_services = store.services(bob.id);
        let mine = ada_services.create(service_draft("Audit")).await.unwrap();
        bob_services.create(service_draft("Payroll")).await.unwrap();

        let listed = ada_services.fetch_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(listed[0].owner.is_some());

        let err = bob_services.delete(mine.id).await.unwrap_err();
        assert!(matches!(err, BizError::NotFound { collection: "services", .. }));
        assert_eq!(ada_services.fetch_all().await.unwrap().len(), 1);

        ada_services.delete(mine.id).await.unwrap();
        assert!(ada_services.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoices_newest_first_and_scoped() {
        let store = SqliteStore::open_in_memory().expect("open");
        let ada = store.upsert_user("ada@example.com").unwrap();
        let bob = store.upsert_user("bob@example.com").unwrap();
        let invoices = store.invoices(ada.id);

        invoices.create(invoice_draft(1)).await.unwrap();
        let newest = invoices.create(invoice_draft(2)).await.unwrap();
        store.invoices(bob.id).create(invoice_draft(3)).await.unwrap();

        let listed = invoices.fetch_all().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[0].invoice_date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(listed[0].description, None);

        let err = store.invoices(bob.id).delete(newest.id).await.unwrap_err();
        assert!(matches!(err, BizError::NotFound { .. }));
    }

    #[tokio::test]
    async fn seed_is_idempotent_and_browsable() {
        let store = SqliteStore::open_in_memory().expect("open");
        assert_eq!(store.seed_demo().unwrap(), 3);
        assert_eq!(store.seed_demo().unwrap(), 0);

        let listed = store.browse().await.unwrap();
        assert_eq!(listed.len(), 3);
        let companies: Vec<_> = listed
            .iter()
            .filter_map(|s| s.owner.as_ref()?.company_name.clone())
            .collect();
        assert!(companies.contains(&"TechCraft Studios".to_string()));

        let first = store.service(listed[0].id).await.unwrap();
        assert_eq!(first.map(|s| s.title), Some(listed[0].title.clone()));
        assert_eq!(store.service(ServiceId::new()).await.unwrap(), None);
    }

    #[test]
    fn on_disk_database_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bizconnect.db");
        let user_id = {
            let store = SqliteStore::open(&path).expect("open");
            let user = store.upsert_user("ada@example.com").unwrap();
            store.set_current_user(Some(user.id)).unwrap();
            user.id
        };

        let reopened = SqliteStore::open(&path).expect("reopen");
        assert_eq!(reopened.current_user().unwrap().map(|u| u.id), Some(user_id));
    }
}
