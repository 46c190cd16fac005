//! redb-based document store for the shop engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `tickets` | `ticket_id` | `Ticket` | Repair queue |
//! | `customers` | `customer_id` | `Customer` | Identity store |
//! | `customers_by_phone` | `(phone, customer_id)` | `()` | Dedup lookup |
//! | `storage_slots` | `slot_id` | `StorageSlot` | Slot registry + inline history |
//! | `storage_requests` | `request_id` | `StorageRequest` | Public intake inbox |
//! | `mechanics` | `mechanic_id` | `MechanicDefinition` | Catalog |
//! | `services` | `service_id` | `ServiceDefinition` | Catalog |
//! | `settings` | `"config"` | `CounterDoc` | Ticket counter document |
//! | `processed_commands` | `command_id` | `()` | Idempotency check |
//! | `sequence_counter` | `"log_seq"` | `u64` | Global storage-log sequence |
//!
//! Values are JSON documents. One write transaction is one atomic unit;
//! redb serialises writers and aborts a transaction dropped without
//! commit.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{
    Database, Key, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    Value, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{
    Customer, DEFAULT_MECHANICS, DEFAULT_SERVICES, MechanicDefinition, RequestStatus,
    ServiceDefinition, StorageRequest, StorageSlot, Ticket,
};
use thiserror::Error;

/// JSON document table keyed by document id
pub type DocTable = TableDefinition<'static, &'static str, &'static [u8]>;

pub const TICKETS_TABLE: DocTable = TableDefinition::new("tickets");
pub const CUSTOMERS_TABLE: DocTable = TableDefinition::new("customers");
pub const SLOTS_TABLE: DocTable = TableDefinition::new("storage_slots");
pub const REQUESTS_TABLE: DocTable = TableDefinition::new("storage_requests");
pub const MECHANICS_TABLE: DocTable = TableDefinition::new("mechanics");
pub const SERVICES_TABLE: DocTable = TableDefinition::new("services");
const SETTINGS_TABLE: DocTable = TableDefinition::new("settings");

/// Secondary index: (phone, customer_id) -> ()
const CUSTOMER_PHONE_INDEX: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("customers_by_phone");

const PROCESSED_COMMANDS_TABLE: TableDefinition<&str, ()> =
    TableDefinition::new("processed_commands");

const SEQUENCE_TABLE: TableDefinition<&str, u64> = TableDefinition::new("sequence_counter");

const CONFIG_KEY: &str = "config";
const LOG_SEQUENCE_KEY: &str = "log_seq";

/// Ticket counter document
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CounterDoc {
    pub ticket_counter: u64,
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Shop document store backed by redb
#[derive(Clone)]
pub struct ShopStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for ShopStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopStorage").finish_non_exhaustive()
    }
}

impl ShopStorage {
    /// Open or create the database at the given path
    ///
    /// Commits are durable once `commit()` returns (redb copy-on-write with
    /// atomic root swap), which matters on a shop PC that gets switched off
    /// at closing time.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (tests, demos)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            for def in [
                TICKETS_TABLE,
                CUSTOMERS_TABLE,
                SLOTS_TABLE,
                REQUESTS_TABLE,
                MECHANICS_TABLE,
                SERVICES_TABLE,
                SETTINGS_TABLE,
            ] {
                let _ = write_txn.open_table(def)?;
            }
            let _ = write_txn.open_table(CUSTOMER_PHONE_INDEX)?;
            let _ = write_txn.open_table(PROCESSED_COMMANDS_TABLE)?;

            let mut seq_table = write_txn.open_table(SEQUENCE_TABLE)?;
            if seq_table.get(LOG_SEQUENCE_KEY)?.is_none() {
                seq_table.insert(LOG_SEQUENCE_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (one atomic unit)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Generic document access ==========

    /// Read a document inside a write transaction
    pub fn get_doc<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        def: DocTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let table = txn.open_table(def)?;
        let value = table.get(key)?;
        match value {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Write a document inside a write transaction
    pub fn put_doc<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        def: DocTable,
        key: &str,
        doc: &T,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(def)?;
        let value = serde_json::to_vec(doc)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Remove a document. Returns whether it existed.
    pub fn remove_doc(&self, txn: &WriteTransaction, def: DocTable, key: &str) -> StorageResult<bool> {
        let mut table = txn.open_table(def)?;
        let removed = table.remove(key)?.is_some();
        Ok(removed)
    }

    /// Read every document of a table inside a write transaction
    pub fn all_docs_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        def: DocTable,
    ) -> StorageResult<Vec<T>> {
        let table = txn.open_table(def)?;
        let mut docs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            docs.push(serde_json::from_slice(value.value())?);
        }
        Ok(docs)
    }

    /// Read one document from a consistent read snapshot
    pub fn read_doc<T: DeserializeOwned>(&self, def: DocTable, key: &str) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        let value = table.get(key)?;
        match value {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Read every document of a table from a consistent read snapshot
    pub fn read_all<T: DeserializeOwned>(&self, def: DocTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(def)?;
        let mut docs = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            docs.push(serde_json::from_slice(value.value())?);
        }
        Ok(docs)
    }

    /// Drop every row of a table (bulk wipe, not a domain operation)
    pub fn clear_table<K: Key + 'static, V: Value + 'static>(
        &self,
        txn: &WriteTransaction,
        def: TableDefinition<'static, K, V>,
    ) -> StorageResult<()> {
        txn.delete_table(def)?;
        let _ = txn.open_table(def)?;
        Ok(())
    }

    // ========== Ticket counter ==========

    /// Read the ticket counter document (missing document counts as 0)
    pub fn read_counter(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let doc: Option<CounterDoc> = self.get_doc(txn, SETTINGS_TABLE, CONFIG_KEY)?;
        Ok(doc.unwrap_or_default().ticket_counter)
    }

    pub fn write_counter(&self, txn: &WriteTransaction, value: u64) -> StorageResult<()> {
        self.put_doc(
            txn,
            SETTINGS_TABLE,
            CONFIG_KEY,
            &CounterDoc {
                ticket_counter: value,
            },
        )
    }

    /// Current counter value (read-only)
    pub fn current_counter(&self) -> StorageResult<u64> {
        let doc: Option<CounterDoc> = self.read_doc(SETTINGS_TABLE, CONFIG_KEY)?;
        Ok(doc.unwrap_or_default().ticket_counter)
    }

    /// Overwrite the counter in its own transaction
    pub fn set_counter(&self, value: u64) -> StorageResult<()> {
        let txn = self.begin_write()?;
        self.write_counter(&txn, value)?;
        txn.commit()?;
        Ok(())
    }

    /// Replace the counter document with bytes that do not parse
    #[cfg(test)]
    pub fn corrupt_counter(&self) -> StorageResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(SETTINGS_TABLE)?;
            table.insert(CONFIG_KEY, b"not json".as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    // ========== Global log sequence ==========

    /// Increment and return the storage-log sequence
    pub fn next_log_sequence(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(SEQUENCE_TABLE)?;
        let current = table
            .get(LOG_SEQUENCE_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(LOG_SEQUENCE_KEY, next)?;
        Ok(next)
    }

    // ========== Command idempotency ==========

    /// Check if a command has been processed
    pub fn is_command_processed(&self, command_id: &str) -> StorageResult<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    /// Check if a command has been processed (within transaction)
    pub fn is_command_processed_txn(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        Ok(table.get(command_id)?.is_some())
    }

    pub fn mark_command_processed(
        &self,
        txn: &WriteTransaction,
        command_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_COMMANDS_TABLE)?;
        table.insert(command_id, ())?;
        Ok(())
    }

    // ========== Customers ==========

    /// All customers sharing a phone number
    pub fn find_customers_by_phone(
        &self,
        txn: &WriteTransaction,
        phone: &str,
    ) -> StorageResult<Vec<Customer>> {
        let ids: Vec<String> = {
            let index = txn.open_table(CUSTOMER_PHONE_INDEX)?;
            let mut ids = Vec::new();
            for result in index.range((phone, "")..)? {
                let (key, _) = result?;
                let (key_phone, id) = key.value();
                if key_phone != phone {
                    break;
                }
                ids.push(id.to_string());
            }
            ids
        };

        let mut customers = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(customer) = self.get_doc::<Customer>(txn, CUSTOMERS_TABLE, &id)? {
                customers.push(customer);
            }
        }
        Ok(customers)
    }

    /// Upsert a customer and keep the phone index in step
    pub fn put_customer(&self, txn: &WriteTransaction, customer: &Customer) -> StorageResult<()> {
        let previous: Option<Customer> = self.get_doc(txn, CUSTOMERS_TABLE, &customer.id)?;
        {
            let mut index = txn.open_table(CUSTOMER_PHONE_INDEX)?;
            if let Some(prev) = &previous
                && prev.phone != customer.phone
            {
                index.remove((prev.phone.as_str(), prev.id.as_str()))?;
            }
            index.insert((customer.phone.as_str(), customer.id.as_str()), ())?;
        }
        self.put_doc(txn, CUSTOMERS_TABLE, &customer.id, customer)
    }

    /// Remove a customer and its index entry. Returns whether it existed.
    pub fn remove_customer(&self, txn: &WriteTransaction, customer_id: &str) -> StorageResult<bool> {
        let Some(existing) = self.get_doc::<Customer>(txn, CUSTOMERS_TABLE, customer_id)? else {
            return Ok(false);
        };
        {
            let mut index = txn.open_table(CUSTOMER_PHONE_INDEX)?;
            index.remove((existing.phone.as_str(), existing.id.as_str()))?;
        }
        self.remove_doc(txn, CUSTOMERS_TABLE, customer_id)
    }

    /// Drop every customer and the phone index
    pub fn clear_customers(&self, txn: &WriteTransaction) -> StorageResult<()> {
        self.clear_table(txn, CUSTOMERS_TABLE)?;
        self.clear_table(txn, CUSTOMER_PHONE_INDEX)
    }

    // ========== Collection reads (snapshot order) ==========

    /// Tickets, newest arrival first
    ///
    /// Same-instant arrivals fall back to the display number, highest first.
    pub fn tickets(&self) -> StorageResult<Vec<Ticket>> {
        fn number(t: &Ticket) -> u64 {
            t.ticket_number.trim().parse().unwrap_or(0)
        }
        let mut tickets: Vec<Ticket> = self.read_all(TICKETS_TABLE)?;
        tickets.sort_by(|a, b| {
            b.timestamps
                .arrival
                .cmp(&a.timestamps.arrival)
                .then_with(|| number(b).cmp(&number(a)))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(tickets)
    }

    /// Most recently arrived ticket
    pub fn latest_ticket(&self) -> StorageResult<Option<Ticket>> {
        Ok(self.tickets()?.into_iter().next())
    }

    /// Customers ordered by name
    pub fn customers(&self) -> StorageResult<Vec<Customer>> {
        let mut customers: Vec<Customer> = self.read_all(CUSTOMERS_TABLE)?;
        customers.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(customers)
    }

    /// Slots ordered by id
    pub fn slots(&self) -> StorageResult<Vec<StorageSlot>> {
        let mut slots: Vec<StorageSlot> = self.read_all(SLOTS_TABLE)?;
        slots.sort_by(|a, b| natural_cmp(&a.id, &b.id));
        Ok(slots)
    }

    /// Pending requests, oldest first
    pub fn pending_requests(&self) -> StorageResult<Vec<StorageRequest>> {
        let mut requests: Vec<StorageRequest> = self.read_all(REQUESTS_TABLE)?;
        requests.retain(|r| r.status == RequestStatus::Pending);
        requests.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(requests)
    }

    pub fn mechanics(&self) -> StorageResult<Vec<MechanicDefinition>> {
        let mut mechanics: Vec<MechanicDefinition> = self.read_all(MECHANICS_TABLE)?;
        mechanics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(mechanics)
    }

    pub fn services(&self) -> StorageResult<Vec<ServiceDefinition>> {
        let mut services: Vec<ServiceDefinition> = self.read_all(SERVICES_TABLE)?;
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    // ========== Seeding ==========

    /// Seed `{prefix}-{NN}` vacant slots into an empty registry
    ///
    /// Returns the number of slots created (0 when already seeded).
    pub fn seed_slots_txn(
        &self,
        txn: &WriteTransaction,
        prefix: &str,
        count: u32,
        now: DateTime<Utc>,
    ) -> StorageResult<u32> {
        let existing = txn.open_table(SLOTS_TABLE)?.len()?;
        if existing > 0 {
            return Ok(0);
        }
        let width = count.to_string().len().max(2);
        for i in 1..=count {
            let id = format!("{}-{:0width$}", prefix, i, width = width);
            self.put_doc(txn, SLOTS_TABLE, &id, &StorageSlot::vacant(id.clone(), now))?;
        }
        Ok(count)
    }

    /// Seed slots in their own transaction
    pub fn seed_slots(&self, prefix: &str, count: u32, now: DateTime<Utc>) -> StorageResult<u32> {
        let txn = self.begin_write()?;
        let created = self.seed_slots_txn(&txn, prefix, count, now)?;
        txn.commit()?;
        Ok(created)
    }

    /// Seed default mechanics and services into empty catalogs
    pub fn seed_catalog(&self) -> StorageResult<()> {
        let txn = self.begin_write()?;
        if txn.open_table(MECHANICS_TABLE)?.len()? == 0 {
            for name in DEFAULT_MECHANICS {
                let mechanic = MechanicDefinition {
                    id: shared::util::slugify(name),
                    name: (*name).to_string(),
                    branches: Vec::new(),
                };
                self.put_doc(&txn, MECHANICS_TABLE, &mechanic.id, &mechanic)?;
            }
            tracing::info!(count = DEFAULT_MECHANICS.len(), "Seeded mechanics");
        }
        if txn.open_table(SERVICES_TABLE)?.len()? == 0 {
            for (i, name) in DEFAULT_SERVICES.iter().enumerate() {
                let service = ServiceDefinition {
                    id: format!("SVC-{}", i + 1),
                    name: (*name).to_string(),
                    branches: Vec::new(),
                };
                self.put_doc(&txn, SERVICES_TABLE, &service.id, &service)?;
            }
            tracing::info!(count = DEFAULT_SERVICES.len(), "Seeded services");
        }
        txn.commit()?;
        Ok(())
    }
}

/// Compare ids so that `A-2` sorts before `A-10`
pub fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    fn split(s: &str) -> (&str, Option<u64>) {
        let digits = s.len() - s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (head, tail) = s.split_at(s.len() - digits);
        (head, tail.parse().ok())
    }
    let (ha, na) = split(a);
    let (hb, nb) = split(b);
    ha.cmp(hb).then(na.cmp(&nb)).then_with(|| a.cmp(b))
}
