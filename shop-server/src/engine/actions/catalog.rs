//! Mechanic and service catalog handlers
//!
//! Both catalogs share one shape (id, name, branch list), so one set of
//! generic actions serves both through [`CatalogEntry`].

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{MechanicDefinition, ServiceDefinition};
use shared::snapshot::Collection;
use shared::util::{prefixed_id, slugify};

use crate::engine::storage::{DocTable, MECHANICS_TABLE, SERVICES_TABLE};
use crate::engine::traits::{
    ActionError, ActionOutcome, ActionResult, CommandContext, CommandHandler, CommandMetadata,
    require_text,
};

/// A catalog document type
pub trait CatalogEntry: Serialize + DeserializeOwned {
    const TABLE: DocTable;
    const COLLECTION: Collection;
    const LABEL: &'static str;

    fn mint_id(name: &str) -> String;
    fn build(id: String, name: String, branches: Vec<String>) -> Self;
    fn id(&self) -> &str;
    fn update(&mut self, name: String, branches: Vec<String>);
}

impl CatalogEntry for MechanicDefinition {
    const TABLE: DocTable = MECHANICS_TABLE;
    const COLLECTION: Collection = Collection::Mechanics;
    const LABEL: &'static str = "mechanic";

    fn mint_id(name: &str) -> String {
        slugify(name)
    }

    fn build(id: String, name: String, branches: Vec<String>) -> Self {
        Self { id, name, branches }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn update(&mut self, name: String, branches: Vec<String>) {
        self.name = name;
        self.branches = branches;
    }
}

impl CatalogEntry for ServiceDefinition {
    const TABLE: DocTable = SERVICES_TABLE;
    const COLLECTION: Collection = Collection::Services;
    const LABEL: &'static str = "service";

    fn mint_id(_name: &str) -> String {
        prefixed_id("SVC")
    }

    fn build(id: String, name: String, branches: Vec<String>) -> Self {
        Self { id, name, branches }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn update(&mut self, name: String, branches: Vec<String>) {
        self.name = name;
        self.branches = branches;
    }
}

/// Trim, drop blanks and duplicates, keep order
fn clean_branches(branches: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(branches.len());
    for b in branches {
        let b = b.trim();
        if !b.is_empty() && !out.iter().any(|o| o == b) {
            out.push(b.to_string());
        }
    }
    out
}

/// Add a catalog entry
#[derive(Debug, Clone)]
pub struct AddCatalogEntryAction<E> {
    pub name: String,
    pub branches: Vec<String>,
    _entry: PhantomData<E>,
}

impl<E> AddCatalogEntryAction<E> {
    pub fn new(name: impl Into<String>, branches: Vec<String>) -> Self {
        Self {
            name: name.into(),
            branches,
            _entry: PhantomData,
        }
    }
}

impl<E: CatalogEntry> CommandHandler for AddCatalogEntryAction<E> {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let name = require_text("name", &self.name)?;
        let id = E::mint_id(&name);
        if ctx.storage().get_doc::<E>(ctx.txn(), E::TABLE, &id)?.is_some() {
            return Err(ActionError::Validation(format!(
                "{} {} already exists",
                E::LABEL,
                name
            )));
        }

        let entry = E::build(id.clone(), name, clean_branches(&self.branches));
        ctx.storage().put_doc(ctx.txn(), E::TABLE, &id, &entry)?;
        ctx.touch(E::COLLECTION);
        Ok(ActionOutcome::created(id))
    }
}

/// Rename an entry or change its branches
#[derive(Debug, Clone)]
pub struct UpdateCatalogEntryAction<E> {
    pub id: String,
    pub name: String,
    pub branches: Vec<String>,
    _entry: PhantomData<E>,
}

impl<E> UpdateCatalogEntryAction<E> {
    pub fn new(id: impl Into<String>, name: impl Into<String>, branches: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            branches,
            _entry: PhantomData,
        }
    }
}

impl<E: CatalogEntry> CommandHandler for UpdateCatalogEntryAction<E> {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        let mut entry: E = ctx
            .storage()
            .get_doc(ctx.txn(), E::TABLE, &self.id)?
            .ok_or_else(|| ActionError::CatalogEntryNotFound(self.id.clone()))?;
        entry.update(
            require_text("name", &self.name)?,
            clean_branches(&self.branches),
        );
        ctx.storage().put_doc(ctx.txn(), E::TABLE, entry.id(), &entry)?;
        ctx.touch(E::COLLECTION);
        Ok(ActionOutcome::default())
    }
}

/// Remove an entry. Tickets keep the mechanic/service names they recorded.
#[derive(Debug, Clone)]
pub struct RemoveCatalogEntryAction<E> {
    pub id: String,
    _entry: PhantomData<E>,
}

impl<E> RemoveCatalogEntryAction<E> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            _entry: PhantomData,
        }
    }
}

impl<E: CatalogEntry> CommandHandler for RemoveCatalogEntryAction<E> {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> ActionResult<ActionOutcome> {
        if !ctx.storage().remove_doc(ctx.txn(), E::TABLE, &self.id)? {
            return Err(ActionError::CatalogEntryNotFound(self.id.clone()));
        }
        ctx.touch(E::COLLECTION);
        Ok(ActionOutcome::default())
    }
}
