//! Item lifecycle controller.
//!
//! # Invariants
//! - Every stored item passed validation; updates re-validate the merged record.
//! - Memory and the stored snapshot agree after every call: a failed write
//!   undoes the in-memory change before the error is returned.
//! - Confirmation requests are raised only after a successful write and their
//!   outcome never affects the collection.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    Draft, Item, ItemFields, ItemId, Transaction, TransactionFields, TransactionId,
};
use crate::notify::{ConfirmationRequest, Notifier};
use crate::seed;
use crate::store::{
    ITEMS_KEY, KeyValueStore, StoreError, TRANSACTIONS_KEY, load_items, load_transactions,
    save_items, save_transactions,
};
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No record with id {0}")]
    NotFound(Uuid),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// The session's collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    items: Vec<Item>,
    transactions: Vec<Transaction>,
}

impl AppState {
    pub fn new(items: Vec<Item>, transactions: Vec<Transaction>) -> Self {
        Self {
            items,
            transactions,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }
}

/// Owns the session state and its only path to durability.
pub struct Planner<S: KeyValueStore> {
    store: S,
    state: AppState,
    notifier: Box<dyn Notifier>,
}

impl<S: KeyValueStore> Planner<S> {
    /// Hydrates both collections from `store`; absent keys load as empty.
    pub fn load(store: S, notifier: Box<dyn Notifier>) -> Result<Self, PlannerError> {
        let state = AppState::new(load_items(&store)?, load_transactions(&store)?);
        info!(
            items = state.items.len(),
            transactions = state.transactions.len(),
            "planner loaded"
        );
        Ok(Self {
            store,
            state,
            notifier,
        })
    }

    /// Like [`Planner::load`], but a store that has never been written is
    /// filled with the sample items and transactions first.
    pub fn load_or_seed(
        mut store: S,
        notifier: Box<dyn Notifier>,
        now: DateTime<Utc>,
    ) -> Result<Self, PlannerError> {
        if store.get(ITEMS_KEY)?.is_none() {
            save_items(&mut store, &seed::sample_items(now))?;
            info!("seeded sample items");
        }
        if store.get(TRANSACTIONS_KEY)?.is_none() {
            save_transactions(&mut store, &seed::sample_transactions(now))?;
            info!("seeded sample transactions");
        }
        Self::load(store, notifier)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn items(&self) -> &[Item] {
        &self.state.items
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and appends a new incomplete item.
    pub fn create(&mut self, fields: ItemFields) -> Result<Item, PlannerError> {
        let item = Item::new(fields)?;
        self.state.items.push(item.clone());
        self.persist_items(|items| {
            items.pop();
        })?;

        info!(item = %item.id(), title = item.title(), "item created");
        self.request_confirmation(&item);
        Ok(item)
    }

    /// Replaces an item's fields, keeping its id and completion flag.
    pub fn update(&mut self, id: ItemId, fields: ItemFields) -> Result<Item, PlannerError> {
        let index = self.item_index(id)?;
        let completed = self.state.items[index].is_completed();
        let updated = Item::with_id(id, fields, completed)?;

        let previous = std::mem::replace(&mut self.state.items[index], updated.clone());
        self.persist_items(move |items| items[index] = previous)?;

        info!(item = %id, "item updated");
        self.request_confirmation(&updated);
        Ok(updated)
    }

    /// Creates or updates according to the draft's mode.
    pub fn save_draft(&mut self, draft: Draft) -> Result<Item, PlannerError> {
        match draft {
            Draft::New(draft) => self.create(draft.into_fields()?),
            Draft::Editing(id, draft) => {
                // Report a stale id before any field errors.
                self.item_index(id)?;
                self.update(id, draft.into_fields()?)
            }
        }
    }

    /// Sets the completion flag. Setting the current value again is not an error.
    pub fn toggle_complete(&mut self, id: ItemId, completed: bool) -> Result<Item, PlannerError> {
        let index = self.item_index(id)?;
        let was = self.state.items[index].is_completed();
        self.state.items[index].set_completed(completed);
        self.persist_items(move |items| items[index].set_completed(was))?;

        info!(item = %id, completed, "item completion set");
        Ok(self.state.items[index].clone())
    }

    /// Removes an item for good. Unknown ids are `NotFound`, including a
    /// second delete of the same id.
    pub fn delete(&mut self, id: ItemId) -> Result<Item, PlannerError> {
        let index = self.item_index(id)?;
        let removed = self.state.items.remove(index);
        let restore = removed.clone();
        self.persist_items(move |items| items.insert(index, restore))?;

        info!(item = %id, "item deleted");
        Ok(removed)
    }

    /// Records a ledger entry dated `now`; newest entries come first.
    pub fn add_transaction(
        &mut self,
        fields: TransactionFields,
        now: DateTime<Utc>,
    ) -> Result<Transaction, PlannerError> {
        let tx = Transaction::new(fields, now)?;
        self.state.transactions.insert(0, tx.clone());
        self.persist_transactions(|txs| {
            txs.remove(0);
        })?;

        info!(transaction = %tx.id(), kind = %tx.kind(), amount = %tx.amount(), "transaction added");
        Ok(tx)
    }

    pub fn delete_transaction(&mut self, id: TransactionId) -> Result<Transaction, PlannerError> {
        let index = self
            .state
            .transactions
            .iter()
            .position(|tx| tx.id() == id)
            .ok_or(PlannerError::NotFound(id))?;
        let removed = self.state.transactions.remove(index);
        let restore = removed.clone();
        self.persist_transactions(move |txs| txs.insert(index, restore))?;

        info!(transaction = %id, "transaction deleted");
        Ok(removed)
    }

    fn item_index(&self, id: ItemId) -> Result<usize, PlannerError> {
        self.state
            .items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(PlannerError::NotFound(id))
    }

    fn persist_items(
        &mut self,
        rollback: impl FnOnce(&mut Vec<Item>),
    ) -> Result<(), PlannerError> {
        if let Err(err) = save_items(&mut self.store, &self.state.items) {
            rollback(&mut self.state.items);
            warn!(error = %err, "item write failed; change reverted");
            return Err(err.into());
        }
        Ok(())
    }

    fn persist_transactions(
        &mut self,
        rollback: impl FnOnce(&mut Vec<Transaction>),
    ) -> Result<(), PlannerError> {
        if let Err(err) = save_transactions(&mut self.store, &self.state.transactions) {
            rollback(&mut self.state.transactions);
            warn!(error = %err, "transaction write failed; change reverted");
            return Err(err.into());
        }
        Ok(())
    }

    fn request_confirmation(&self, item: &Item) {
        if item.wants_confirmation() {
            self.notifier.notify(ConfirmationRequest { item: item.clone() });
        }
    }
}
