use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{ApiError, Result};
use crate::models::{id_equals, Expense};
use crate::store::ExpenseStore;

/// Expense operations on top of an [`ExpenseStore`].
///
/// Each mutation is a full load, an in-memory change and a full save. The
/// cycles are serialized through `write_lock`, so two requests handled by
/// this service cannot overwrite each other's changes. Anything else writing
/// the same file (a second process, a text editor) is not covered: such a
/// writer can still lose updates, and two server processes on one file also
/// share the store's fixed staging file, so their saves can clobber each
/// other mid-write.
pub struct ExpenseService {
    store: Arc<dyn ExpenseStore>,
    write_lock: Mutex<()>,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn ExpenseStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// All expenses, newest first.
    pub async fn list(&self) -> Vec<Expense> {
        self.store.load().await.expenses
    }

    pub async fn create(&self, fields: Map<String, Value>) -> Result<Expense> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;

        let expense = Expense::stamped(fields, Utc::now());
        document.expenses.insert(0, expense.clone());
        self.store.save(&document).await?;

        tracing::debug!(id = ?expense.id(), total = document.expenses.len(), "Created expense");
        Ok(expense)
    }

    /// Merges `fields` into the expense with the given id.
    ///
    /// `id` may appear in `fields` only if it equals the current id.
    pub async fn update(&self, id: Option<i64>, fields: Map<String, Value>) -> Result<Expense> {
        let id = id.ok_or(ApiError::ExpenseNotFound)?;

        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;

        let expense = document
            .expenses
            .iter_mut()
            .find(|expense| expense.has_id(id))
            .ok_or(ApiError::ExpenseNotFound)?;

        if let Some(new_id) = fields.get("id") {
            if !id_equals(new_id, id) {
                return Err(ApiError::BadRequest(format!(
                    "Expense id cannot be changed (path id {id}, body id {new_id})"
                )));
            }
        }

        expense.merge(fields);
        let updated = expense.clone();
        self.store.save(&document).await?;

        tracing::debug!(id, "Updated expense");
        Ok(updated)
    }

    /// Removes every expense with the given id. Succeeds whether or not one
    /// matched; the document is rewritten either way.
    pub async fn delete(&self, id: Option<i64>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.store.load().await;

        let before = document.expenses.len();
        if let Some(id) = id {
            document.expenses.retain(|expense| !expense.has_id(id));
        }
        self.store.save(&document).await?;

        tracing::debug!(?id, removed = before - document.expenses.len(), "Deleted expense");
        Ok(())
    }
}
