//! Lightweight to-do feed shown beside the tomato sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::storage::{Gateway, KvStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done: bool,
}

impl TodoItem {
    pub fn new(title: impl Into<String>, due: Option<DateTime<Utc>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            due,
            done: false,
        }
    }

    /// Not done and due before `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.due.is_some_and(|due| due < now)
    }
}

/// Persisted to-do list. Every mutation writes the whole list back.
#[derive(Debug, Clone, Default)]
pub struct TodoFeed {
    items: Vec<TodoItem>,
}

impl TodoFeed {
    pub fn load<S: KvStore>(gateway: &Gateway<S>) -> Self {
        Self {
            items: gateway.todo_items(),
        }
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Open items ordered by due date, undated ones last.
    pub fn upcoming(&self) -> Vec<&TodoItem> {
        let mut open: Vec<&TodoItem> = self.items.iter().filter(|i| !i.done).collect();
        open.sort_by_key(|i| (i.due.is_none(), i.due));
        open
    }

    /// # Errors
    /// Returns `InvalidArgument` for a blank title.
    pub fn add<S: KvStore>(
        &mut self,
        title: &str,
        due: Option<DateTime<Utc>>,
        gateway: &mut Gateway<S>,
    ) -> Result<&TodoItem> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CoreError::invalid("to-do title is empty"));
        }
        self.items.push(TodoItem::new(title, due));
        gateway.save_todo_items(&self.items);
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove an item. Returns the removed item.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown id.
    pub fn remove<S: KvStore>(&mut self, id: Uuid, gateway: &mut Gateway<S>) -> Result<TodoItem> {
        let pos = self.position(id)?;
        let removed = self.items.remove(pos);
        gateway.save_todo_items(&self.items);
        Ok(removed)
    }

    /// Flip the done flag. Returns the new value.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown id.
    pub fn toggle<S: KvStore>(&mut self, id: Uuid, gateway: &mut Gateway<S>) -> Result<bool> {
        let pos = self.position(id)?;
        let item = &mut self.items[pos];
        item.done = !item.done;
        let done = item.done;
        gateway.save_todo_items(&self.items);
        Ok(done)
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| CoreError::invalid(format!("no to-do item {id}")))
    }
}
