//! Pomodoro sets: one habit or goal, broken into numbered tomato slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::item::{TomatoItem, TomatoState};
use crate::error::{CoreError, Result};

/// Number of tomatoes in a newly created set.
pub const DEFAULT_TOTAL: u32 = 50;

/// Title used when a set is created with an empty one.
pub const PLACEHOLDER_TITLE: &str = "Untitled";

/// An ordered, fixed-length collection of tomato items.
///
/// `items[i].id == i + 1` always holds. `current_index` is the id of the
/// next item eligible for work, or `items.len() + 1` once every item is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSet {
    id: Uuid,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<DateTime<Utc>>,
    pub(crate) items: Vec<TomatoItem>,
    pub(crate) current_index: u32,
}

impl PomodoroSet {
    /// Create a set of `total` tomatoes with item 1 available.
    ///
    /// A `total` below 1 is clamped to 1. An empty title falls back to
    /// [`PLACEHOLDER_TITLE`].
    pub fn create(
        title: &str,
        target_note: Option<String>,
        target_date: Option<DateTime<Utc>>,
        total: u32,
    ) -> Self {
        let total = total.max(1);
        let items = (1..=total)
            .map(|id| {
                let state = if id == 1 {
                    TomatoState::Available
                } else {
                    TomatoState::Locked
                };
                TomatoItem::new(id, state)
            })
            .collect();

        let title = title.trim();
        Self {
            id: Uuid::new_v4(),
            title: if title.is_empty() {
                PLACEHOLDER_TITLE.to_string()
            } else {
                title.to_string()
            },
            target_note: target_note.filter(|n| !n.trim().is_empty()),
            target_date,
            items,
            current_index: 1,
        }
    }

    /// Like [`PomodoroSet::create`] but rejects `total == 0`.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when `total` is zero.
    pub fn create_strict(
        title: &str,
        target_note: Option<String>,
        target_date: Option<DateTime<Utc>>,
        total: u32,
    ) -> Result<Self> {
        if total < 1 {
            return Err(CoreError::invalid("a set needs at least one tomato"));
        }
        Ok(Self::create(title, target_note, target_date, total))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[TomatoItem] {
        &self.items
    }

    pub fn item(&self, id: u32) -> Option<&TomatoItem> {
        self.index_of(id).map(|i| &self.items[i])
    }

    pub fn total(&self) -> u32 {
        self.items.len() as u32
    }

    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    /// Number of items in the done state. Recomputed on every call.
    pub fn done_count(&self) -> u32 {
        self.items.iter().filter(|i| i.state.is_done()).count() as u32
    }

    /// Attach a photo to any item, whatever its state.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown item id or an empty blob.
    pub fn attach_photo(&mut self, id: u32, bytes: Vec<u8>) -> Result<()> {
        if bytes.is_empty() {
            return Err(CoreError::invalid("photo is empty"));
        }
        let item = self.item_mut(id)?;
        item.photo = Some(bytes);
        Ok(())
    }

    /// Drop the photo of an item. Returns whether one was present.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for an unknown item id.
    pub fn remove_photo(&mut self, id: u32) -> Result<bool> {
        let item = self.item_mut(id)?;
        Ok(item.photo.take().is_some())
    }

    /// Check the shape a set can only reach through the progress operations:
    /// sequential ids, items past the cursor locked, the cursor item
    /// available, and items before it either done or reopened.
    ///
    /// # Errors
    /// Returns `InvalidArgument` describing the first violation found.
    pub fn check_consistency(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(CoreError::invalid("set has no items"));
        }
        if self.current_index < 1 || self.current_index > self.total() + 1 {
            return Err(CoreError::invalid(format!(
                "current index {} outside 1..={}",
                self.current_index,
                self.total() + 1
            )));
        }
        for (pos, item) in self.items.iter().enumerate() {
            let expected_id = pos as u32 + 1;
            if item.id != expected_id {
                return Err(CoreError::invalid(format!(
                    "item at position {pos} has id {}, expected {expected_id}",
                    item.id
                )));
            }
            let ok = match item.id.cmp(&self.current_index) {
                std::cmp::Ordering::Less => item.state != TomatoState::Locked,
                std::cmp::Ordering::Equal => item.state == TomatoState::Available,
                std::cmp::Ordering::Greater => item.state == TomatoState::Locked,
            };
            if !ok {
                return Err(CoreError::invalid(format!(
                    "item {} is {:?} with current index {}",
                    item.id, item.state, self.current_index
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn index_of(&self, id: u32) -> Option<usize> {
        let idx = (id as usize).checked_sub(1)?;
        (idx < self.items.len()).then_some(idx)
    }

    pub(crate) fn item_mut(&mut self, id: u32) -> Result<&mut TomatoItem> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| CoreError::invalid(format!("no item {id} in set '{}'", self.title)))?;
        Ok(&mut self.items[idx])
    }
}
