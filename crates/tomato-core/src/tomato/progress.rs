//! Progress state machine for a single set.
//!
//! All item state transitions live here. Normal progression is strictly
//! ordered: only the item at `current_index` can be completed, and doing so
//! unlocks the next one.
//!
//! ```text
//! [available, locked, locked]   current 1
//!   complete_current(1)
//! [done, available, locked]     current 2
//!   complete_current(2)
//! [done, done, available]       current 3
//!   complete_current(3)
//! [done, done, done]            current 4 (complete)
//! ```
//!
//! `restart` reopens a done item without moving the cursor or touching any
//! other item. The reopened item is closed again with `finish_restarted`.

use tracing::debug;

use super::item::TomatoState;
use super::set::PomodoroSet;
use crate::error::{CoreError, Result};

/// Outcome of a successful [`complete_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Id of the item that was just completed.
    pub item_id: u32,
    /// Id of the newly available item, `None` when the last item was completed.
    pub next_id: Option<u32>,
    /// Whether every item of the set is now done.
    pub set_complete: bool,
}

/// Complete the current item and unlock the next one.
///
/// # Errors
/// Returns `OutOfOrder` when `id` is not the set's current index (this
/// includes every call on a finished set). The set is left unchanged.
pub fn complete_current(set: &mut PomodoroSet, id: u32) -> Result<Completion> {
    let current = set.current_index;
    if id != current {
        return Err(CoreError::OutOfOrder {
            expected: current,
            requested: id,
        });
    }
    let idx = set.index_of(id).ok_or(CoreError::OutOfOrder {
        expected: current,
        requested: id,
    })?;

    set.items[idx].state = TomatoState::Done;
    set.current_index = current + 1;

    let next_id = set.index_of(current + 1).map(|next| {
        set.items[next].state = TomatoState::Available;
        current + 1
    });

    let set_complete = is_set_complete(set);
    debug!(set = %set.id(), item = id, ?next_id, set_complete, "tomato completed");
    Ok(Completion {
        item_id: id,
        next_id,
        set_complete,
    })
}

/// Reopen a done item so its session can be redone.
///
/// Neither `current_index` nor any other item changes, so a set can show
/// more than one available item afterwards.
///
/// # Errors
/// Returns `InvalidArgument` for an unknown id or an item that is not done.
pub fn restart(set: &mut PomodoroSet, id: u32) -> Result<()> {
    let item = set.item_mut(id)?;
    if item.state != TomatoState::Done {
        return Err(CoreError::invalid(format!(
            "item {id} is {:?}, only done items can be restarted",
            item.state
        )));
    }
    item.state = TomatoState::Available;
    debug!(set = %set.id(), item = id, "tomato restarted");
    Ok(())
}

/// Close an item previously reopened with [`restart`].
///
/// Returns whether the set is complete afterwards.
///
/// # Errors
/// Returns `OutOfOrder` if `id` is not an available item below the current
/// index; the current item itself must go through [`complete_current`].
pub fn finish_restarted(set: &mut PomodoroSet, id: u32) -> Result<bool> {
    let current = set.current_index;
    let reopened = id < current
        && set
            .item(id)
            .is_some_and(|item| item.state == TomatoState::Available);
    if !reopened {
        return Err(CoreError::OutOfOrder {
            expected: current,
            requested: id,
        });
    }
    set.item_mut(id)?.state = TomatoState::Done;
    debug!(set = %set.id(), item = id, "restarted tomato finished");
    Ok(is_set_complete(set))
}

/// True iff every item in the set is done.
pub fn is_set_complete(set: &PomodoroSet) -> bool {
    set.done_count() == set.total()
}

/// Ids of items that are available but sit below the cursor.
pub fn reopened_items(set: &PomodoroSet) -> Vec<u32> {
    set.items()
        .iter()
        .filter(|i| i.id() < set.current_index && i.state() == TomatoState::Available)
        .map(|i| i.id())
        .collect()
}

/// The item at the cursor, `None` once the set is finished.
pub fn current_item(set: &PomodoroSet) -> Option<&super::item::TomatoItem> {
    set.item(set.current_index)
}
