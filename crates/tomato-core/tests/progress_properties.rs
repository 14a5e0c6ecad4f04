//! Property tests for the strict completion order of a set.

use proptest::prelude::*;
use tomato_core::tomato::progress;
use tomato_core::{PomodoroSet, TomatoState};

/// Smallest id that is not done, or `total + 1` when everything is.
fn first_open(set: &PomodoroSet) -> u32 {
    set.items()
        .iter()
        .find(|i| i.state() != TomatoState::Done)
        .map_or(set.total() + 1, |i| i.id())
}

proptest! {
    #[test]
    fn prop_cursor_tracks_first_open_item(
        total in 1u32..20,
        attempts in prop::collection::vec(0u32..25, 0..60),
    ) {
        let mut set = PomodoroSet::create("Prop", None, None, total);
        for id in attempts {
            let before = set.clone();
            match progress::complete_current(&mut set, id) {
                Ok(_) => {
                    prop_assert_eq!(id, before.current_index());
                    prop_assert_eq!(set.done_count(), before.done_count() + 1);
                }
                Err(_) => prop_assert_eq!(&set, &before),
            }
            prop_assert_eq!(set.current_index(), first_open(&set));
            prop_assert!(set.check_consistency().is_ok());
        }
    }

    #[test]
    fn prop_completing_in_order_finishes_the_set(total in 1u32..30) {
        let mut set = PomodoroSet::create("Prop", None, None, total);
        for id in 1..=total {
            let done = progress::complete_current(&mut set, id).unwrap();
            prop_assert_eq!(done.set_complete, id == total);
        }
        prop_assert_eq!(set.done_count(), total);
        prop_assert_eq!(set.current_index(), total + 1);
    }
}
