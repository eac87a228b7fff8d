#![forbid(unsafe_code)]

//! Property tests for [`Reconciler`] invariants.
//!
//! Validates:
//! - After every pass the headless view's packed order equals the item order
//!   and the trailer stays last.
//! - Surviving rows are never recreated; toggles and edits are pure updates.
//! - Pure insertions and deletions never report `order_changed`.
//! - Drags leave the view order a permutation of the rendered rows.

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;

use notepin_core::{Item, ItemId};
use notepin_widgets::{
    AttachStrategy, DragReorderController, Reconciler, StackView, ViewOp,
};

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Edit {
    Insert { slot: usize },
    Remove { slot: usize },
    Toggle { slot: usize },
    Retext { slot: usize, lines: u8 },
    Swap { slot: usize },
    Font(u32),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        4 => (0usize..64).prop_map(|slot| Edit::Insert { slot }),
        2 => (0usize..64).prop_map(|slot| Edit::Remove { slot }),
        2 => (0usize..64).prop_map(|slot| Edit::Toggle { slot }),
        2 => (0usize..64, 1u8..4).prop_map(|(slot, lines)| Edit::Retext { slot, lines }),
        2 => (0usize..64).prop_map(|slot| Edit::Swap { slot }),
        1 => prop_oneof![Just(11u32), Just(13), Just(15), Just(17)].prop_map(Edit::Font),
    ]
}

fn item(id: u64) -> Item {
    let stamp = NaiveDate::from_ymd_opt(2025, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Item::new(ItemId::new(id), stamp).with_text(format!("item {id}"))
}

fn ids(items: &[Item]) -> Vec<ItemId> {
    items.iter().map(|item| item.id).collect()
}

// ============================================================================
// Invariant 1: view order mirrors item order, trailer last
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn view_tracks_items_through_random_edits(
        edits in prop::collection::vec(edit_strategy(), 1..80)
    ) {
        let mut rec = Reconciler::new();
        let mut view = StackView::new();
        let mut items: Vec<Item> = Vec::new();
        let mut font = 13u32;
        let mut next_id = 1u64;

        for edit in edits {
            let before = ids(&items);
            let mut order_edit = false;
            match edit {
                Edit::Insert { slot } => {
                    let at = slot % (items.len() + 1);
                    items.insert(at, item(next_id));
                    next_id += 1;
                }
                Edit::Remove { slot } if !items.is_empty() => {
                    let at = slot % items.len();
                    items.remove(at);
                }
                Edit::Toggle { slot } if !items.is_empty() => {
                    let at = slot % items.len();
                    items[at].completed = !items[at].completed;
                }
                Edit::Retext { slot, lines } if !items.is_empty() => {
                    let at = slot % items.len();
                    items[at].text = vec!["line"; usize::from(lines)].join("\n");
                }
                Edit::Swap { slot } if items.len() > 1 => {
                    let at = slot % (items.len() - 1);
                    items.swap(at, at + 1);
                    order_edit = true;
                }
                Edit::Font(size) => font = size,
                _ => {}
            }

            let pass = rec.reconcile(&items, font, false, &mut view);
            prop_assert_eq!(view.packed_order(), ids(&items));
            let expected_ids = ids(&items);
            prop_assert_eq!(rec.order(), expected_ids.as_slice());
            prop_assert!(view.trailer_is_last());
            prop_assert_eq!(pass.ops.last(), Some(&ViewOp::PinTrailer));
            prop_assert_eq!(view.row_count(), items.len());
            if !order_edit {
                prop_assert!(!pass.order_changed, "order flagged for {:?} -> {:?}", before, ids(&items));
            }
            for kept in &items {
                let row = view.row(kept.id).unwrap();
                prop_assert_eq!(&row.text, &kept.text);
                prop_assert_eq!(row.completed, kept.completed);
                prop_assert_eq!(row.font_size, font);
            }
        }
    }
}

// ============================================================================
// Invariant 2: field changes never recreate rows
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn toggles_are_targeted_updates(
        len in 1usize..30,
        toggles in prop::collection::vec(0usize..30, 1..20),
    ) {
        let mut rec = Reconciler::new();
        let mut view = StackView::new();
        let mut items: Vec<Item> = (1..=len as u64).map(item).collect();
        rec.reconcile(&items, 13, false, &mut view);
        let created_before = view.stats().created;

        for slot in toggles {
            let at = slot % items.len();
            items[at].completed = !items[at].completed;
            let pass = rec.reconcile(&items, 13, false, &mut view);
            prop_assert!(pass.created.is_empty());
            prop_assert!(pass.destroyed.is_empty());
            prop_assert!(!pass.order_changed);
            prop_assert_eq!(pass.strategy, AttachStrategy::Untouched);
            prop_assert_eq!(pass.updated, vec![items[at].id]);
        }
        prop_assert_eq!(view.stats().created, created_before);
        prop_assert_eq!(view.stats().destroyed, 0);
    }
}

// ============================================================================
// Invariant 3: drags permute rows
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn drag_keeps_view_a_permutation(
        len in 1usize..15,
        pick in 0usize..15,
        path in prop::collection::vec(-20i32..600, 1..12),
    ) {
        let mut rec = Reconciler::new();
        let mut view = StackView::new();
        let items: Vec<Item> = (1..=len as u64).map(item).collect();
        rec.reconcile(&items, 13, false, &mut view);

        let dragged = items[pick % len].id;
        let mut drag = DragReorderController::new();
        prop_assert!(drag.begin(dragged, &rec));
        for y in path {
            drag.update(dragged, y, &mut rec, &mut view);
            prop_assert_eq!(view.packed_order(), rec.order().to_vec());
        }
        let outcome = drag.end(dragged, &rec, &mut view).unwrap();

        let expected: HashSet<ItemId> = ids(&items).into_iter().collect();
        let got: HashSet<ItemId> = outcome.order.iter().copied().collect();
        prop_assert_eq!(got, expected);
        prop_assert_eq!(outcome.order.len(), len);
        prop_assert_eq!(outcome.order[outcome.final_index], dragged);
        prop_assert!(view.trailer_is_last());
        prop_assert_eq!(view.indicator(), None);
    }
}
