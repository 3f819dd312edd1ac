//! Group selection for one membership dialog session.
//!
//! The engine seeds itself once from the server's membership snapshot and is
//! mutated only through [`MembershipSelectionEngine::toggle`] afterwards.

use subscribe_client::GroupRecord;

/// Groups added and removed relative to the seeding snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
    pub added: Vec<i64>,
    pub removed: Vec<i64>,
}

impl SelectionDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Insertion-ordered set of selected group ids.
#[derive(Debug, Clone, Default)]
pub struct MembershipSelectionEngine {
    selected: Vec<i64>,
    seeded: bool,
}

impl MembershipSelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Seed from the snapshot: every group whose `is_member` flag is set.
    ///
    /// Only the first call in a session has an effect. Returns whether this
    /// call seeded the engine.
    pub fn seed(&mut self, groups: &[GroupRecord]) -> bool {
        if self.seeded {
            return false;
        }
        self.selected.clear();
        for group in groups.iter().filter(|g| g.is_member) {
            if !self.selected.contains(&group.group_id) {
                self.selected.push(group.group_id);
            }
        }
        self.seeded = true;
        true
    }

    /// Flip membership of `group_id` and return the full selection.
    ///
    /// Deselecting removes the id in place; selecting appends it.
    pub fn toggle(&mut self, group_id: i64) -> Vec<i64> {
        match self.selected.iter().position(|id| *id == group_id) {
            Some(idx) => {
                self.selected.remove(idx);
            }
            None => self.selected.push(group_id),
        }
        self.current()
    }

    pub fn is_selected(&self, group_id: i64) -> bool {
        self.selected.contains(&group_id)
    }

    /// Current selection in toggle-history order.
    pub fn current(&self) -> Vec<i64> {
        self.selected.clone()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Changes against the snapshot the engine was seeded from.
    pub fn diff(&self, snapshot: &[GroupRecord]) -> SelectionDiff {
        let mut diff = SelectionDiff::default();
        for id in &self.selected {
            if !snapshot.iter().any(|g| g.group_id == *id && g.is_member) {
                diff.added.push(*id);
            }
        }
        for group in snapshot.iter().filter(|g| g.is_member) {
            if !self.is_selected(group.group_id) && !diff.removed.contains(&group.group_id) {
                diff.removed.push(group.group_id);
            }
        }
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn group(id: i64, is_member: bool) -> GroupRecord {
        GroupRecord {
            group_id: id,
            group_name: format!("group-{id}"),
            member_count: 0,
            is_member,
        }
    }

    fn as_set(ids: Vec<i64>) -> BTreeSet<i64> {
        ids.into_iter().collect()
    }

    #[test]
    fn seed_selects_current_memberships() {
        let mut engine = MembershipSelectionEngine::new();

        assert!(engine.seed(&[group(1, true), group(2, false), group(3, true)]));

        assert_eq!(engine.current(), vec![1, 3]);
        assert!(engine.is_selected(1));
        assert!(!engine.is_selected(2));
    }

    #[test]
    fn toggle_returns_full_selection_in_toggle_order() {
        let mut engine = MembershipSelectionEngine::new();
        engine.seed(&[group(5, true), group(1, false), group(3, false)]);

        assert_eq!(engine.toggle(3), vec![5, 3]);
        assert_eq!(engine.toggle(1), vec![5, 3, 1]);
        assert_eq!(engine.toggle(3), vec![5, 1]);
    }

    #[test]
    fn duplicate_snapshot_rows_seed_once() {
        let mut engine = MembershipSelectionEngine::new();
        engine.seed(&[group(1, true), group(1, true)]);

        assert_eq!(engine.current(), vec![1]);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn diff_reports_changes_against_snapshot() {
        let snapshot = [group(1, true), group(2, false), group(3, true)];
        let mut engine = MembershipSelectionEngine::new();
        engine.seed(&snapshot);
        assert!(engine.diff(&snapshot).is_empty());

        engine.toggle(1);
        engine.toggle(2);

        assert_eq!(
            engine.diff(&snapshot),
            SelectionDiff {
                added: vec![2],
                removed: vec![1],
            }
        );
    }

    mod proptest_selection {
        use proptest::prelude::*;

        use super::*;

        /// Snapshots over a small id range so repeated rows occur.
        fn arb_snapshot() -> impl Strategy<Value = Vec<GroupRecord>> {
            proptest::collection::vec((0i64..16, any::<bool>()), 0..24).prop_map(|rows| {
                rows.into_iter()
                    .map(|(id, is_member)| group(id, is_member))
                    .collect::<Vec<_>>()
            })
        }

        fn arb_toggles() -> impl Strategy<Value = Vec<i64>> {
            proptest::collection::vec(0i64..16, 0..40)
        }

        fn seeded(snapshot: &[GroupRecord]) -> MembershipSelectionEngine {
            let mut engine = MembershipSelectionEngine::new();
            engine.seed(snapshot);
            engine
        }

        proptest! {
            /// Seeding twice leaves the same selection as seeding once.
            #[test]
            fn prop_seed_is_idempotent(snapshot in arb_snapshot()) {
                let once = seeded(&snapshot);
                let mut twice = seeded(&snapshot);

                prop_assert!(!twice.seed(&snapshot));
                prop_assert_eq!(once.current(), twice.current());
            }

            /// A later seed never overwrites toggles, whatever snapshot it carries.
            #[test]
            fn prop_reseed_keeps_toggles(
                snapshot in arb_snapshot(),
                later in arb_snapshot(),
                toggles in arb_toggles(),
            ) {
                let mut engine = seeded(&snapshot);
                for id in &toggles {
                    engine.toggle(*id);
                }
                let before = engine.current();

                engine.seed(&later);

                prop_assert_eq!(engine.current(), before);
            }

            /// Toggling any id twice restores the selected set.
            #[test]
            fn prop_toggle_twice_restores_the_set(
                snapshot in arb_snapshot(),
                toggles in arb_toggles(),
                id in 0i64..16,
            ) {
                let mut engine = seeded(&snapshot);
                for t in &toggles {
                    engine.toggle(*t);
                }
                let before = as_set(engine.current());

                engine.toggle(id);
                let after = engine.toggle(id);

                prop_assert_eq!(as_set(after), before);
            }

            /// An id ends up selected exactly when its seeded membership was
            /// flipped an even number of times.
            #[test]
            fn prop_selection_follows_toggle_parity(
                snapshot in arb_snapshot(),
                toggles in arb_toggles(),
            ) {
                let mut engine = seeded(&snapshot);
                for id in &toggles {
                    engine.toggle(*id);
                }

                let current = engine.current();
                prop_assert_eq!(as_set(current.clone()).len(), current.len());
                for id in 0i64..16 {
                    let seeded_in = snapshot.iter().any(|g| g.group_id == id && g.is_member);
                    let flips = toggles.iter().filter(|t| **t == id).count();
                    prop_assert_eq!(engine.is_selected(id), seeded_in ^ (flips % 2 == 1));
                }
            }
        }
    }
}
