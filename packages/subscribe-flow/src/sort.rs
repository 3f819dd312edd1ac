//! Stable ordering and fixed-size pagination over record slices.
//!
//! Everything here is pure: inputs are never modified and identical inputs
//! always produce identical output.

use std::cmp::Ordering;

use subscribe_client::GroupRecord;

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Column the group table can be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GroupSortKey {
    #[default]
    GroupId,
    GroupName,
    MemberCount,
}

impl GroupSortKey {
    fn compare(self, a: &GroupRecord, b: &GroupRecord) -> Ordering {
        match self {
            GroupSortKey::GroupId => a.group_id.cmp(&b.group_id),
            GroupSortKey::GroupName => a.group_name.cmp(&b.group_name),
            GroupSortKey::MemberCount => a.member_count.cmp(&b.member_count),
        }
    }
}

/// Return a copy of `items` ordered by `compare` in direction `order`.
///
/// Elements that compare equal keep their relative input order in both directions.
pub fn sorted_by<T, F>(items: &[T], order: SortOrder, compare: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let mut out = items.to_vec();
    // slice::sort_by is stable
    out.sort_by(|a, b| order.apply(compare(a, b)));
    out
}

/// Return a copy of `items` ordered by the field `key` selects.
pub fn sorted_by_key<T, K, F>(items: &[T], order: SortOrder, key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    sorted_by(items, order, |a, b| key(a).cmp(&key(b)))
}

/// Return a sorted copy of the group table.
pub fn sort_groups(groups: &[GroupRecord], key: GroupSortKey, order: SortOrder) -> Vec<GroupRecord> {
    sorted_by(groups, order, |a, b| key.compare(a, b))
}

/// The slice `[page * size, page * size + size)` of `items`, clamped to its length.
///
/// Pages past the end are empty. A zero page size yields empty pages.
pub fn paginate<T>(items: &[T], page: usize, size: usize) -> &[T] {
    let start = page.saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `total` items, `size` per page. Always at least 1.
pub fn page_count(total: usize, size: usize) -> usize {
    if size == 0 {
        return 1;
    }
    total.div_ceil(size).max(1)
}
