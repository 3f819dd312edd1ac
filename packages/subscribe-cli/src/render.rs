//! Text rendering for search results and the group dialog

use console::style;
use subscribe_client::SearchResultRecord;
use subscribe_flow::{DialogView, GroupRow, GroupSortKey, SortOrder};

/// One line per search result: name, uid, follower count, profile link.
pub fn format_result(record: &SearchResultRecord) -> String {
    format!(
        "{}  {}  {}",
        style(&record.display_name).bold(),
        style(format!("uid {}", record.entity_id)).dim(),
        format_followers(record.follower_count),
    )
}

/// Profile link and avatar of a result, for the detail line.
pub fn format_result_links(record: &SearchResultRecord, avatar_proxy: Option<&str>) -> String {
    let mut line = record.profile_url();
    if !record.avatar_ref.is_empty() {
        line.push_str("  ");
        line.push_str(&record.avatar_url(avatar_proxy));
    }
    line
}

fn format_followers(count: i64) -> String {
    if count == 1 {
        "1 follower".to_string()
    } else {
        format!("{} followers", count)
    }
}

/// Checkbox row for the group table.
pub fn format_group_row(row: &GroupRow) -> String {
    let badge = if row.selected { "[x]" } else { "[ ]" };
    format!(
        "{} {} ({} members)",
        badge, row.group.group_name, row.group.member_count
    )
}

/// Dialog title: whose groups, which page, how many selected.
pub fn format_dialog_header(dialog: &DialogView) -> String {
    let who = match &dialog.display_name {
        Some(name) => format!("{} (uid {})", name, dialog.entity_id),
        None => format!("uid {}", dialog.entity_id),
    };
    format!(
        "Groups for {}  page {}/{}  {} of {} selected  sorted by {} {}",
        who,
        dialog.page + 1,
        dialog.page_count,
        dialog.selected_count,
        dialog.total,
        sort_key_label(dialog.sort_key),
        dialog.order.label(),
    )
}

pub fn sort_key_label(key: GroupSortKey) -> &'static str {
    match key {
        GroupSortKey::GroupId => "id",
        GroupSortKey::GroupName => "name",
        GroupSortKey::MemberCount => "members",
    }
}

/// Every ordering offered in the sort menu.
pub fn sort_choices() -> Vec<(GroupSortKey, SortOrder)> {
    let mut choices = Vec::new();
    for key in [
        GroupSortKey::GroupId,
        GroupSortKey::GroupName,
        GroupSortKey::MemberCount,
    ] {
        choices.push((key, SortOrder::Asc));
        choices.push((key, SortOrder::Desc));
    }
    choices
}

#[cfg(test)]
mod tests {
    use super::*;
    use subscribe_client::GroupRecord;

    fn plain(s: String) -> String {
        console::strip_ansi_codes(&s).to_string()
    }

    #[test]
    fn group_rows_show_selection_badge() {
        let mut row = GroupRow {
            group: GroupRecord {
                group_id: 1,
                group_name: "Music".to_string(),
                member_count: 12,
                is_member: false,
            },
            selected: false,
        };

        assert_eq!(format_group_row(&row), "[ ] Music (12 members)");
        row.selected = true;
        assert_eq!(format_group_row(&row), "[x] Music (12 members)");
    }

    #[test]
    fn result_lines_include_uid_and_followers() {
        let record = SearchResultRecord {
            entity_id: 42,
            display_name: "alice".to_string(),
            avatar_ref: String::new(),
            follower_count: 1,
        };

        assert_eq!(plain(format_result(&record)), "alice  uid 42  1 follower");
        assert_eq!(
            format_result_links(&record, None),
            "https://space.bilibili.com/42"
        );
    }

    #[test]
    fn dialog_header_is_one_based() {
        let dialog = DialogView {
            entity_id: 42,
            display_name: Some("alice".to_string()),
            rows: Vec::new(),
            page: 0,
            page_count: 3,
            total: 25,
            sort_key: GroupSortKey::GroupId,
            order: SortOrder::Asc,
            selected_count: 2,
            busy: false,
            error: None,
        };

        assert_eq!(
            format_dialog_header(&dialog),
            "Groups for alice (uid 42)  page 1/3  2 of 25 selected  sorted by id asc"
        );
    }

    #[test]
    fn sort_menu_offers_both_directions_per_column() {
        let choices = sort_choices();

        assert_eq!(choices.len(), 6);
        assert_eq!(choices[0], (GroupSortKey::GroupId, SortOrder::Asc));
        assert_eq!(choices[5], (GroupSortKey::MemberCount, SortOrder::Desc));
    }
}
