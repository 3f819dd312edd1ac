//! Read-only snapshots handed to the rendering layer.

use subscribe_client::SearchResultRecord;

use crate::search::{GroupRow, MembershipPhase, MembershipSession, Notice, SearchState, SearchWorkflow};
use crate::sort::{GroupSortKey, SortOrder};

/// Everything a renderer needs to draw the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub state: SearchState,
    pub results: Vec<SearchResultRecord>,
    pub membership: MembershipView,
    pub notice: Option<Notice>,
    pub searching: bool,
    pub loading_membership: bool,
    pub submitting: bool,
}

impl WorkflowView {
    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

/// The membership dialog as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipView {
    Closed,
    /// Fetch outstanding; show a loader, not the dialog
    Loading { entity_id: i64 },
    Failed { entity_id: i64, message: String },
    Open(DialogView),
}

/// An open membership dialog: one page of the group table plus its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogView {
    pub entity_id: i64,
    pub display_name: Option<String>,
    pub rows: Vec<GroupRow>,
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub sort_key: GroupSortKey,
    pub order: SortOrder,
    pub selected_count: usize,
    pub busy: bool,
    pub error: Option<String>,
}

impl DialogView {
    fn from_session(session: &MembershipSession, display_name: Option<String>) -> Self {
        Self {
            entity_id: session.entity_id(),
            display_name,
            rows: session.visible_rows(),
            page: session.page(),
            page_count: session.page_count(),
            total: session.groups().len(),
            sort_key: session.sort_key(),
            order: session.order(),
            selected_count: session.selection().len(),
            busy: session.submitter().is_busy(),
            error: session.submitter().last_error().map(str::to_string),
        }
    }
}

impl SearchWorkflow {
    /// Snapshot of the current state for rendering.
    pub fn view(&self) -> WorkflowView {
        let membership = match self.membership() {
            MembershipPhase::Closed => MembershipView::Closed,
            MembershipPhase::Loading(ticket) => MembershipView::Loading {
                entity_id: ticket.entity_id(),
            },
            MembershipPhase::Failed { entity_id, error } => MembershipView::Failed {
                entity_id: *entity_id,
                message: error.to_string(),
            },
            MembershipPhase::Open(session) => {
                let display_name = self
                    .results()
                    .iter()
                    .find(|r| r.entity_id == session.entity_id())
                    .map(|r| r.display_name.clone());
                MembershipView::Open(DialogView::from_session(session, display_name))
            }
        };

        WorkflowView {
            state: self.state().clone(),
            results: self.results().to_vec(),
            membership,
            notice: self.notice().cloned(),
            searching: self.is_searching(),
            loading_membership: self.is_loading_membership(),
            submitting: self.is_submitting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subscribe_client::GroupRecord;

    #[test]
    fn open_dialog_view_reports_page_and_badges() {
        let mut wf = SearchWorkflow::with_page_size(2);
        let ticket = wf.begin_search("alice").unwrap().unwrap();
        wf.complete_search(
            &ticket,
            Ok(vec![SearchResultRecord {
                entity_id: 42,
                display_name: "alice".into(),
                avatar_ref: String::new(),
                follower_count: 10,
            }]),
        );
        let ticket = wf.begin_membership(42).unwrap().unwrap();
        assert_eq!(
            wf.view().membership,
            MembershipView::Loading { entity_id: 42 }
        );

        let groups = (1..=3)
            .map(|id| GroupRecord {
                group_id: id,
                group_name: format!("g{id}"),
                member_count: 0,
                is_member: id == 2,
            })
            .collect();
        wf.complete_membership(ticket, Ok(groups));

        let view = wf.view();
        assert_eq!(view.state, SearchState::Found);
        assert_eq!(view.result_count(), 1);
        match view.membership {
            MembershipView::Open(dialog) => {
                assert_eq!(dialog.display_name.as_deref(), Some("alice"));
                assert_eq!(dialog.page_count, 2);
                assert_eq!(dialog.total, 3);
                assert_eq!(dialog.selected_count, 1);
                assert_eq!(dialog.rows.len(), 2);
                assert!(!dialog.rows[0].selected);
                assert!(dialog.rows[1].selected);
                assert!(!dialog.busy);
            }
            other => panic!("expected open dialog, got {other:?}"),
        }
    }
}
