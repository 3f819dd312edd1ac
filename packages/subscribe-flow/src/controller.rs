//! Async driver connecting the workflow state machine to the API.
//!
//! The controller is single-threaded and cooperative: the workflow sits in a
//! `RefCell` that is only borrowed between awaits, so several entry points may
//! be in flight at once and their responses are applied in arrival order.

use std::cell::RefCell;

use subscribe_client::{SearchResultRecord, SubscribeApi};

use crate::error::Result;
use crate::search::{SearchState, SearchWorkflow};
use crate::sort::{GroupSortKey, SortOrder};
use crate::submit::SubmitOutcome;
use crate::view::WorkflowView;

pub struct SubscribeController<A> {
    api: A,
    workflow: RefCell<SearchWorkflow>,
}

impl<A: SubscribeApi> SubscribeController<A> {
    pub fn new(api: A) -> Self {
        Self::with_workflow(api, SearchWorkflow::new())
    }

    pub fn with_workflow(api: A, workflow: SearchWorkflow) -> Self {
        Self {
            api,
            workflow: RefCell::new(workflow),
        }
    }

    /// Search creators by name and return the settled state.
    ///
    /// While another search or a submit is outstanding this returns the
    /// current state without issuing a request.
    pub async fn search(&self, name: &str) -> Result<SearchState> {
        let begun = self.workflow.borrow_mut().begin_search(name)?;
        let Some(ticket) = begun else {
            return Ok(self.state());
        };

        let result = self.api.search(ticket.query()).await;
        self.workflow.borrow_mut().complete_search(&ticket, result);
        Ok(self.state())
    }

    /// Fetch the group list for a result row and open its dialog.
    ///
    /// The dialog only opens if this fetch still belongs to the current
    /// session when it resolves.
    pub async fn open_membership(&self, entity_id: i64) -> Result<()> {
        let begun = self.workflow.borrow_mut().begin_membership(entity_id)?;
        let Some(ticket) = begun else {
            return Ok(());
        };

        let result = self.api.fetch_group_list(ticket.entity_id()).await;
        self.workflow.borrow_mut().complete_membership(ticket, result);
        Ok(())
    }

    pub fn toggle_group(&self, group_id: i64) -> Option<Vec<i64>> {
        self.workflow.borrow_mut().toggle_group(group_id)
    }

    /// Submit the open dialog's selection.
    ///
    /// Returns `None` without sending anything when no dialog is open or a
    /// submit is already outstanding, and also when the dialog was closed
    /// before the response arrived.
    pub async fn confirm(&self) -> Option<SubmitOutcome> {
        let begun = self.workflow.borrow_mut().begin_submit();
        let (ticket, payload) = begun?;

        let result = self.api.submit_subscription(&payload).await;
        self.workflow.borrow_mut().complete_submit(ticket, result)
    }

    /// Close the dialog without submitting. Returns `false` while a submit is outstanding.
    pub fn cancel(&self) -> bool {
        self.workflow.borrow_mut().cancel()
    }

    pub fn set_page(&self, page: usize) {
        self.workflow.borrow_mut().set_page(page);
    }

    pub fn next_page(&self) {
        self.workflow.borrow_mut().next_page();
    }

    pub fn prev_page(&self) {
        self.workflow.borrow_mut().prev_page();
    }

    pub fn set_sort(&self, key: GroupSortKey, order: SortOrder) {
        self.workflow.borrow_mut().set_sort(key, order);
    }

    pub fn dismiss_notice(&self) {
        self.workflow.borrow_mut().dismiss_notice();
    }

    // Read side

    pub fn view(&self) -> WorkflowView {
        self.workflow.borrow().view()
    }

    pub fn state(&self) -> SearchState {
        self.workflow.borrow().state().clone()
    }

    pub fn results(&self) -> Vec<SearchResultRecord> {
        self.workflow.borrow().results().to_vec()
    }

    pub fn is_selected(&self, group_id: i64) -> bool {
        self.workflow.borrow().is_selected(group_id)
    }

    /// Current selection of the open dialog, if any.
    pub fn selection(&self) -> Option<Vec<i64>> {
        self.workflow
            .borrow()
            .session()
            .map(|s| s.selection().current())
    }

    /// Creator the open dialog belongs to, if any.
    pub fn open_entity(&self) -> Option<i64> {
        self.workflow.borrow().session().map(|s| s.entity_id())
    }

    pub fn is_searching(&self) -> bool {
        self.workflow.borrow().is_searching()
    }

    pub fn is_loading_membership(&self) -> bool {
        self.workflow.borrow().is_loading_membership()
    }

    pub fn is_submitting(&self) -> bool {
        self.workflow.borrow().is_submitting()
    }
}
