//! Search and membership-dialog state machine.
//!
//! All transitions are synchronous. Every round trip is split into a `begin_*`
//! call that hands out a ticket and a `complete_*` call that applies the
//! response for that ticket. Responses whose ticket no longer matches the
//! current search or dialog session are discarded.
//!
//! ```text
//! Idle ──begin_search──► Searching ──complete_search──► Found | Empty | Failed
//!                            ▲                              │
//!                            └─────────begin_search─────────┘
//!
//! Closed ──begin_membership──► Loading ──complete_membership──► Open | Failed
//!   ▲                                                             │
//!   └──────────── cancel / accepted submit / new search ──────────┘
//! ```

use subscribe_client::{ApiError, GroupRecord, SearchResultRecord, SubmissionPayload, SubmitResponse};

use crate::error::{FlowError, Result};
use crate::selection::MembershipSelectionEngine;
use crate::sort::{page_count, paginate, sort_groups, GroupSortKey, SortOrder};
use crate::submit::{SubmitOutcome, SubscriptionSubmitter};

/// Rows per page of the group table.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Top-level search state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    Found,
    /// The search succeeded with zero matches
    Empty,
    /// The search request failed
    Failed(FlowError),
}

impl SearchState {
    pub fn label(&self) -> &'static str {
        match self {
            SearchState::Idle => "idle",
            SearchState::Searching => "searching",
            SearchState::Found => "found",
            SearchState::Empty => "empty",
            SearchState::Failed(_) => "failed",
        }
    }
}

/// Identity of one membership dialog session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

/// Handle for an outstanding search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    /// The trimmed name to send.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Handle for an outstanding group-list fetch, keyed to the session it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipTicket {
    session: SessionId,
    entity_id: i64,
}

impl MembershipTicket {
    pub fn entity_id(&self) -> i64 {
        self.entity_id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }
}

/// Handle for an outstanding submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket {
    session: SessionId,
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Failure,
}

/// A message for the operator, e.g. the outcome of the last submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// A group table row with its selection badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub group: GroupRecord,
    pub selected: bool,
}

/// One open membership dialog: the snapshot, the selection, and the table view over it.
#[derive(Debug, Clone)]
pub struct MembershipSession {
    id: SessionId,
    entity_id: i64,
    groups: Vec<GroupRecord>,
    selection: MembershipSelectionEngine,
    submitter: SubscriptionSubmitter,
    sort_key: GroupSortKey,
    order: SortOrder,
    page: usize,
    page_size: usize,
}

impl MembershipSession {
    fn open(ticket: MembershipTicket, groups: Vec<GroupRecord>, page_size: usize) -> Self {
        let mut selection = MembershipSelectionEngine::new();
        selection.seed(&groups);
        Self {
            id: ticket.session,
            entity_id: ticket.entity_id,
            groups,
            selection,
            submitter: SubscriptionSubmitter::new(),
            sort_key: GroupSortKey::default(),
            order: SortOrder::default(),
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn entity_id(&self) -> i64 {
        self.entity_id
    }

    /// The group snapshot exactly as fetched.
    pub fn groups(&self) -> &[GroupRecord] {
        &self.groups
    }

    pub fn selection(&self) -> &MembershipSelectionEngine {
        &self.selection
    }

    pub fn submitter(&self) -> &SubscriptionSubmitter {
        &self.submitter
    }

    pub fn is_selected(&self, group_id: i64) -> bool {
        self.selection.is_selected(group_id)
    }

    pub fn sort_key(&self) -> GroupSortKey {
        self.sort_key
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.groups.len(), self.page_size)
    }

    /// The current page of the sorted group table.
    pub fn visible_rows(&self) -> Vec<GroupRow> {
        let sorted = sort_groups(&self.groups, self.sort_key, self.order);
        paginate(&sorted, self.page, self.page_size)
            .iter()
            .map(|group| GroupRow {
                selected: self.is_selected(group.group_id),
                group: group.clone(),
            })
            .collect()
    }

    fn set_page(&mut self, page: usize) {
        self.page = page.min(self.page_count() - 1);
    }
}

/// Where the membership dialog is in its lifecycle.
#[derive(Debug, Clone, Default)]
pub enum MembershipPhase {
    #[default]
    Closed,
    /// Group list requested; the dialog is not shown yet
    Loading(MembershipTicket),
    Open(MembershipSession),
    /// The group list could not be fetched
    Failed { entity_id: i64, error: FlowError },
}

/// State container for the whole search-and-assign page.
#[derive(Debug, Clone)]
pub struct SearchWorkflow {
    state: SearchState,
    results: Vec<SearchResultRecord>,
    search_generation: u64,
    membership: MembershipPhase,
    last_session: u64,
    page_size: usize,
    notice: Option<Notice>,
}

impl Default for SearchWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchWorkflow {
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: SearchState::Idle,
            results: Vec::new(),
            search_generation: 0,
            membership: MembershipPhase::Closed,
            last_session: 0,
            page_size: page_size.max(1),
            notice: None,
        }
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Start a search for `name`.
    ///
    /// Blank names are rejected without leaving the current state. Returns
    /// `Ok(None)` while a search or a submit is already outstanding.
    pub fn begin_search(&mut self, name: &str) -> Result<Option<SearchTicket>> {
        let query = name.trim();
        if query.is_empty() {
            return Err(FlowError::EmptyQuery);
        }
        if self.state == SearchState::Searching {
            tracing::warn!(query, "Search already in flight, ignoring");
            return Ok(None);
        }
        if self.is_submitting() {
            tracing::warn!(query, "Submit in flight, ignoring search");
            return Ok(None);
        }

        // The previous result set, and any dialog opened from it, are gone.
        self.on_session_close();
        self.results.clear();
        self.notice = None;
        self.search_generation += 1;
        self.state = SearchState::Searching;
        tracing::debug!(query, generation = self.search_generation, "Search started");

        Ok(Some(SearchTicket {
            generation: self.search_generation,
            query: query.to_string(),
        }))
    }

    /// Apply a search response. Returns whether it was applied.
    pub fn complete_search(
        &mut self,
        ticket: &SearchTicket,
        result: std::result::Result<Vec<SearchResultRecord>, ApiError>,
    ) -> bool {
        if ticket.generation != self.search_generation || self.state != SearchState::Searching {
            tracing::warn!(query = %ticket.query, "Discarding stale search response");
            return false;
        }

        self.state = match result {
            Ok(records) if records.is_empty() => SearchState::Empty,
            Ok(records) => {
                self.results = records;
                SearchState::Found
            }
            Err(err) => SearchState::Failed(err.into()),
        };
        tracing::debug!(
            query = %ticket.query,
            state = self.state.label(),
            count = self.results.len(),
            "Search settled"
        );
        true
    }

    // =========================================================================
    // Membership dialog
    // =========================================================================

    /// Request the group list for a result row.
    ///
    /// Any open dialog is closed first; the new session starts empty. Returns
    /// `Ok(None)` if a fetch for the same creator is already outstanding or
    /// the open dialog is submitting.
    pub fn begin_membership(&mut self, entity_id: i64) -> Result<Option<MembershipTicket>> {
        if !self.results.iter().any(|r| r.entity_id == entity_id) {
            return Err(FlowError::UnknownEntity(entity_id));
        }
        if let MembershipPhase::Loading(pending) = &self.membership {
            if pending.entity_id == entity_id {
                tracing::warn!(entity_id, "Group list already loading, ignoring");
                return Ok(None);
            }
        }
        if self.is_submitting() {
            tracing::warn!(entity_id, "Submit in flight, ignoring open");
            return Ok(None);
        }

        self.on_session_close();
        self.last_session += 1;
        let ticket = MembershipTicket {
            session: SessionId(self.last_session),
            entity_id,
        };
        self.membership = MembershipPhase::Loading(ticket);
        tracing::debug!(entity_id, session = self.last_session, "Group list requested");

        Ok(Some(ticket))
    }

    /// Apply a group-list response. Returns whether it was applied.
    ///
    /// Responses for a session that is no longer pending are dropped so one
    /// creator's memberships never seed another creator's dialog.
    pub fn complete_membership(
        &mut self,
        ticket: MembershipTicket,
        result: std::result::Result<Vec<GroupRecord>, ApiError>,
    ) -> bool {
        match &self.membership {
            MembershipPhase::Loading(pending) if *pending == ticket => {}
            _ => {
                tracing::warn!(
                    entity_id = ticket.entity_id,
                    session = ticket.session.0,
                    "Discarding stale group list"
                );
                return false;
            }
        }

        match result {
            Ok(groups) => self.on_session_open(ticket, groups),
            Err(err) => {
                let error = FlowError::from(err);
                tracing::warn!(entity_id = ticket.entity_id, error = %error, "Group list failed");
                self.membership = MembershipPhase::Failed {
                    entity_id: ticket.entity_id,
                    error,
                };
            }
        }
        true
    }

    fn on_session_open(&mut self, ticket: MembershipTicket, groups: Vec<GroupRecord>) {
        let session = MembershipSession::open(ticket, groups, self.page_size);
        tracing::info!(
            entity_id = session.entity_id,
            groups = session.groups.len(),
            selected = session.selection.len(),
            "Membership dialog opened"
        );
        self.membership = MembershipPhase::Open(session);
    }

    fn on_session_close(&mut self) {
        match std::mem::take(&mut self.membership) {
            MembershipPhase::Closed => {}
            MembershipPhase::Loading(ticket) => {
                tracing::debug!(entity_id = ticket.entity_id, "Abandoned pending group list");
            }
            MembershipPhase::Open(session) => {
                tracing::debug!(entity_id = session.entity_id, "Membership dialog closed");
            }
            MembershipPhase::Failed { entity_id, .. } => {
                tracing::debug!(entity_id, "Cleared group list failure");
            }
        }
    }

    /// Close the dialog (or abandon a pending fetch) without submitting.
    ///
    /// Refused while a submit is outstanding, so its outcome always reaches
    /// the operator. Returns whether the dialog was closed.
    pub fn cancel(&mut self) -> bool {
        if self.is_submitting() {
            tracing::warn!("Submit in flight, ignoring cancel");
            return false;
        }
        self.on_session_close();
        true
    }

    /// Flip a group in the open dialog and return the full selection.
    ///
    /// Returns `None` when no dialog is open, the group is not in the table,
    /// or a submit is outstanding.
    pub fn toggle_group(&mut self, group_id: i64) -> Option<Vec<i64>> {
        let session = self.session_mut()?;
        if session.submitter.is_busy() {
            tracing::debug!(group_id, "Selection locked while submitting");
            return None;
        }
        if !session.groups.iter().any(|g| g.group_id == group_id) {
            tracing::warn!(group_id, entity_id = session.entity_id, "Unknown group");
            return None;
        }
        Some(session.selection.toggle(group_id))
    }

    pub fn is_selected(&self, group_id: i64) -> bool {
        self.session().is_some_and(|s| s.is_selected(group_id))
    }

    pub fn set_page(&mut self, page: usize) {
        if let Some(session) = self.session_mut() {
            session.set_page(page);
        }
    }

    pub fn next_page(&mut self) {
        if let Some(session) = self.session_mut() {
            let page = session.page + 1;
            session.set_page(page);
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(session) = self.session_mut() {
            let page = session.page.saturating_sub(1);
            session.set_page(page);
        }
    }

    /// Change the table ordering. Returns to the first page.
    pub fn set_sort(&mut self, key: GroupSortKey, order: SortOrder) {
        if let Some(session) = self.session_mut() {
            session.sort_key = key;
            session.order = order;
            session.page = 0;
        }
    }

    // =========================================================================
    // Submit
    // =========================================================================

    /// Start submitting the open dialog's selection.
    ///
    /// Returns `None` when no dialog is open or a submit is already outstanding.
    pub fn begin_submit(&mut self) -> Option<(SubmitTicket, SubmissionPayload)> {
        let session = self.session_mut()?;
        let payload = session.submitter.begin(session.entity_id, &session.selection)?;
        tracing::debug!(
            entity_id = payload.entity_id,
            groups = payload.group_ids.len(),
            "Submit started"
        );
        Some((SubmitTicket { session: session.id }, payload))
    }

    /// Apply a submit response.
    ///
    /// On success the dialog closes and its session is discarded. On failure
    /// the dialog stays open with its selection intact. Returns `None` if the
    /// session the submit belonged to is gone.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: std::result::Result<SubmitResponse, ApiError>,
    ) -> Option<SubmitOutcome> {
        let session = match self.session_mut() {
            Some(session) if session.id == ticket.session => session,
            _ => {
                tracing::warn!(session = ticket.session.0, "Discarding submit result for closed dialog");
                return None;
            }
        };

        let entity_id = session.entity_id;
        let outcome = session.submitter.finish(result);
        match &outcome {
            SubmitOutcome::Accepted { message } => {
                tracing::info!(entity_id, "Subscription groups saved");
                self.notice = Some(Notice {
                    kind: NoticeKind::Success,
                    message: message.clone(),
                });
                self.on_session_close();
            }
            SubmitOutcome::Rejected(err) => {
                tracing::warn!(entity_id, error = %err, "Subscription submit failed");
                self.notice = Some(Notice {
                    kind: NoticeKind::Failure,
                    message: err.to_string(),
                });
            }
        }
        Some(outcome)
    }

    // =========================================================================
    // Read side
    // =========================================================================

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Results of the last successful search, in server order.
    pub fn results(&self) -> &[SearchResultRecord] {
        &self.results
    }

    pub fn membership(&self) -> &MembershipPhase {
        &self.membership
    }

    pub fn session(&self) -> Option<&MembershipSession> {
        match &self.membership {
            MembershipPhase::Open(session) => Some(session),
            _ => None,
        }
    }

    fn session_mut(&mut self) -> Option<&mut MembershipSession> {
        match &mut self.membership {
            MembershipPhase::Open(session) => Some(session),
            _ => None,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_searching(&self) -> bool {
        self.state == SearchState::Searching
    }

    pub fn is_loading_membership(&self) -> bool {
        matches!(self.membership, MembershipPhase::Loading(_))
    }

    pub fn is_submitting(&self) -> bool {
        self.session().is_some_and(|s| s.submitter.is_busy())
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }
}
