//! Testing utilities including a mock API implementation.
//!
//! [`MockSubscribeApi`] answers from canned responses and records every call.
//! Individual responses can be held back with a gate so tests control exactly
//! when each round trip resolves.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

use crate::error::{ApiError, Result};
use crate::types::{GroupRecord, SearchResultRecord, SubmissionPayload, SubmitResponse};
use crate::SubscribeApi;

/// Record of a call made to the mock API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search { name: String },
    FetchGroupList { entity_id: i64 },
    Submit { payload: SubmissionPayload },
}

#[derive(Default)]
struct MockState {
    searches: HashMap<String, Result<Vec<SearchResultRecord>>>,
    groups: HashMap<i64, Result<Vec<GroupRecord>>>,
    submits: VecDeque<Result<SubmitResponse>>,
    search_gates: HashMap<String, VecDeque<oneshot::Receiver<()>>>,
    group_gates: HashMap<i64, VecDeque<oneshot::Receiver<()>>>,
    submit_gates: VecDeque<oneshot::Receiver<()>>,
    calls: Vec<MockCall>,
}

/// A mock subscription API for testing.
#[derive(Clone, Default)]
pub struct MockSubscribeApi {
    state: Arc<Mutex<MockState>>,
}

impl MockSubscribeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Answer searches for `name` with `records`.
    pub fn with_search(self, name: impl Into<String>, records: Vec<SearchResultRecord>) -> Self {
        self.lock().searches.insert(name.into(), Ok(records));
        self
    }

    /// Fail searches for `name` with `err`.
    pub fn with_search_error(self, name: impl Into<String>, err: ApiError) -> Self {
        self.lock().searches.insert(name.into(), Err(err));
        self
    }

    /// Answer group-list fetches for `entity_id` with `groups`.
    pub fn with_groups(self, entity_id: i64, groups: Vec<GroupRecord>) -> Self {
        self.lock().groups.insert(entity_id, Ok(groups));
        self
    }

    /// Fail group-list fetches for `entity_id` with `err`.
    pub fn with_groups_error(self, entity_id: i64, err: ApiError) -> Self {
        self.lock().groups.insert(entity_id, Err(err));
        self
    }

    /// Queue the response for the next submit. Unqueued submits succeed.
    pub fn with_submit_response(self, response: Result<SubmitResponse>) -> Self {
        self.lock().submits.push_back(response);
        self
    }

    /// Hold the next search for `name` until the returned sender fires (or drops).
    pub fn hold_search(&self, name: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock()
            .search_gates
            .entry(name.into())
            .or_default()
            .push_back(rx);
        tx
    }

    /// Hold the next group-list fetch for `entity_id` until the returned sender fires.
    pub fn hold_groups(&self, entity_id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock()
            .group_gates
            .entry(entity_id)
            .or_default()
            .push_back(rx);
        tx
    }

    /// Hold the next submit until the returned sender fires.
    pub fn hold_submit(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.lock().submit_gates.push_back(rx);
        tx
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Submitted payloads, in order.
    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Submit { payload } => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }
}

async fn pass(gate: Option<oneshot::Receiver<()>>) {
    if let Some(rx) = gate {
        let _ = rx.await;
    }
}

#[async_trait]
impl SubscribeApi for MockSubscribeApi {
    async fn search(&self, name: &str) -> Result<Vec<SearchResultRecord>> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(MockCall::Search {
                name: name.to_string(),
            });
            let gate = state
                .search_gates
                .get_mut(name)
                .and_then(|gates| gates.pop_front());
            gate
        };
        pass(gate).await;

        self.lock()
            .searches
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_group_list(&self, entity_id: i64) -> Result<Vec<GroupRecord>> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(MockCall::FetchGroupList { entity_id });
            let gate = state
                .group_gates
                .get_mut(&entity_id)
                .and_then(|gates| gates.pop_front());
            gate
        };
        pass(gate).await;

        self.lock()
            .groups
            .get(&entity_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_subscription(&self, payload: &SubmissionPayload) -> Result<SubmitResponse> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(MockCall::Submit {
                payload: payload.clone(),
            });
            let gate = state.submit_gates.pop_front();
            gate
        };
        pass(gate).await;

        self.lock().submits.pop_front().unwrap_or_else(|| {
            Ok(SubmitResponse {
                code: crate::SUCCESS_CODE,
                msg: "ok".to_string(),
            })
        })
    }
}
