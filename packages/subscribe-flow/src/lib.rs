//! # Subscribe Flow
//!
//! Search for a creator by name, then assign that creator's subscription to
//! any number of existing groups through a confirmation dialog.
//!
//! ## Pieces
//!
//! - [`sort`] - stable ordering and pagination for the group table
//! - [`selection`] - the per-dialog group selection, seeded once from the
//!   server's membership snapshot
//! - [`search`] - the search / dialog / submit state machine
//! - [`submit`] - payload assembly and the single-flight confirm guard
//! - [`controller`] - async driver issuing the three round trips
//!   (search, group list, submit) against a [`subscribe_client::SubscribeApi`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use subscribe_client::SubscribeClient;
//! use subscribe_flow::SubscribeController;
//!
//! let controller = SubscribeController::new(SubscribeClient::new(api_url));
//! controller.search("alice").await?;
//! controller.open_membership(42).await?;
//! controller.toggle_group(7);
//! let outcome = controller.confirm().await;
//! ```

pub mod controller;
pub mod error;
pub mod search;
pub mod selection;
pub mod sort;
pub mod submit;
pub mod view;

pub use controller::SubscribeController;
pub use error::{FailureKind, FlowError, Result};
pub use search::{
    GroupRow, MembershipPhase, MembershipSession, Notice, NoticeKind, SearchState, SearchWorkflow,
    DEFAULT_PAGE_SIZE,
};
pub use selection::{MembershipSelectionEngine, SelectionDiff};
pub use sort::{GroupSortKey, SortOrder};
pub use submit::{build_payload, SubmitOutcome, SubscriptionSubmitter};
pub use view::{DialogView, MembershipView, WorkflowView};
