//! Client-side CRUD front-end core for the todo and blog collections.
//!
//! Every mutation goes to the REST backend and is followed by a full reload of the list;
//! the client never patches its view or holds records beyond one render pass.

pub mod controller;
pub mod error;
pub mod flow;
pub mod kind;
pub mod render;
pub mod store;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

pub use controller::{
    ActionOutcome, ClickTarget, ControllerContext, DocumentView, ItemListController, UserPrompts,
};
pub use error::{ApiBaseError, FlowError, StoreError};
pub use flow::{EditForm, FlowState};
pub use kind::{BlogKind, KindDescriptor, ListRecord, Locale, RecordKind, TodoKind};
pub use render::{Fragment, RenderOptions, ViewState};
pub use store::{check_health, HttpStore, RemoteStore, DEFAULT_API_BASE};
