//! GraphQL output wrappers: typed result pages and the `eventList`
//! connection.

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::events::{
    NetworkConnectionEvent, ProcessCreateEvent, RegistryValueSetEvent, SysmonEvent,
};

/// Result of the `RegValueSetEve` query.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "RegValueSetEveResult")]
pub struct RegistryValueSetPage {
    /// The requested page of events.
    pub node: Vec<RegistryValueSetEvent>,
    /// Number of matching events before paging.
    pub total_count: usize,
}

/// Result of the `ProcessCreateEve` query.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "ProcessCreateEveResult")]
pub struct ProcessCreatePage {
    /// The requested page of events.
    pub node: Vec<ProcessCreateEvent>,
    /// Number of matching events before paging.
    pub total_count: usize,
}

/// Result of the `NetworkConnectionEve` query.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(name = "NetworkConnectionEveResult")]
pub struct NetworkConnectionPage {
    /// The requested page of events.
    pub node: Vec<NetworkConnectionEvent>,
    /// Number of matching events before paging.
    pub total_count: usize,
}

/// A cursor paired with an event.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct EventEdge {
    /// The event's epoch in milliseconds, as a decimal string.
    pub cursor: String,
    /// The event.
    pub node: SysmonEvent,
}

/// Position of the returned window within the full result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PageInfo {
    /// Cursor of the first returned edge.
    pub start_cursor: Option<String>,
    /// Cursor of the last returned edge.
    pub end_cursor: Option<String>,
    /// Whether events exist after the window.
    pub has_next_page: bool,
    /// Whether events exist before the window.
    pub has_previous_page: bool,
}

/// Result of `eventList`.
#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct EventConnection {
    /// The returned window.
    pub edges: Vec<EventEdge>,
    /// Window position.
    pub page_info: PageInfo,
    /// Number of merged events before cursor slicing.
    pub total_count: usize,
}
