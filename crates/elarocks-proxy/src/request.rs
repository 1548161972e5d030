//! The request body posted by the web front end.

use std::fmt;

use elarocks_types::NodeType;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::ProxyError;

/// Name of the union query option.
pub const EVENT_LIST_OPTION: &str = "eventList";

/// Form state sent to `POST /api/gql`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRequest {
    /// Window start as typed into the form.
    #[validate(length(min = 1, message = "startTime must not be empty"))]
    pub start_time: String,

    /// Window end as typed into the form.
    #[validate(length(min = 1, message = "endTime must not be empty"))]
    pub end_time: String,

    /// Page size.
    #[validate(range(min = 1, message = "perPage must be at least 1"))]
    pub per_page: u32,

    /// Cursor to page backwards from (`eventList` only).
    #[serde(default)]
    pub before: Option<String>,

    /// Which query to run.
    #[validate(custom(function = "validate_option"))]
    pub selected_option: String,
}

impl ProxyRequest {
    /// Validate the body and resolve the selected query.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnknownOption`] if `selectedOption` names no
    /// query, or [`ProxyError::InvalidRequest`] for any other rule.
    pub fn check(&self) -> Result<QueryOption, ProxyError> {
        let option = QueryOption::parse(&self.selected_option)?;
        self.validate()
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;
        Ok(option)
    }

    /// The `before` cursor, with blank values treated as absent.
    pub fn before_cursor(&self) -> Option<&str> {
        self.before
            .as_deref()
            .map(str::trim)
            .filter(|cursor| !cursor.is_empty())
    }
}

/// A query the proxy knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOption {
    /// One of the typed event queries.
    Typed(NodeType),
    /// The `eventList` union query.
    EventList,
}

impl QueryOption {
    /// Resolve a `selectedOption` value.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::UnknownOption`] if `name` is not a query field.
    pub fn parse(name: &str) -> Result<Self, ProxyError> {
        if name == EVENT_LIST_OPTION {
            return Ok(Self::EventList);
        }
        NodeType::from_graphql_name(name)
            .map(Self::Typed)
            .ok_or_else(|| ProxyError::UnknownOption(name.to_owned()))
    }

    /// The GraphQL field this option queries.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Typed(node_type) => node_type.graphql_name(),
            Self::EventList => EVENT_LIST_OPTION,
        }
    }
}

impl fmt::Display for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

fn validate_option(value: &str) -> Result<(), ValidationError> {
    QueryOption::parse(value)
        .map(|_| ())
        .map_err(|e: ProxyError| {
            ValidationError::new("unknown_query_option").with_message(e.to_string().into())
        })
}
