//! Shared application state for the GraphQL server.

use crate::schema::EventSchema;

/// State shared by every request handler.
///
/// The schema already carries the store handles, so this is all a handler
/// needs.
#[derive(Clone)]
pub struct AppState {
    /// The executable schema.
    pub schema: EventSchema,
}

impl AppState {
    /// Wrap a built schema.
    pub const fn new(schema: EventSchema) -> Self {
        Self { schema }
    }
}
