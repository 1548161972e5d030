//! Conversion of query failures into GraphQL errors.
//!
//! Every resolver error carries an `extensions.code`: `BAD_USER_INPUT` for
//! problems with the request itself, `INTERNAL_SERVER_ERROR` for store
//! failures.

use async_graphql::ErrorExtensions;
use elarocks_core::FetchError;

/// Extension code for invalid client input.
pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";

/// Extension code for store failures.
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

/// The extension code for a fetch failure.
pub const fn error_code(error: &FetchError) -> &'static str {
    match error {
        FetchError::UnknownNodeType(_)
        | FetchError::InvalidTime(_)
        | FetchError::InvalidCursor(_) => BAD_USER_INPUT,
        FetchError::Index(_) | FetchError::Cache(_) => INTERNAL_SERVER_ERROR,
    }
}

/// Convert a fetch failure into a GraphQL error, logging store failures.
pub fn to_graphql_error(error: FetchError) -> async_graphql::Error {
    let code = error_code(&error);
    if code == INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "Event query failed");
    } else {
        tracing::debug!(error = %error, "Rejected event query");
    }
    async_graphql::Error::new(error.to_string()).extend_with(|_, ext| ext.set("code", code))
}

#[cfg(test)]
mod tests {
    use elarocks_types::UnknownNodeType;

    use super::*;

    #[test]
    fn classifies_errors() {
        assert_eq!(
            error_code(&FetchError::from(UnknownNodeType("x".to_owned()))),
            BAD_USER_INPUT
        );
        assert_eq!(
            error_code(&FetchError::InvalidCursor("x".to_owned())),
            BAD_USER_INPUT
        );
        assert_eq!(
            error_code(&FetchError::Cache("down".to_owned())),
            INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn keeps_the_message() {
        let err = to_graphql_error(FetchError::InvalidTime("soon".to_owned()));
        assert_eq!(err.message, "invalid time window: soon");
        assert!(err.extensions.is_some());
    }
}
