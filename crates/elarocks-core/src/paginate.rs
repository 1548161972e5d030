//! Offset and cursor pagination.
//!
//! Typed queries page with `offset`/`limit`. `eventList` pages with Relay
//! style cursors, where a cursor is the epoch (milliseconds) of an event
//! written as a decimal string.

use std::num::ParseIntError;
use std::ops::Range;

use elarocks_types::{CursorPagination, PageInfo, Pagination};

use crate::error::FetchError;

/// Apply `offset`/`limit` to an already filtered list.
///
/// A missing offset means 0. A missing limit, or a limit of 0, means
/// `default_limit`.
pub fn slice_offset<T>(items: Vec<T>, pagination: Option<&Pagination>, default_limit: u32) -> Vec<T> {
    let offset = pagination.and_then(|p| p.offset).unwrap_or(0);
    let limit = pagination
        .and_then(|p| p.limit)
        .filter(|limit| *limit != 0)
        .unwrap_or(default_limit);

    items
        .into_iter()
        .skip(to_usize(offset))
        .take(to_usize(limit))
        .collect()
}

/// Parse a cursor string into an epoch.
///
/// # Errors
///
/// Returns [`FetchError::InvalidCursor`] if `cursor` is not a decimal
/// integer.
pub fn parse_cursor(cursor: &str) -> Result<i64, FetchError> {
    cursor
        .trim()
        .parse()
        .map_err(|e: ParseIntError| FetchError::InvalidCursor(format!("{cursor} ({e})")))
}

/// Render an epoch as a cursor.
pub fn encode_cursor(epoch: i64) -> String {
    epoch.to_string()
}

/// Work out which slice of `epochs` (sorted ascending) a cursor request
/// selects.
///
/// `after` starts just past the first matching epoch, or at 0 when nothing
/// matches. `before` stops at the first matching epoch, or at the end when
/// nothing matches. `first` then keeps the head of that slice and `last`
/// its tail.
///
/// # Errors
///
/// Returns [`FetchError::InvalidCursor`] if a cursor does not parse.
pub fn cursor_window(
    epochs: &[i64],
    pagination: &CursorPagination,
) -> Result<Range<usize>, FetchError> {
    let len = epochs.len();

    let mut start = match pagination.after.as_deref() {
        Some(after) => {
            let after = parse_cursor(after)?;
            epochs
                .iter()
                .position(|epoch| *epoch == after)
                .map_or(0, |i| i.saturating_add(1))
        }
        None => 0,
    };

    let mut end = match pagination.before.as_deref() {
        Some(before) => {
            let before = parse_cursor(before)?;
            epochs
                .iter()
                .position(|epoch| *epoch == before)
                .unwrap_or(len)
        }
        None => len,
    };
    end = end.max(start);

    if let Some(first) = pagination.first {
        end = end.min(start.saturating_add(to_usize(first)));
    }
    if let Some(last) = pagination.last {
        start = start.max(end.saturating_sub(to_usize(last)));
    }

    Ok(start..end)
}

/// Page metadata for `window` out of `epochs`.
pub fn page_info(epochs: &[i64], window: &Range<usize>) -> PageInfo {
    let cursor_at = |i: usize| epochs.get(i).copied().map(encode_cursor);

    PageInfo {
        start_cursor: if window.is_empty() {
            None
        } else {
            cursor_at(window.start)
        },
        end_cursor: window
            .end
            .checked_sub(1)
            .filter(|_| !window.is_empty())
            .and_then(cursor_at),
        has_next_page: window.end < epochs.len(),
        has_previous_page: window.start > 0,
    }
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
