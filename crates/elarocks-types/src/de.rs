//! Lenient deserializers for cached event payloads.
//!
//! Older payloads were loaded from tab-separated exports where every column
//! is a string, so `process_id` may arrive as `"4242"` and `initiated` as
//! `"true"`. Newer payloads carry native JSON numbers and booleans. Both
//! forms decode to the same typed record.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NativeOrText<T> {
    Native(T),
    Text(String),
}

/// Decode an optional value given either natively or as a string.
///
/// Blank strings decode to `None`.
pub fn native_or_text<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    match Option::<NativeOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NativeOrText::Native(v)) => Ok(Some(v)),
        Some(NativeOrText::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(None)
            } else {
                s.parse().map(Some).map_err(de::Error::custom)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrJoined {
    List(Vec<String>),
    Joined(String),
}

/// Decode a list given either as a JSON array or as a comma-joined string.
///
/// `"SHA1=AB,MD5=CD"` becomes `["SHA1=AB", "MD5=CD"]`. Empty segments are
/// dropped and `null` decodes to an empty list.
pub fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<ListOrJoined>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(ListOrJoined::List(items)) => items,
        Some(ListOrJoined::Joined(s)) => split_comma_list(&s),
    })
}

/// Split a comma-joined list, trimming entries and dropping empty ones.
pub fn split_comma_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
