//! Turn search hits into typed Sysmon records.
//!
//! Winlogbeat keeps the Sysmon event body in `_source.message` as lines of
//! `Key: Value`. Each known key maps to a record field; everything else is
//! ignored. The record is then decoded through the same lenient
//! deserializers the API reads with, so `ProcessId: 4242` becomes a number
//! and `Hashes` a list.

use chrono::{DateTime, Utc};
use elarocks_types::{NodeType, SysmonEvent, parse_utc_time};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::IngestError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Hits,
}

#[derive(Debug, Deserialize)]
struct Hits {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Source,
}

#[derive(Debug, Default, Deserialize)]
struct Source {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    agent: Option<Agent>,
    #[serde(rename = "@timestamp", default)]
    timestamp: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Agent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// A record parsed from one hit, with the time its key is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    /// The decoded record.
    pub event: SysmonEvent,
    /// `UtcTime` from the message, or the hit's `@timestamp`.
    pub time: DateTime<Utc>,
}

/// Record field for a Sysmon message key.
fn field_for(key: &str) -> Option<&'static str> {
    Some(match key {
        "UtcTime" => "utc_time",
        "ProcessGuid" => "process_guid",
        "ProcessId" => "process_id",
        "Image" => "image",
        "User" => "user",
        "EventType" => "event_type",
        "TargetObject" => "target_object",
        "Details" => "details",
        "FileVersion" => "file_version",
        "Description" => "description",
        "Product" => "product",
        "Company" => "company",
        "OriginalFileName" => "original_file_name",
        "CommandLine" => "command_line",
        "CurrentDirectory" => "current_directory",
        "LogonGuid" => "logon_guid",
        "LogonId" => "logon_id",
        "TerminalSessionId" => "terminal_session_id",
        "IntegrityLevel" => "integrity_level",
        "Hashes" => "hashes",
        "ParentProcessGuid" => "parent_process_guid",
        "ParentProcessId" => "parent_process_id",
        "ParentImage" => "parent_image",
        "ParentCommandLine" => "parent_command_line",
        "ParentUser" => "parent_user",
        "Protocol" => "protocol",
        "Initiated" => "initiated",
        "SourceIsIpv6" => "source_is_ipv6",
        "SourceIp" => "source_ip",
        "SourceHostname" => "source_hostname",
        "SourcePort" => "source_port",
        "SourcePortName" => "source_port_name",
        "DestinationIsIpv6" => "destination_is_ipv6",
        "DestinationIp" => "destination_ip",
        "DestinationHostname" => "destination_hostname",
        "DestinationPort" => "destination_port",
        "DestinationPortName" => "destination_port_name",
        _ => return None,
    })
}

/// Map a message body to a JSON payload of record fields.
///
/// Lines are split at the first colon; both halves are trimmed. Lines
/// without a colon and unknown keys are skipped.
pub fn message_fields(message: &str) -> Map<String, Value> {
    message
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(key, value)| {
            field_for(key.trim()).map(|field| (field.to_owned(), Value::from(value.trim())))
        })
        .collect()
}

/// Parse every hit of a search response as a `node_type` record.
///
/// Hits without a message are skipped, as are hits with no usable time or
/// a body that does not decode as `node_type`.
///
/// # Errors
///
/// Returns [`IngestError::Response`] if the response has no `hits.hits`.
pub fn parse_hits(node_type: NodeType, response: Value) -> Result<Vec<ParsedEvent>, IngestError> {
    let response: SearchResponse = serde_json::from_value(response)?;
    let total = response.hits.hits.len();

    let events: Vec<ParsedEvent> = response
        .hits
        .hits
        .into_iter()
        .filter_map(|hit| parse_source(node_type, hit.source))
        .collect();

    tracing::debug!(
        node_type = %node_type,
        hits = total,
        parsed = events.len(),
        "Parsed search hits"
    );
    Ok(events)
}

fn parse_source(node_type: NodeType, source: Source) -> Option<ParsedEvent> {
    let message = source.message?;
    let mut payload = message_fields(&message);

    payload.insert("event_action".to_owned(), Value::from(node_type.label()));
    if let Some(agent) = source.agent {
        if let Some(name) = agent.name {
            payload.insert("agent_name".to_owned(), Value::from(name));
        }
        if let Some(id) = agent.id {
            payload.insert("agent_id".to_owned(), Value::from(id));
        }
    }

    let time = payload
        .get("utc_time")
        .and_then(Value::as_str)
        .and_then(parse_utc_time)
        .or_else(|| {
            source
                .timestamp
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc))
        });
    let Some(time) = time else {
        tracing::warn!(node_type = %node_type, "Skipping hit without a usable time");
        return None;
    };

    match SysmonEvent::decode(node_type, Value::Object(payload)) {
        Ok(event) => Some(ParsedEvent { event, time }),
        Err(e) => {
            tracing::warn!(node_type = %node_type, error = %e, "Skipping undecodable hit");
            None
        }
    }
}
