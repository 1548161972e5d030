//! GraphQL documents for each query option, rendered with `minijinja`.
//!
//! The selected query name is validated against [`QueryOption`] before it
//! reaches a template, so only known field names are ever interpolated.
//! Everything else travels as GraphQL variables.

use elarocks_types::NodeType;
use minijinja::{Environment, context};
use serde::Serialize;

use crate::error::ProxyError;
use crate::request::{ProxyRequest, QueryOption};

const TYPED_TEMPLATE: &str = r"query {{ operation }}($start: String!, $end: String!, $limit: Int) {
  {{ field }}(
    filter: { datetime: { start: $start, end: $end } }
    pagination: { offset: 0, limit: $limit }
  ) {
    totalCount
    node {
{%- for name in fields %}
      {{ name }}
{%- endfor %}
    }
  }
}
";

const EVENT_LIST_TEMPLATE: &str = r"query {{ operation }}($start: String!, $end: String!, $last: Int, $before: String) {
  eventList(
    filter: { datetime: { start: $start, end: $end } }
    pagination: { last: $last, before: $before }
  ) {
    totalCount
    pageInfo {
      startCursor
      endCursor
      hasNextPage
      hasPreviousPage
    }
    edges {
      cursor
      node {
        __typename
{%- for member in members %}
        ... on {{ member.name }} {
{%- for name in member.fields %}
          {{ name }}
{%- endfor %}
        }
{%- endfor %}
      }
    }
  }
}
";

const REGISTRY_VALUE_SET_FIELDS: &[&str] = &[
    "agent_name",
    "agent_id",
    "event_action",
    "utc_time",
    "event_type",
    "process_guid",
    "process_id",
    "image",
    "target_object",
    "details",
    "user",
];

const PROCESS_CREATE_FIELDS: &[&str] = &[
    "agent_name",
    "agent_id",
    "event_action",
    "utc_time",
    "process_guid",
    "process_id",
    "image",
    "file_version",
    "description",
    "product",
    "company",
    "original_file_name",
    "command_line",
    "current_directory",
    "user",
    "logon_guid",
    "logon_id",
    "terminal_session_id",
    "integrity_level",
    "hashes",
    "parent_process_guid",
    "parent_process_id",
    "parent_image",
    "parent_command_line",
    "parent_user",
];

const NETWORK_CONNECTION_FIELDS: &[&str] = &[
    "agent_name",
    "agent_id",
    "event_action",
    "utc_time",
    "process_guid",
    "process_id",
    "image",
    "user",
    "protocol",
    "initiated",
    "source_is_ipv6",
    "source_ip",
    "source_hostname",
    "source_port",
    "source_port_name",
    "destination_is_ipv6",
    "destination_ip",
    "destination_hostname",
    "destination_port",
    "destination_port_name",
];

/// Fields selected for each event type.
pub const fn selection(node_type: NodeType) -> &'static [&'static str] {
    match node_type {
        NodeType::RegistryValueSet => REGISTRY_VALUE_SET_FIELDS,
        NodeType::ProcessCreate => PROCESS_CREATE_FIELDS,
        NodeType::NetworkConnection => NETWORK_CONNECTION_FIELDS,
    }
}

/// A request body for the GraphQL server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphqlQuery {
    /// The query document.
    pub query: String,
    /// Variables referenced by the document.
    pub variables: serde_json::Value,
}

#[derive(Serialize)]
struct UnionMember {
    name: &'static str,
    fields: &'static [&'static str],
}

/// Renders query documents from form state.
#[derive(Debug)]
pub struct QueryBuilder {
    env: Environment<'static>,
}

impl QueryBuilder {
    /// Load the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Template`] if a template fails to parse.
    pub fn new() -> Result<Self, ProxyError> {
        let mut env = Environment::new();
        env.add_template("typed", TYPED_TEMPLATE)
            .map_err(|e| ProxyError::Template(format!("failed to add typed template: {e}")))?;
        env.add_template("event_list", EVENT_LIST_TEMPLATE).map_err(|e| {
            ProxyError::Template(format!("failed to add event_list template: {e}"))
        })?;
        Ok(Self { env })
    }

    /// Build the GraphQL request for `option`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Template`] if rendering fails.
    pub fn build(
        &self,
        option: QueryOption,
        request: &ProxyRequest,
    ) -> Result<GraphqlQuery, ProxyError> {
        let operation = format!("get{option}");

        match option {
            QueryOption::Typed(node_type) => {
                let query = self.render(
                    "typed",
                    context! {
                        operation => operation,
                        field => node_type.graphql_name(),
                        fields => selection(node_type),
                    },
                )?;
                Ok(GraphqlQuery {
                    query,
                    variables: serde_json::json!({
                        "start": request.start_time,
                        "end": request.end_time,
                        "limit": request.per_page,
                    }),
                })
            }
            QueryOption::EventList => {
                let members: Vec<UnionMember> = NodeType::ALL
                    .iter()
                    .map(|node_type| UnionMember {
                        name: node_type.graphql_name(),
                        fields: selection(*node_type),
                    })
                    .collect();
                let query = self.render(
                    "event_list",
                    context! { operation => operation, members => members },
                )?;
                Ok(GraphqlQuery {
                    query,
                    variables: serde_json::json!({
                        "start": request.start_time,
                        "end": request.end_time,
                        "last": request.per_page,
                        "before": request.before_cursor(),
                    }),
                })
            }
        }
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, ProxyError> {
        self.env
            .get_template(name)
            .map_err(|e| ProxyError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| ProxyError::Template(format!("{name} render failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::collections::BTreeSet;

    use elarocks_types::{NetworkConnectionEvent, ProcessCreateEvent, RegistryValueSetEvent};

    use super::*;

    fn request(option: &str, before: Option<&str>) -> ProxyRequest {
        ProxyRequest {
            start_time: "2023-08-06 15:00:00".to_owned(),
            end_time: "2023-08-06 16:00:00".to_owned(),
            per_page: 20,
            before: before.map(ToOwned::to_owned),
            selected_option: option.to_owned(),
        }
    }

    #[test]
    fn typed_query_uses_offset_paging() {
        let builder = QueryBuilder::new().unwrap();
        let req = request("ProcessCreateEve", None);
        let q = builder.build(req.check().unwrap(), &req).unwrap();

        assert!(q.query.starts_with("query getProcessCreateEve("));
        assert!(q.query.contains("  ProcessCreateEve(\n"));
        assert!(q.query.contains("pagination: { offset: 0, limit: $limit }"));
        assert!(q.query.contains("      hashes\n"));
        assert!(!q.query.contains("target_object"));
        assert_eq!(q.variables["limit"], 20);
        assert_eq!(q.variables["start"], "2023-08-06 15:00:00");
    }

    #[test]
    fn event_list_selects_every_member() {
        let builder = QueryBuilder::new().unwrap();
        let req = request("eventList", Some("1691334000000"));
        let q = builder.build(req.check().unwrap(), &req).unwrap();

        assert!(q.query.contains("eventList("));
        assert!(q.query.contains("... on RegValueSetEve {"));
        assert!(q.query.contains("... on ProcessCreateEve {"));
        assert!(q.query.contains("... on NetworkConnectionEve {"));
        assert!(q.query.contains("hasPreviousPage"));
        assert_eq!(q.variables["last"], 20);
        assert_eq!(q.variables["before"], "1691334000000");
    }

    #[test]
    fn event_list_without_cursor_sends_null() {
        let builder = QueryBuilder::new().unwrap();
        let req = request("eventList", Some(""));
        let q = builder.build(req.check().unwrap(), &req).unwrap();
        assert!(q.variables["before"].is_null());
    }

    fn record_fields(record: serde_json::Value) -> BTreeSet<String> {
        record.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn selections_cover_every_record_field() {
        let records = [
            (
                NodeType::RegistryValueSet,
                serde_json::to_value(RegistryValueSetEvent::default()).unwrap(),
            ),
            (
                NodeType::ProcessCreate,
                serde_json::to_value(ProcessCreateEvent::default()).unwrap(),
            ),
            (
                NodeType::NetworkConnection,
                serde_json::to_value(NetworkConnectionEvent::default()).unwrap(),
            ),
        ];

        for (node_type, record) in records {
            let selected: BTreeSet<String> =
                selection(node_type).iter().map(|f| (*f).to_owned()).collect();
            assert_eq!(selected, record_fields(record), "{node_type}");
        }
    }

    #[test]
    fn network_selection_carries_ipv6_flags() {
        let fields = selection(NodeType::NetworkConnection);
        let position = |name: &str| fields.iter().position(|f| *f == name).unwrap();
        assert_eq!(position("source_is_ipv6"), position("initiated") + 1);
        assert_eq!(position("destination_is_ipv6"), position("source_port_name") + 1);
    }
}
