//! In-memory predicates over decoded events.
//!
//! A [`FilterSet`] is built once per request from the optional fields of an
//! [`EventFilter`]. Blank strings and a zero process id count as "not set",
//! matching how the web front end sends empty form fields.

use elarocks_types::{EventFilter, SysmonEvent};

/// A single predicate over an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The event's process id equals this value.
    ProcessId(u32),
    /// The event's user equals this value.
    User(String),
    /// The event's agent id contains this substring.
    AgentIdContains(String),
}

impl Predicate {
    /// Whether `event` satisfies the predicate.
    pub fn matches(&self, event: &SysmonEvent) -> bool {
        match self {
            Self::ProcessId(pid) => event.process_id() == Some(*pid),
            Self::User(user) => event.user() == Some(user.as_str()),
            Self::AgentIdContains(needle) => event
                .agent_id()
                .is_some_and(|agent_id| agent_id.contains(needle.as_str())),
        }
    }
}

/// All predicates of one request, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    /// Build the predicate list from a request filter.
    pub fn from_filter(filter: &EventFilter) -> Self {
        let mut predicates = Vec::new();

        if let Some(pid) = filter.process_id.filter(|pid| *pid != 0) {
            predicates.push(Predicate::ProcessId(pid));
        }
        if let Some(user) = filter.user.as_deref().filter(|u| !u.is_empty()) {
            predicates.push(Predicate::User(user.to_owned()));
        }
        if let Some(agent_id) = filter.agent_id.as_deref().filter(|a| !a.is_empty()) {
            predicates.push(Predicate::AgentIdContains(agent_id.to_owned()));
        }

        Self { predicates }
    }

    /// Whether every predicate holds for `event`.
    pub fn matches(&self, event: &SysmonEvent) -> bool {
        self.predicates.iter().all(|p| p.matches(event))
    }

    /// The predicates in evaluation order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether no predicate is set.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}
