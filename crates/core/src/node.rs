//! Node types shared by rules and aggregations.
//!
//! A node is one evaluation step: an action (what to compute or which rule
//! to call) plus an optional search (which hosts/services to iterate).

use serde::{Deserialize, Serialize};

/// One evaluation step in a rule or aggregation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    pub action: NodeAction,
    #[serde(default)]
    pub search: NodeSearch,
}

impl Node {
    /// Node with the given action and no search.
    pub fn new(action: NodeAction) -> Self {
        Self {
            action,
            search: NodeSearch::Empty,
        }
    }
}

/// The action carried by a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeAction {
    /// Delegate evaluation to another rule, passing arguments.
    CallARule {
        rule_id: String,
        #[serde(default)]
        arguments: Vec<String>,
    },
    /// State of a single host.
    StateOfHost { host_pattern: String },
    /// State of one service on a host.
    StateOfService {
        host_pattern: String,
        service_pattern: String,
    },
    /// State of all services on a host not covered by other nodes.
    StateOfRemainingServices { host_pattern: String },
}

impl NodeAction {
    /// The rule ID this action calls, if it is a call-a-rule action.
    pub fn called_rule_id(&self) -> Option<&str> {
        match self {
            NodeAction::CallARule { rule_id, .. } => Some(rule_id.as_str()),
            _ => None,
        }
    }
}

/// Host/service selection attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSearch {
    /// No search: the node applies as-is.
    #[default]
    Empty,
    /// Iterate matching hosts.
    Host { conditions: SearchConditions },
    /// Iterate matching services.
    Service {
        conditions: SearchConditions,
        service_pattern: String,
    },
}

impl NodeSearch {
    /// The host selection of this search, if any.
    pub fn host_choice(&self) -> Option<&HostChoice> {
        match self {
            NodeSearch::Empty => None,
            NodeSearch::Host { conditions } | NodeSearch::Service { conditions, .. } => {
                Some(&conditions.host_choice)
            }
        }
    }
}

/// Conditions restricting a host/service search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConditions {
    pub host_choice: HostChoice,
}

/// How a search selects hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostChoice {
    AllHosts,
    HostNameRegex { pattern: String },
    HostAliasRegex { pattern: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_a_rule_serialized_form() {
        let node = Node::new(NodeAction::CallARule {
            rule_id: "networking".to_string(),
            arguments: vec!["$HOSTNAME$".to_string()],
        });

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["action"]["type"], "call_a_rule");
        assert_eq!(json["action"]["rule_id"], "networking");
        assert_eq!(json["search"]["type"], "empty");
    }

    #[test]
    fn state_action_round_trip() {
        let node = Node {
            action: NodeAction::StateOfService {
                host_pattern: "$HOSTNAME$".to_string(),
                service_pattern: "Interface .*".to_string(),
            },
            search: NodeSearch::Host {
                conditions: SearchConditions {
                    host_choice: HostChoice::HostNameRegex {
                        pattern: "lnx.*".to_string(),
                    },
                },
            },
        };

        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn missing_search_defaults_to_empty() {
        let node: Node = serde_json::from_str(
            r#"{"action": {"type": "state_of_host", "host_pattern": "web01"}}"#,
        )
        .unwrap();
        assert_eq!(node.search, NodeSearch::Empty);
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let result: Result<Node, _> = serde_json::from_str(
            r#"{"action": {"type": "state_of_cluster", "host_pattern": "web01"}}"#,
        );
        assert!(result.is_err());
    }
}
