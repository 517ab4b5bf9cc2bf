//! Built-in sample configuration, used when no configuration has been
//! persisted yet (first run / fresh install).

use crate::aggregation::{Aggregation, AggregationGroups};
use crate::node::{HostChoice, Node, NodeAction, NodeSearch, SearchConditions};
use crate::pack::{PackConfig, PacksConfig};
use crate::rule::Rule;

fn call(rule_id: &str) -> Node {
    Node::new(NodeAction::CallARule {
        rule_id: rule_id.to_string(),
        arguments: vec!["$HOSTNAME$".to_string()],
    })
}

fn service(pattern: &str) -> Node {
    Node::new(NodeAction::StateOfService {
        host_pattern: "$HOSTNAME$".to_string(),
        service_pattern: pattern.to_string(),
    })
}

/// A `default` pack with one host-tree aggregation over all hosts.
pub fn sample_config() -> PacksConfig {
    let general = Rule::new("general", "General State")
        .with_params(&["HOSTNAME"])
        .with_nodes(vec![
            Node::new(NodeAction::StateOfHost {
                host_pattern: "$HOSTNAME$".to_string(),
            }),
            service("Uptime"),
        ]);

    let networking = Rule::new("networking", "Networking")
        .with_params(&["HOSTNAME"])
        .with_nodes(vec![service("NFS|Interface|TCP")]);

    let applications = Rule::new("applications", "Applications")
        .with_params(&["HOSTNAME"])
        .with_nodes(vec![service("ASM|ORACLE|proc")]);

    let other = Rule::new("other", "Other")
        .with_params(&["HOSTNAME"])
        .with_nodes(vec![Node::new(NodeAction::StateOfRemainingServices {
            host_pattern: "$HOSTNAME$".to_string(),
        })]);

    let host = Rule::new("host", "Host $HOSTNAME$")
        .with_params(&["HOSTNAME"])
        .with_nodes(vec![
            call("general"),
            call("networking"),
            call("applications"),
            call("other"),
        ]);

    let mut default_aggregation = Aggregation::new(
        "default_aggregation",
        Node {
            action: NodeAction::CallARule {
                rule_id: "host".to_string(),
                arguments: vec!["$HOSTNAME$".to_string()],
            },
            search: NodeSearch::Host {
                conditions: SearchConditions {
                    host_choice: HostChoice::AllHosts,
                },
            },
        },
    );
    default_aggregation.groups = AggregationGroups {
        names: vec!["Hosts".to_string()],
        paths: Vec::new(),
    };

    PacksConfig {
        packs: vec![PackConfig {
            id: "default".to_string(),
            title: "Default Pack".to_string(),
            comment: String::new(),
            contact_groups: Vec::new(),
            public: true,
            rules: vec![general, networking, applications, other, host],
            aggregations: vec![default_aggregation],
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn sample_call_edges_resolve() {
        let config = sample_config();
        let pack = &config.packs[0];

        let rule_ids: BTreeSet<&str> = pack.rules.iter().map(|r| r.id.as_str()).collect();
        for rule in &pack.rules {
            for node in &rule.nodes {
                if let Some(called) = node.action.called_rule_id() {
                    assert!(rule_ids.contains(called), "dangling call to {called}");
                }
            }
        }
        for aggregation in &pack.aggregations {
            if let Some(called) = aggregation.node.action.called_rule_id() {
                assert!(rule_ids.contains(called));
            }
        }
    }

    #[test]
    fn sample_round_trips_through_json() {
        let config = sample_config();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: PacksConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
