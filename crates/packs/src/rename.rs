//! Renaming hosts across the BI configuration.
//!
//! A host rename must be propagated into every place a host name can be
//! spelled out: host patterns of state actions, argument lists of
//! call-a-rule actions, and host-name-regex search conditions. Matching is
//! exact string equality, never regex interpretation.

use mirador_core::{BiError, HostChoice, Node, NodeAction, NodeSearch};

use crate::repository::PackRepository;

/// Rename a host everywhere in the configuration.
///
/// Loads the configuration fresh, rewrites all matching patterns and
/// persists the result, but only when at least one rename happened.
/// Returns the number of renames performed.
pub fn rename_host(
    repo: &mut PackRepository,
    oldname: &str,
    newname: &str,
) -> Result<usize, BiError> {
    repo.load_config()?;

    let mut renamed = 0;
    for pack in repo.packs.values_mut() {
        for rule in pack.rules.values_mut() {
            for node in &mut rule.nodes {
                renamed += rename_node(node, oldname, newname);
            }
        }
        for aggregation in pack.aggregations.values_mut() {
            renamed += rename_node(&mut aggregation.node, oldname, newname);
        }
    }

    if renamed > 0 {
        repo.save_config()?;
    }
    Ok(renamed)
}

fn rename_node(node: &mut Node, oldname: &str, newname: &str) -> usize {
    rename_node_action(node, oldname, newname) + rename_node_search(node, oldname, newname)
}

fn rename_node_action(node: &mut Node, oldname: &str, newname: &str) -> usize {
    match &mut node.action {
        NodeAction::StateOfHost { host_pattern }
        | NodeAction::StateOfService { host_pattern, .. }
        | NodeAction::StateOfRemainingServices { host_pattern } => {
            if host_pattern.as_str() == oldname {
                *host_pattern = newname.to_string();
                return 1;
            }
        }
        NodeAction::CallARule { arguments, .. } => {
            // Counts once per node touched, not once per argument.
            if arguments.iter().any(|argument| argument == oldname) {
                for argument in arguments.iter_mut() {
                    if argument == oldname {
                        *argument = newname.to_string();
                    }
                }
                return 1;
            }
        }
    }
    0
}

fn rename_node_search(node: &mut Node, oldname: &str, newname: &str) -> usize {
    match &mut node.search {
        NodeSearch::Host { conditions } | NodeSearch::Service { conditions, .. } => {
            if let HostChoice::HostNameRegex { pattern } = &mut conditions.host_choice {
                if pattern.as_str() == oldname {
                    *pattern = newname.to_string();
                    return 1;
                }
            }
        }
        NodeSearch::Empty => {}
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirador_core::SearchConditions;

    fn call_node(arguments: &[&str]) -> Node {
        Node::new(NodeAction::CallARule {
            rule_id: "host".to_string(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[test]
    fn host_pattern_renamed_on_exact_match() {
        let mut node = Node::new(NodeAction::StateOfHost {
            host_pattern: "web01".to_string(),
        });
        assert_eq!(rename_node(&mut node, "web01", "web02"), 1);
        assert_eq!(
            node.action,
            NodeAction::StateOfHost {
                host_pattern: "web02".to_string()
            }
        );
    }

    #[test]
    fn host_pattern_is_not_regex_matched() {
        let mut node = Node::new(NodeAction::StateOfHost {
            host_pattern: "web.*".to_string(),
        });
        assert_eq!(rename_node(&mut node, "web01", "web02"), 0);
    }

    #[test]
    fn call_arguments_count_once_per_node() {
        let mut node = call_node(&["web01", "other", "web01"]);
        assert_eq!(rename_node(&mut node, "web01", "web02"), 1);
        match &node.action {
            NodeAction::CallARule { arguments, .. } => {
                assert_eq!(arguments, &["web02", "other", "web02"]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn host_name_regex_search_renamed() {
        let mut node = Node {
            action: NodeAction::StateOfRemainingServices {
                host_pattern: "$HOSTNAME$".to_string(),
            },
            search: NodeSearch::Host {
                conditions: SearchConditions {
                    host_choice: HostChoice::HostNameRegex {
                        pattern: "web01".to_string(),
                    },
                },
            },
        };
        assert_eq!(rename_node(&mut node, "web01", "web02"), 1);
        assert_eq!(
            node.search.host_choice(),
            Some(&HostChoice::HostNameRegex {
                pattern: "web02".to_string()
            })
        );
    }

    #[test]
    fn alias_regex_search_untouched() {
        let mut node = Node {
            action: call_node(&[]).action,
            search: NodeSearch::Host {
                conditions: SearchConditions {
                    host_choice: HostChoice::HostAliasRegex {
                        pattern: "web01".to_string(),
                    },
                },
            },
        };
        assert_eq!(rename_node(&mut node, "web01", "web02"), 0);
    }
}
