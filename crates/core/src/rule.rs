//! BI rules: reusable named subtrees of evaluation nodes.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// A named, reusable subtree of evaluation nodes.
///
/// Rule IDs form a repository-wide namespace: other rules and aggregations
/// call a rule by ID alone, without naming its pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rule {
    pub id: String,
    /// ID of the owning pack. A lookup key, not serialized: the owning pack
    /// is re-established when a pack config is instantiated.
    #[serde(skip)]
    pub pack_id: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    /// Formal argument names, referenced as `$NAME$` in node patterns.
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Rule {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pack_id: String::new(),
            title: title.into(),
            comment: String::new(),
            params: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: &[&str]) -> Self {
        self.params = params.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }
}
