//! BI aggregations: named top-level entry points into the rule graph.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// A top-level aggregation with a single root node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Aggregation {
    pub id: String,
    /// ID of the owning pack. A lookup key, not serialized.
    #[serde(skip)]
    pub pack_id: String,
    pub node: Node,
    #[serde(default)]
    pub computation_options: ComputationOptions,
    #[serde(default)]
    pub groups: AggregationGroups,
}

impl Aggregation {
    pub fn new(id: impl Into<String>, node: Node) -> Self {
        Self {
            id: id.into(),
            pack_id: String::new(),
            node,
            computation_options: ComputationOptions::default(),
            groups: AggregationGroups::default(),
        }
    }
}

/// How an aggregation is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ComputationOptions {
    /// Disabled aggregations are kept in the configuration but excluded
    /// from computation and from group listings.
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub escalate_downtimes_as_warn: bool,
    #[serde(default)]
    pub use_hard_states: bool,
}

/// Navigation groups an aggregation appears under.
///
/// `names` are flat group names; `paths` are hierarchical group paths,
/// one path per entry, each a sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AggregationGroups {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub paths: Vec<Vec<String>>,
}
