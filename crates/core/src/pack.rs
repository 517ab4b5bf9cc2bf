//! BI packs: named, access-controlled containers of rules and aggregations.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::aggregation::Aggregation;
use crate::error::BiError;
use crate::rule::Rule;

/// The persisted form of the whole pack collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacksConfig {
    pub packs: Vec<PackConfig>,
}

/// The persisted form of a single pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub comment: String,
    pub contact_groups: Vec<String>,
    pub public: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
}

/// A pack owns its rules and aggregations, keyed by their IDs.
///
/// Pack-level operations do no referential-integrity checking; that is the
/// repository's concern, one layer up.
#[derive(Debug, Clone)]
pub struct Pack {
    pub id: String,
    pub title: String,
    pub comment: String,
    pub contact_groups: Vec<String>,
    pub public: bool,
    pub rules: IndexMap<String, Rule>,
    pub aggregations: IndexMap<String, Aggregation>,
}

impl Pack {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            comment: String::new(),
            contact_groups: Vec::new(),
            public: false,
            rules: IndexMap::new(),
            aggregations: IndexMap::new(),
        }
    }

    /// Instantiate a pack from its persisted form, re-establishing the
    /// owning-pack back-references on all rules and aggregations.
    pub fn from_config(config: PackConfig) -> Self {
        let mut rules = IndexMap::new();
        for mut rule in config.rules {
            rule.pack_id = config.id.clone();
            rules.insert(rule.id.clone(), rule);
        }

        let mut aggregations = IndexMap::new();
        for mut aggregation in config.aggregations {
            aggregation.pack_id = config.id.clone();
            aggregations.insert(aggregation.id.clone(), aggregation);
        }

        Self {
            id: config.id,
            title: config.title,
            comment: config.comment,
            contact_groups: config.contact_groups,
            public: config.public,
            rules,
            aggregations,
        }
    }

    /// Produce the persisted form of this pack.
    pub fn serialize(&self) -> PackConfig {
        PackConfig {
            id: self.id.clone(),
            title: self.title.clone(),
            comment: self.comment.clone(),
            contact_groups: self.contact_groups.clone(),
            public: self.public,
            rules: self.rules.values().cloned().collect(),
            aggregations: self.aggregations.values().cloned().collect(),
        }
    }

    pub fn num_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn num_aggregations(&self) -> usize {
        self.aggregations.len()
    }

    /// Insert a rule keyed by its own ID, overwriting any existing entry.
    pub fn add_rule(&mut self, mut rule: Rule) {
        rule.pack_id = self.id.clone();
        self.rules.insert(rule.id.clone(), rule);
    }

    /// Delete a rule without any rule tree integrity check.
    pub fn delete_rule(&mut self, rule_id: &str) -> Result<(), BiError> {
        self.rules
            .shift_remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| BiError::RuleNotFound(rule_id.to_string()))
    }

    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.get(rule_id)
    }

    pub fn get_rule_mandatory(&self, rule_id: &str) -> Result<&Rule, BiError> {
        self.get_rule(rule_id)
            .ok_or_else(|| BiError::RuleNotFound(rule_id.to_string()))
    }

    /// Insert an aggregation keyed by its own ID, overwriting any existing entry.
    pub fn add_aggregation(&mut self, mut aggregation: Aggregation) {
        aggregation.pack_id = self.id.clone();
        self.aggregations.insert(aggregation.id.clone(), aggregation);
    }

    pub fn delete_aggregation(&mut self, aggregation_id: &str) -> Result<(), BiError> {
        self.aggregations
            .shift_remove(aggregation_id)
            .map(|_| ())
            .ok_or_else(|| BiError::AggregationNotFound(aggregation_id.to_string()))
    }

    pub fn get_aggregation(&self, aggregation_id: &str) -> Option<&Aggregation> {
        self.aggregations.get(aggregation_id)
    }

    pub fn get_aggregation_mandatory(&self, aggregation_id: &str) -> Result<&Aggregation, BiError> {
        self.get_aggregation(aggregation_id)
            .ok_or_else(|| BiError::AggregationNotFound(aggregation_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Node, NodeAction};

    fn sample_pack() -> Pack {
        let mut pack = Pack::new("ops", "Operations");
        pack.contact_groups = vec!["oncall".to_string()];
        pack.public = true;
        pack.add_rule(
            Rule::new("host", "Host state").with_nodes(vec![Node::new(NodeAction::StateOfHost {
                host_pattern: "$HOSTNAME$".to_string(),
            })]),
        );
        pack.add_aggregation(Aggregation::new(
            "all-hosts",
            Node::new(NodeAction::CallARule {
                rule_id: "host".to_string(),
                arguments: vec!["$HOSTNAME$".to_string()],
            }),
        ));
        pack
    }

    #[test]
    fn serialize_round_trip() {
        let pack = sample_pack();
        let config = pack.serialize();
        let restored = Pack::from_config(config.clone());

        assert_eq!(restored.id, "ops");
        assert_eq!(restored.serialize(), config);
        assert_eq!(restored.get_rule("host").unwrap().pack_id, "ops");
        assert_eq!(restored.get_aggregation("all-hosts").unwrap().pack_id, "ops");
    }

    #[test]
    fn add_rule_overwrites_same_id() {
        let mut pack = sample_pack();
        pack.add_rule(Rule::new("host", "Host state v2"));

        assert_eq!(pack.num_rules(), 1);
        assert_eq!(pack.get_rule("host").unwrap().title, "Host state v2");
    }

    #[test]
    fn delete_missing_rule_fails() {
        let mut pack = sample_pack();
        assert!(matches!(
            pack.delete_rule("nope"),
            Err(BiError::RuleNotFound(_))
        ));
        assert!(pack.delete_rule("host").is_ok());
        assert!(pack.get_rule("host").is_none());
    }

    #[test]
    fn mandatory_lookups() {
        let pack = sample_pack();
        assert!(pack.get_rule_mandatory("host").is_ok());
        assert!(matches!(
            pack.get_aggregation_mandatory("nope"),
            Err(BiError::AggregationNotFound(_))
        ));
    }
}
