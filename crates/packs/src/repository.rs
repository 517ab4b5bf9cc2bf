//! The repository owning the full pack collection.
//!
//! All cross-pack operations (rule/aggregation lookups, renames, guarded
//! deletion, persistence) go through [`PackRepository`]. The repository is
//! not internally locked; serializing concurrent edits is the caller's
//! concern.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use tracing::{info, warn};

use mirador_core::{sample_config, Aggregation, BiError, NodeAction, Pack, PacksConfig, Rule};
use mirador_store::ConfigStore;

use crate::graph::{self, RuleReferences};

pub struct PackRepository {
    pub(crate) packs: IndexMap<String, Pack>,
    store: ConfigStore,
}

impl PackRepository {
    /// An empty repository; populate it with [`load_config`](Self::load_config).
    pub fn new(store: ConfigStore) -> Self {
        Self {
            packs: IndexMap::new(),
            store,
        }
    }

    /// Drop the entire in-memory pack collection. Used before reload.
    pub fn cleanup(&mut self) {
        self.packs.clear();
    }

    // ── Pack access ─────────────────────────────────────────────

    pub fn pack_exists(&self, pack_id: &str) -> bool {
        self.packs.contains_key(pack_id)
    }

    pub fn get_packs(&self) -> &IndexMap<String, Pack> {
        &self.packs
    }

    /// Insert a pack keyed by its own ID, overwriting any existing entry.
    pub fn add_pack(&mut self, pack: Pack) {
        self.packs.insert(pack.id.clone(), pack);
    }

    pub fn get_pack(&self, pack_id: &str) -> Option<&Pack> {
        self.packs.get(pack_id)
    }

    pub fn get_pack_mut(&mut self, pack_id: &str) -> Option<&mut Pack> {
        self.packs.get_mut(pack_id)
    }

    pub fn get_pack_mandatory(&self, pack_id: &str) -> Result<&Pack, BiError> {
        self.get_pack(pack_id)
            .ok_or_else(|| BiError::PackNotFound(pack_id.to_string()))
    }

    pub fn delete_pack(&mut self, pack_id: &str) -> Result<(), BiError> {
        self.packs
            .shift_remove(pack_id)
            .map(|_| ())
            .ok_or_else(|| BiError::PackNotFound(pack_id.to_string()))
    }

    // ── Rule access ─────────────────────────────────────────────

    /// First match across all packs; rule IDs are a repository-wide namespace.
    pub fn get_rule(&self, rule_id: &str) -> Option<&Rule> {
        self.packs.values().find_map(|pack| pack.get_rule(rule_id))
    }

    pub fn get_rule_mandatory(&self, rule_id: &str) -> Result<&Rule, BiError> {
        self.get_rule(rule_id)
            .ok_or_else(|| BiError::RuleNotFound(rule_id.to_string()))
    }

    /// Insert a rule into a pack, enforcing repository-wide ID uniqueness.
    ///
    /// Re-adding a rule to the pack that already owns it is an update
    /// (last-write-wins inside the pack); the same ID in a different pack
    /// is rejected.
    pub fn add_rule(&mut self, pack_id: &str, rule: Rule) -> Result<(), BiError> {
        if let Some(owner) = self.get_pack_of_rule(&rule.id) {
            if owner.id != pack_id {
                return Err(BiError::DuplicateRuleId(rule.id));
            }
        }
        let pack = self
            .packs
            .get_mut(pack_id)
            .ok_or_else(|| BiError::PackNotFound(pack_id.to_string()))?;
        pack.add_rule(rule);
        Ok(())
    }

    pub fn get_all_rules(&self) -> Vec<&Rule> {
        self.packs
            .values()
            .flat_map(|pack| pack.rules.values())
            .collect()
    }

    pub fn get_pack_of_rule(&self, rule_id: &str) -> Option<&Pack> {
        self.packs
            .values()
            .find(|pack| pack.get_rule(rule_id).is_some())
    }

    /// Delete a rule if nothing references it.
    ///
    /// Aggregation usage is checked before rule usage, so a rule referenced
    /// by both reports the aggregation error. No cascading deletion: rules
    /// the deleted rule called remain, possibly now orphaned.
    pub fn delete_rule(&mut self, rule_id: &str) -> Result<(), BiError> {
        let references = self.count_rule_references(rule_id)?;
        if references.aggr_refs > 0 {
            return Err(BiError::RuleUsedByAggregation(rule_id.to_string()));
        }
        if references.rule_refs > 0 {
            return Err(BiError::RuleUsedByRule(rule_id.to_string()));
        }

        let pack = self
            .packs
            .values_mut()
            .find(|pack| pack.get_rule(rule_id).is_some())
            .ok_or_else(|| BiError::RuleNotFound(rule_id.to_string()))?;
        pack.delete_rule(rule_id)?;
        info!("deleted BI rule {}", rule_id);
        Ok(())
    }

    /// Rename a rule's own identity and every inbound call-a-rule reference
    /// across the whole repository.
    pub fn rename_rule_id(&mut self, old_id: &str, new_id: &str) {
        for pack in self.packs.values_mut() {
            if let Some(mut rule) = pack.rules.shift_remove(old_id) {
                rule.id = new_id.to_string();
                pack.add_rule(rule);
            }

            // The re-added rule is revisited here, so its own
            // self-references get rewritten along with everyone else's.
            for rule in pack.rules.values_mut() {
                for node in &mut rule.nodes {
                    if let NodeAction::CallARule { rule_id, .. } = &mut node.action {
                        if rule_id.as_str() == old_id {
                            *rule_id = new_id.to_string();
                        }
                    }
                }
            }

            for aggregation in pack.aggregations.values_mut() {
                if let NodeAction::CallARule { rule_id, .. } = &mut aggregation.node.action {
                    if rule_id.as_str() == old_id {
                        *rule_id = new_id.to_string();
                    }
                }
            }
        }
        info!("renamed BI rule {} -> {}", old_id, new_id);
    }

    // ── Aggregation access ──────────────────────────────────────

    /// First match across all packs.
    pub fn get_aggregation(&self, aggregation_id: &str) -> Option<&Aggregation> {
        self.packs
            .values()
            .find_map(|pack| pack.get_aggregation(aggregation_id))
    }

    pub fn get_aggregation_mandatory(&self, aggregation_id: &str) -> Result<&Aggregation, BiError> {
        self.get_aggregation(aggregation_id)
            .ok_or_else(|| BiError::AggregationNotFound(aggregation_id.to_string()))
    }

    /// Insert an aggregation into a pack, enforcing repository-wide ID
    /// uniqueness (same contract as [`add_rule`](Self::add_rule)).
    pub fn add_aggregation(&mut self, pack_id: &str, aggregation: Aggregation) -> Result<(), BiError> {
        if let Some(owner) = self.get_pack_of_aggregation(&aggregation.id) {
            if owner.id != pack_id {
                return Err(BiError::DuplicateAggregationId(aggregation.id));
            }
        }
        let pack = self
            .packs
            .get_mut(pack_id)
            .ok_or_else(|| BiError::PackNotFound(pack_id.to_string()))?;
        pack.add_aggregation(aggregation);
        Ok(())
    }

    pub fn delete_aggregation(&mut self, aggregation_id: &str) -> Result<(), BiError> {
        let pack = self
            .packs
            .values_mut()
            .find(|pack| pack.get_aggregation(aggregation_id).is_some())
            .ok_or_else(|| BiError::AggregationNotFound(aggregation_id.to_string()))?;
        pack.delete_aggregation(aggregation_id)
    }

    pub fn get_all_aggregations(&self) -> Vec<&Aggregation> {
        self.packs
            .values()
            .flat_map(|pack| pack.aggregations.values())
            .collect()
    }

    pub fn get_pack_of_aggregation(&self, aggregation_id: &str) -> Option<&Pack> {
        self.packs
            .values()
            .find(|pack| pack.get_aggregation(aggregation_id).is_some())
    }

    // ── Reference-graph queries ─────────────────────────────────

    pub fn count_rule_references(&self, rule_id: &str) -> Result<RuleReferences, BiError> {
        graph::count_rule_references(self, rule_id)
    }

    /// All rule IDs transitively reachable from an aggregation's top-level
    /// call-a-rule action; empty for other action kinds.
    pub fn get_rule_ids_of_aggregation(
        &self,
        aggregation_id: &str,
    ) -> Result<BTreeSet<String>, BiError> {
        let aggregation = self.get_aggregation_mandatory(aggregation_id)?;
        let mut ids = BTreeSet::new();
        if let Some(rule_id) = aggregation.node.action.called_rule_id() {
            graph::collect_rule_ids(self, rule_id, &mut ids)?;
        }
        Ok(ids)
    }

    // ── Group queries ───────────────────────────────────────────

    /// Flattened group paths of all enabled aggregations, sorted.
    pub fn get_aggregation_group_trees(&self) -> Vec<String> {
        let mut all_groups: BTreeSet<String> = BTreeSet::new();
        for aggregation in self.get_all_aggregations() {
            if aggregation.computation_options.disabled {
                continue;
            }
            all_groups.extend(aggregation.groups.paths.iter().map(|path| path.join("/")));
        }
        all_groups.into_iter().collect()
    }

    /// All available group names and fully combined group paths of enabled
    /// aggregations, as (value, label) choice pairs sorted case-insensitively.
    pub fn get_aggregation_group_choices(&self) -> Vec<(String, String)> {
        let mut all_groups: BTreeSet<String> = BTreeSet::new();
        for aggregation in self.get_all_aggregations() {
            if aggregation.computation_options.disabled {
                continue;
            }
            all_groups.extend(aggregation.groups.names.iter().cloned());
            all_groups.extend(aggregation.groups.paths.iter().map(|path| path.join("/")));
        }

        let mut groups: Vec<String> = all_groups.into_iter().collect();
        groups.sort_by_key(|group| group.to_lowercase());
        groups.into_iter().map(|group| (group.clone(), group)).collect()
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Replace the in-memory state with the persisted configuration, or
    /// with the built-in sample configuration when none exists yet.
    pub fn load_config(&mut self) -> Result<(), BiError> {
        let config = match self.store.load()? {
            Some(config) => config,
            None => {
                info!("no persisted BI configuration, seeding sample config");
                sample_config()
            }
        };
        self.apply_config(config)
    }

    fn apply_config(&mut self, config: PacksConfig) -> Result<(), BiError> {
        self.cleanup();

        let mut seen_rules: HashSet<String> = HashSet::new();
        let mut seen_aggregations: HashSet<String> = HashSet::new();
        let mut packs = IndexMap::new();
        for pack_config in config.packs {
            let pack = Pack::from_config(pack_config);
            for rule_id in pack.rules.keys() {
                if !seen_rules.insert(rule_id.clone()) {
                    return Err(BiError::DuplicateRuleId(rule_id.clone()));
                }
            }
            for aggregation_id in pack.aggregations.keys() {
                if !seen_aggregations.insert(aggregation_id.clone()) {
                    return Err(BiError::DuplicateAggregationId(aggregation_id.clone()));
                }
            }
            if packs.insert(pack.id.clone(), pack).is_some() {
                warn!("pack configured twice, keeping the later one");
            }
        }

        self.packs = packs;
        Ok(())
    }

    /// Cycle-check the rule graph, then produce the persisted form.
    /// Fails before any serialization happens when a cycle exists.
    pub fn generate_config(&self) -> Result<PacksConfig, BiError> {
        graph::check_rule_cycles(self)?;
        Ok(self.serialize())
    }

    pub fn serialize(&self) -> PacksConfig {
        PacksConfig {
            packs: self.packs.values().map(Pack::serialize).collect(),
        }
    }

    /// Persist the configuration, then the enabled-aggregation count.
    ///
    /// The counter is a second, independent persistence step: a counter
    /// write failure does not undo the already-saved configuration.
    pub fn save_config(&self) -> Result<(), BiError> {
        let config = self.generate_config()?;
        self.store.save(&config)?;

        let enabled_aggregations = self
            .get_all_aggregations()
            .iter()
            .filter(|aggregation| !aggregation.computation_options.disabled)
            .count();
        self.store
            .save_num_enabled_aggregations(enabled_aggregations)?;
        Ok(())
    }

    /// The persisted enabled-aggregation count; 0 when unavailable.
    pub fn get_num_enabled_aggregations(&self) -> usize {
        self.store.load_num_enabled_aggregations()
    }
}
