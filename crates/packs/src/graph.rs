//! Reference-graph queries over the pack collection: cycle detection,
//! reference counting and transitive-closure walks. No mutation.

use std::collections::BTreeSet;

use serde::Serialize;

use mirador_core::{BiError, Rule};

use crate::repository::PackRepository;

/// Reference counts for one rule ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleReferences {
    /// Aggregations whose top-level node directly calls the rule.
    pub aggr_refs: usize,
    /// Rules that call the rule directly (depth 1 only).
    pub rule_refs: usize,
    /// Deepest nesting at which the rule is used anywhere (1 = direct
    /// child), 0 when no rule uses it. Diagnostic only; deletion is gated
    /// on `aggr_refs` and `rule_refs`.
    pub level: usize,
}

/// Check every rule in the repository for call cycles.
///
/// All rules are checked, not just those reachable from aggregations: a
/// rule can be called by other rules that are themselves not reachable
/// from any aggregation, and determining "actual" toplevel rules is not
/// possible in the presence of the very cycles we are looking for.
pub fn check_rule_cycles(repo: &PackRepository) -> Result<(), BiError> {
    for rule in repo.get_all_rules() {
        traverse_rule(repo, rule, Vec::new())?;
    }
    Ok(())
}

fn traverse_rule(
    repo: &PackRepository,
    rule: &Rule,
    mut parents: Vec<String>,
) -> Result<(), BiError> {
    if parents.iter().any(|parent| parent == &rule.id) {
        parents.push(rule.id.clone());
        return Err(BiError::RuleCycle(parents.join("->")));
    }

    parents.push(rule.id.clone());
    for node in &rule.nodes {
        if let Some(rule_id) = node.action.called_rule_id() {
            let child = repo.get_rule_mandatory(rule_id)?;
            // Each branch gets its own copy of the path: siblings sharing a
            // subtree are not a cycle.
            traverse_rule(repo, child, parents.clone())?;
        }
    }
    Ok(())
}

/// Count how often a rule is referenced by aggregations and other rules.
pub fn count_rule_references(
    repo: &PackRepository,
    rule_id: &str,
) -> Result<RuleReferences, BiError> {
    let mut aggr_refs = 0;
    for aggregation in repo.get_all_aggregations() {
        if aggregation.node.action.called_rule_id() == Some(rule_id) {
            aggr_refs += 1;
        }
    }

    let mut rule_refs = 0;
    let mut level = 0;
    for rule in repo.get_all_rules() {
        if let Some(depth) = rule_uses_rule(repo, rule, rule_id, 0)? {
            level = level.max(depth);
            if depth == 1 {
                rule_refs += 1;
            }
        }
    }

    Ok(RuleReferences {
        aggr_refs,
        rule_refs,
        level,
    })
}

/// Depth-first search for `target_id` beneath `rule`, following call edges.
///
/// Returns the depth at which the target is first found (1 = direct child),
/// `None` if the target is not used anywhere beneath this rule.
fn rule_uses_rule(
    repo: &PackRepository,
    rule: &Rule,
    target_id: &str,
    level: usize,
) -> Result<Option<usize>, BiError> {
    for node in &rule.nodes {
        if let Some(called_id) = node.action.called_rule_id() {
            if called_id == target_id {
                return Ok(Some(level + 1));
            }
            let subrule = repo.get_rule_mandatory(called_id)?;
            if let Some(depth) = rule_uses_rule(repo, subrule, target_id, level + 1)? {
                return Ok(Some(depth));
            }
        }
    }
    Ok(None)
}

/// Collect `rule_id` and every rule ID transitively reachable from it.
pub fn collect_rule_ids(
    repo: &PackRepository,
    rule_id: &str,
    out: &mut BTreeSet<String>,
) -> Result<(), BiError> {
    if !out.insert(rule_id.to_string()) {
        // Already collected, the subtree below it was walked before.
        return Ok(());
    }
    for node in &repo.get_rule_mandatory(rule_id)?.nodes {
        if let Some(called_id) = node.action.called_rule_id() {
            collect_rule_ids(repo, called_id, out)?;
        }
    }
    Ok(())
}
