use thiserror::Error;

#[derive(Error, Debug)]
pub enum BiError {
    #[error("BI rule not found: {0}")]
    RuleNotFound(String),

    #[error("BI pack not found: {0}")]
    PackNotFound(String),

    #[error("BI aggregation not found: {0}")]
    AggregationNotFound(String),

    #[error("cannot delete rule '{0}': it is still used by other aggregations")]
    RuleUsedByAggregation(String),

    #[error("cannot delete rule '{0}': it is still used by other rules")]
    RuleUsedByRule(String),

    #[error("cycle in BI rules, a rule calls itself directly or indirectly: {0}")]
    RuleCycle(String),

    #[error("duplicate BI rule id: {0}")]
    DuplicateRuleId(String),

    #[error("duplicate BI aggregation id: {0}")]
    DuplicateAggregationId(String),

    #[error("store error: {0}")]
    Store(String),
}
