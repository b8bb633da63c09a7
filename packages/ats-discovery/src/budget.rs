//! Query and credit accounting for one platform run.

use serde::Serialize;

/// How a provider bills, used to turn credits into money.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pricing {
    /// Credits charged for each completed query
    pub credits_per_query: u32,
    /// USD per credit on the plan being priced
    pub usd_per_credit: f64,
}

impl Pricing {
    pub const fn new(credits_per_query: u32, usd_per_credit: f64) -> Self {
        Self {
            credits_per_query,
            usd_per_credit,
        }
    }
}

/// Counters for a single platform run.
///
/// Purely observational unless a credit ceiling is configured, in which
/// case [`QueryBudget::can_afford_query`] gates the next query.
#[derive(Debug, Clone)]
pub struct QueryBudget {
    max_queries: usize,
    max_credits: Option<u64>,
    pricing: Pricing,
    queries_issued: usize,
    failed_queries: usize,
    credits_used: u64,
}

impl QueryBudget {
    pub fn new(max_queries: usize, pricing: Pricing) -> Self {
        Self {
            max_queries,
            max_credits: None,
            pricing,
            queries_issued: 0,
            failed_queries: 0,
            credits_used: 0,
        }
    }

    /// Stop before any query that would push credits past `max_credits`.
    pub fn with_credit_ceiling(mut self, max_credits: Option<u64>) -> Self {
        self.max_credits = max_credits;
        self
    }

    pub fn queries_exhausted(&self) -> bool {
        self.queries_issued >= self.max_queries
    }

    pub fn can_afford_query(&self) -> bool {
        match self.max_credits {
            Some(cap) => self.credits_used + u64::from(self.pricing.credits_per_query) <= cap,
            None => true,
        }
    }

    /// Record a query the provider answered.
    pub fn record_success(&mut self) {
        self.queries_issued += 1;
        self.credits_used += u64::from(self.pricing.credits_per_query);
    }

    /// Record a query that failed; it counts against the query budget but
    /// is not billed.
    pub fn record_failure(&mut self) {
        self.queries_issued += 1;
        self.failed_queries += 1;
    }

    pub fn remaining_queries(&self) -> usize {
        self.max_queries.saturating_sub(self.queries_issued)
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        BudgetSnapshot {
            queries_issued: self.queries_issued,
            failed_queries: self.failed_queries,
            credits_used: self.credits_used,
            cost_usd: self.credits_used as f64 * self.pricing.usd_per_credit,
        }
    }
}

/// Final counters reported for a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetSnapshot {
    pub queries_issued: usize,
    pub failed_queries: usize,
    pub credits_used: u64,
    pub cost_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOBBY: Pricing = Pricing::new(2, 16.0 / 10_000.0);

    #[test]
    fn test_credits_and_cost_accrue_per_success() {
        let mut budget = QueryBudget::new(15, HOBBY);
        for _ in 0..15 {
            budget.record_success();
        }

        let snap = budget.snapshot();
        assert_eq!(snap.queries_issued, 15);
        assert_eq!(snap.credits_used, 30);
        assert!((snap.cost_usd - 0.048).abs() < 1e-9);
        assert!(budget.queries_exhausted());
    }

    #[test]
    fn test_failures_count_but_are_not_billed() {
        let mut budget = QueryBudget::new(3, HOBBY);
        budget.record_success();
        budget.record_failure();

        let snap = budget.snapshot();
        assert_eq!(snap.queries_issued, 2);
        assert_eq!(snap.failed_queries, 1);
        assert_eq!(snap.credits_used, 2);
        assert_eq!(budget.remaining_queries(), 1);
    }

    #[test]
    fn test_no_ceiling_by_default() {
        let mut budget = QueryBudget::new(1000, HOBBY);
        for _ in 0..500 {
            budget.record_success();
        }
        assert!(budget.can_afford_query());
    }

    #[test]
    fn test_credit_ceiling_blocks_overspend() {
        let mut budget = QueryBudget::new(15, HOBBY).with_credit_ceiling(Some(5));
        assert!(budget.can_afford_query());
        budget.record_success();
        budget.record_success();
        // 4 used, next query would make 6
        assert!(!budget.can_afford_query());
    }
}
