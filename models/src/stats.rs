// models/src/stats.rs

use serde::{Deserialize, Serialize};

/// Month-over-month income movement. Kept as a tagged value so a zero
/// previous month reads as "new income" instead of a divide-by-zero ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum IncomeChange {
    /// No previous-month income to compare against, current month earned.
    NewIncome,
    /// Finite percentage; 0.0 when both months are zero.
    Percent(f64),
}

/// Derived monthly summary; recomputed from the collections on demand and
/// never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_residents: usize,
    pub occupied_cots: usize,
    pub total_cots: usize,
    pub due_payments: usize,
    pub overdue_payments: usize,
    pub income_this_month: i64,
    pub income_last_month: i64,
    /// Placeholder carried for dashboard compatibility; always 0.
    pub total_meals: usize,
    pub income_change: IncomeChange,
}
