// lib/src/stats.rs
//
// Monthly summaries: a pure function of the collections and a reference
// date. Nothing here is persisted; every render recomputes from scratch.

use chrono::{Datelike, NaiveDate};

use models::{Cot, IncomeChange, Payment, PaymentStatus, Resident, ResidentStatus, Stats};

/// (month, year) window used to bucket payments by due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthWindow {
    month: u32,
    year: i32,
}

impl MonthWindow {
    fn of(date: NaiveDate) -> Self {
        MonthWindow {
            month: date.month(),
            year: date.year(),
        }
    }

    /// Preceding calendar month; January rolls back to December of the
    /// prior year.
    fn previous(self) -> Self {
        if self.month == 1 {
            MonthWindow {
                month: 12,
                year: self.year - 1,
            }
        } else {
            MonthWindow {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    fn contains(self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }
}

fn paid_total<'a, I: Iterator<Item = &'a Payment>>(payments: I) -> i64 {
    payments
        .filter(|p| p.status == PaymentStatus::Paid)
        .map(|p| p.amount)
        .sum()
}

/// Month-over-month movement. A zero previous month with current income is
/// "new income" rather than an unbounded ratio; two zero months are a flat
/// 0 percent.
pub fn income_change(income_this_month: i64, income_last_month: i64) -> IncomeChange {
    if income_last_month == 0 {
        if income_this_month > 0 {
            IncomeChange::NewIncome
        } else {
            IncomeChange::Percent(0.0)
        }
    } else {
        let delta = (income_this_month - income_last_month) as f64;
        IncomeChange::Percent(delta / income_last_month as f64 * 100.0)
    }
}

/// Computes the dashboard summary for the month containing `reference_date`.
///
/// Due/overdue counts are scoped to the current window only: a payment due
/// in another month is not counted even if still outstanding. Resident and
/// cot counters are current snapshots, not month-scoped. Counts use the
/// stored payment status, matching how statuses are assigned at creation;
/// `Payment::effective_status` exists for read-side presentation and is
/// deliberately not applied here.
pub fn compute_stats(
    residents: &[Resident],
    cots: &[Cot],
    payments: &[Payment],
    reference_date: NaiveDate,
) -> Stats {
    let this_month = MonthWindow::of(reference_date);
    let last_month = this_month.previous();

    let in_this_month: Vec<&Payment> = payments
        .iter()
        .filter(|p| this_month.contains(p.date))
        .collect();
    let in_last_month: Vec<&Payment> = payments
        .iter()
        .filter(|p| last_month.contains(p.date))
        .collect();

    let income_this_month = paid_total(in_this_month.iter().copied());
    let income_last_month = paid_total(in_last_month.iter().copied());

    Stats {
        total_residents: residents
            .iter()
            .filter(|r| r.status == ResidentStatus::Active)
            .count(),
        occupied_cots: cots.iter().filter(|c| c.resident_id.is_some()).count(),
        total_cots: cots.len(),
        due_payments: in_this_month
            .iter()
            .filter(|p| p.status == PaymentStatus::Due)
            .count(),
        overdue_payments: in_this_month
            .iter()
            .filter(|p| p.status == PaymentStatus::Overdue)
            .count(),
        income_this_month,
        income_last_month,
        total_meals: 0,
        income_change: income_change(income_this_month, income_last_month),
    }
}
