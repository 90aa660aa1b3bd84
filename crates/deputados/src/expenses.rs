use std::fmt::Display;

use serde::ser::SerializeMap;

use crate::normalize::{parse_brl_number, strip_currency};
use crate::query::Query;

/// Cells per table row: month label, amount, receipt link.
pub const CELLS_PER_ENTRY: usize = 3;

/// Month keys used in the serialized record, January first.
pub const MONTH_KEYS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "maio", "junho", "jul", "agosto", "set", "out", "nov", "dez",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseCategory {
    /// Cota parlamentar.
    Quota,
    /// Verba de gabinete.
    Office,
}

impl ExpenseCategory {
    pub fn query(&self) -> Query {
        match self {
            ExpenseCategory::Quota => Query::QuotaExpenses,
            ExpenseCategory::Office => Query::OfficeExpenses,
        }
    }

    /// Suffix of this category's keys in the published feed. The quota table
    /// has always been published under `_gab` and the office budget under
    /// `_par`; consumers depend on it.
    pub fn key_suffix(&self) -> &'static str {
        match self {
            ExpenseCategory::Quota => "gab",
            ExpenseCategory::Office => "par",
        }
    }
}

impl Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseCategory::Quota => write!(f, "Parliamentary quota"),
            ExpenseCategory::Office => write!(f, "Office budget"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    pub month: String,
    pub amount: Option<f64>,
}

impl ExpenseEntry {
    fn from_cells(month: &str, amount: &str) -> Self {
        let month = month.trim().to_string();
        let amount_text = strip_currency(amount).unwrap_or(amount);
        let amount = parse_brl_number(amount_text)
            .inspect_err(|e| log::warn!("Unparseable amount for '{}': {}", month, e))
            .ok();

        Self { month, amount }
    }
}

/// Groups table cells into entries in document order.
///
/// Cells left over after the last complete group are dropped with a warning.
pub fn scan_entries(cells: &[String]) -> impl Iterator<Item = ExpenseEntry> + '_ {
    let remainder = cells.len() % CELLS_PER_ENTRY;
    if remainder != 0 {
        log::warn!(
            "Expense table has {} cells, dropping {} trailing cell(s)",
            cells.len(),
            remainder
        );
    }

    cells
        .chunks_exact(CELLS_PER_ENTRY)
        .map(|group| ExpenseEntry::from_cells(&group[0], &group[1]))
}

/// Sums amounts counting missing ones as zero. The result is never missing:
/// an empty input sums to `0.0`.
pub fn null_safe_sum<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    amounts
        .into_iter()
        .fold(0.0, |total, amount| total + amount.unwrap_or(0.0))
}

/// Yearly view of one expense table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseSummary {
    /// Null-safe sum of every entry, including those past December.
    pub total: f64,
    /// Positional amounts, `months[0]` being the first table row.
    pub months: [Option<f64>; 12],
    /// Entries beyond the twelfth. They count towards `total` only.
    pub extra_entries: usize,
}

impl ExpenseSummary {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ExpenseEntry>,
    {
        let mut summary = ExpenseSummary::default();
        let mut amounts = Vec::new();

        for (i, entry) in entries.into_iter().enumerate() {
            match summary.months.get_mut(i) {
                Some(slot) => *slot = entry.amount,
                None => summary.extra_entries += 1,
            }
            amounts.push(entry.amount);
        }

        if summary.extra_entries > 0 {
            log::warn!(
                "Expense table has {} entries past the twelfth month",
                summary.extra_entries
            );
        }

        summary.total = null_safe_sum(amounts);
        summary
    }

    /// Amount for a 1-based month.
    pub fn month(&self, month: usize) -> Option<f64> {
        month
            .checked_sub(1)
            .and_then(|i| self.months.get(i))
            .copied()
            .flatten()
    }

    pub(crate) fn serialize_entries<M: SerializeMap>(
        &self,
        map: &mut M,
        suffix: &str,
    ) -> Result<(), M::Error> {
        map.serialize_entry(&format!("gasto_total_{suffix}"), &self.total)?;
        for (key, amount) in MONTH_KEYS.iter().zip(self.months.iter()) {
            map.serialize_entry(&format!("gasto_{key}_{suffix}"), amount)?;
        }
        Ok(())
    }
}
