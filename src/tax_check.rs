//! Monthly zero-balance check of income-tax withholdings (UDER export).
//!
//! For every employee the withholding rows with a tax code are grouped by
//! month up to a cutoff month; each month is expected to sum to zero.

use crate::error::Result;
use crate::grouper::group_by;
use crate::models::{TaxRecord, TaxRecordGrouped};
use crate::money::{self, ZERO};
use crate::sink::LogSink;

pub const DEFAULT_TAX_CODES: &[&str] = &["13", "182"];

/// Two-character month key: `""` → `"00"`, `"7"` → `"07"`, `"12XX"` → `"12"`.
///
/// Longer values are cut to their first two characters as Galaktika exports
/// them; nothing stricter is attempted.
pub fn normalize_month(month: &str) -> String {
    let mut chars = month.chars();
    match (chars.next(), chars.next()) {
        (None, _) => "00".to_string(),
        (Some(c), None) => format!("0{c}"),
        (Some(a), Some(b)) => [a, b].iter().collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residual {
    pub tabn: String,
    pub month: String,
    pub amount: String,
}

pub struct TaxCheck<S> {
    tax_codes: Vec<String>,
    last_month: String,
    sink: S,
    residuals: Vec<Residual>,
    return_code: i32,
}

impl<S: LogSink> TaxCheck<S> {
    pub fn new(tax_codes: Vec<String>, last_month: &str, sink: S) -> Self {
        Self {
            tax_codes,
            last_month: normalize_month(last_month.trim()),
            sink,
            residuals: Vec::new(),
            return_code: 0,
        }
    }

    /// Check every employee; residuals are logged as they are found and returned.
    pub fn start<I>(&mut self, records: I) -> Result<&[Residual]>
    where
        I: IntoIterator<Item = Result<TaxRecord>>,
    {
        self.sink
            .error("Tab number; employee; Month; month; Tax difference =; amount");
        for group in group_by(records, |row: &TaxRecord| row.clsch.clone()) {
            let checked = group.and_then(|group| self.check_person(&group));
            if let Err(e) = checked {
                self.return_code = 1;
                return Err(e);
            }
        }
        Ok(&self.residuals)
    }

    /// Tax rows of one employee up to the cutoff, sorted by month key.
    pub fn filter_sort(&self, group: &[TaxRecord]) -> Vec<TaxRecordGrouped> {
        let mut filtered: Vec<TaxRecordGrouped> = group
            .iter()
            .filter(|row| self.tax_codes.iter().any(|c| *c == row.vidud))
            .map(|row| TaxRecordGrouped {
                record: row.clone(),
                month_key: normalize_month(&row.mes),
            })
            .filter(|row| row.month_key <= self.last_month)
            .collect();
        filtered.sort_by(|a, b| a.month_key.cmp(&b.month_key));
        filtered
    }

    fn check_person(&mut self, group: &[TaxRecord]) -> Result<()> {
        let rows = self.filter_sort(group);
        for month in rows.chunk_by(|a, b| a.month_key == b.month_key) {
            let mut total = ZERO.to_string();
            for row in month {
                total = money::sum(&total, &row.record.sumud)?;
            }
            if total != ZERO {
                let first = &month[0];
                self.report(Residual {
                    tabn: first.record.tabn.clone(),
                    month: first.month_key.clone(),
                    amount: total,
                });
            }
        }
        Ok(())
    }

    fn report(&mut self, residual: Residual) {
        self.sink.info(&format!(
            "Tab number; {}; Month; {}; Tax difference =; {}",
            residual.tabn, residual.month, residual.amount
        ));
        self.residuals.push(residual);
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn mark_failed(&mut self) {
        self.return_code = 1;
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
