use std::collections::BTreeSet;

use crate::codes::CodeMap;
use crate::error::Result;
use crate::grouper::group_by;
use crate::matcher::{emit_updates, resolve_group};
use crate::models::PaymentRecord;
use crate::money::ZERO;
use crate::sink::LogSink;

/// Batch driver for the UCHRABVR pre-posting file.
///
/// `start` drains the record stream group by group, `output` returns the
/// generated statements and `return_code` is 1 once anything needed a look
/// in the log.
pub struct Reconciler<S> {
    codes: CodeMap,
    table: String,
    sink: S,
    statements: Vec<String>,
    unprocessed: BTreeSet<String>,
    groups: usize,
    return_code: i32,
}

impl<S: LogSink> Reconciler<S> {
    pub fn new(codes: CodeMap, table: &str, sink: S) -> Self {
        Self {
            codes,
            table: table.to_string(),
            sink,
            statements: Vec::new(),
            unprocessed: BTreeSet::new(),
            groups: 0,
            return_code: 0,
        }
    }

    /// Process every employee group. Sums arriving in the file are discarded:
    /// each record starts from zero.
    pub fn start<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<PaymentRecord>>,
    {
        let records = records.into_iter().map(|r| {
            r.map(|row| PaymentRecord {
                summa: ZERO.to_string(),
                ..row
            })
        });
        for group in group_by(records, |row: &PaymentRecord| row.clsch.clone()) {
            if let Err(e) = self.process_group(group) {
                self.return_code = 1;
                return Err(e);
            }
        }
        Ok(())
    }

    fn process_group(&mut self, group: Result<Vec<PaymentRecord>>) -> Result<()> {
        let mut group = group?;
        let outcome = resolve_group(&mut group, &self.codes, &mut self.sink)?;
        emit_updates(&self.table, &group, &mut self.statements);
        if outcome.failed {
            self.return_code = 1;
        }
        self.unprocessed.extend(outcome.uncovered);
        self.groups += 1;
        Ok(())
    }

    /// Log the end-of-run summary, including every payment code the code
    /// table did not cover anywhere in the file.
    pub fn finish(&mut self) {
        if !self.unprocessed.is_empty() {
            let codes: Vec<&str> = self.unprocessed.iter().map(String::as_str).collect();
            self.sink.error(&format!(
                "Payment codes not processed: {}. They may be missing from the code table",
                codes.join(", ")
            ));
        }
        self.sink.info(&format!(
            "{} employee groups processed, {} update statements generated",
            self.groups,
            self.statements.len()
        ));
    }

    pub fn output(&self) -> &[String] {
        &self.statements
    }

    pub fn return_code(&self) -> i32 {
        self.return_code
    }

    pub fn mark_failed(&mut self) {
        self.return_code = 1;
    }

    pub fn unprocessed_codes(&self) -> &BTreeSet<String> {
        &self.unprocessed
    }

    pub fn groups(&self) -> usize {
        self.groups
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
