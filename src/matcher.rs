//! Per-employee matching of secondary payment records to their primary record.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::codes::{CodeMap, CodeSet};
use crate::error::{ReconError, Result};
use crate::models::PaymentRecord;
use crate::money::{self, ZERO};
use crate::sink::{Diagnostic, LogSink};

type IndexKey = (String, String, String);

/// Positions of a group's records keyed by `(vidop, datan, datok)`.
///
/// Built from scratch for every group. Keys never change when a primary
/// record's sum is updated, so positions stay valid for the whole pass.
#[derive(Debug)]
pub struct LookupIndex {
    positions: HashMap<IndexKey, Vec<usize>>,
}

impl LookupIndex {
    pub fn build(group: &[PaymentRecord]) -> Self {
        let mut positions: HashMap<IndexKey, Vec<usize>> = HashMap::new();
        for (i, row) in group.iter().enumerate() {
            positions
                .entry((row.vidop.clone(), row.datan.clone(), row.datok.clone()))
                .or_default()
                .push(i);
        }
        Self { positions }
    }

    /// Every position whose code is one of `codes` and whose period matches,
    /// in the order of `codes`.
    pub fn find(&self, codes: &CodeSet, datan: &str, datok: &str) -> Vec<usize> {
        let mut found = Vec::new();
        for code in codes.iter() {
            let key = (code.to_string(), datan.to_string(), datok.to_string());
            if let Some(hits) = self.positions.get(&key) {
                found.extend_from_slice(hits);
            }
        }
        found
    }
}

/// What happened while resolving one employee group.
#[derive(Debug, Default, PartialEq)]
pub struct GroupOutcome {
    pub failed: bool,
    pub uncovered: BTreeSet<String>,
}

/// Fold every secondary record of `group` into its primary record.
///
/// Missing or ambiguous primaries are reported and mark the outcome failed;
/// the pass continues. An amount that is not a number aborts with
/// [`ReconError::InvalidAmount`].
pub fn resolve_group(
    group: &mut [PaymentRecord],
    codes: &CodeMap,
    sink: &mut dyn LogSink,
) -> Result<GroupOutcome> {
    let index = LookupIndex::build(group);
    let mut processed: HashSet<String> = HashSet::new();
    let mut outcome = GroupOutcome::default();

    for i in 0..group.len() {
        let Some(mapping) = codes.mapping_for_secondary(&group[i].vidop) else {
            continue;
        };
        let secondary = group[i].clone();
        let candidates = index.find(&mapping.primary, &secondary.datan, &secondary.datok);

        let target = match candidates.as_slice() {
            [only] => *only,
            [] => {
                sink.report(&Diagnostic::NoPrimaryFound {
                    tabn: secondary.tabn,
                    vidop: secondary.vidop,
                    datan: secondary.datan,
                    datok: secondary.datok,
                    expected: mapping.primary.describe(),
                });
                outcome.failed = true;
                continue;
            }
            _ => {
                sink.report(&Diagnostic::AmbiguousPrimary {
                    tabn: secondary.tabn,
                    vidop: secondary.vidop,
                    datan: secondary.datan,
                    datok: secondary.datok,
                    expected: mapping.primary.describe(),
                });
                outcome.failed = true;
                continue;
            }
        };

        let primary = &group[target];
        processed.insert(primary.vidop.clone());
        processed.insert(secondary.vidop.clone());

        let summa = match money::sum(&primary.summa, &secondary.summaval) {
            Ok(summa) => summa,
            Err(e @ ReconError::InvalidAmount(_)) => {
                sink.report(&Diagnostic::SumNotNumeric {
                    tabn: secondary.tabn,
                    vidop: primary.vidop.clone(),
                    summa: primary.summa.clone(),
                    summaval: secondary.summaval,
                });
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        let updated = primary.with_summa(summa);
        group[target] = updated;
    }

    for row in group.iter() {
        if !processed.contains(&row.vidop) {
            sink.report(&Diagnostic::Uncovered {
                tabn: row.tabn.clone(),
                vidop: row.vidop.clone(),
            });
            outcome.uncovered.insert(row.vidop.clone());
            outcome.failed = true;
        }
    }

    Ok(outcome)
}

/// Append an UPDATE for every record whose accumulated sum left zero.
pub fn emit_updates(table: &str, group: &[PaymentRecord], out: &mut Vec<String>) {
    for row in group {
        if row.summa != ZERO {
            out.push(format!(
                "UPDATE {table} WHERE nrec={} SET summa:={};",
                row.nrec, row.summa
            ));
        }
    }
}
