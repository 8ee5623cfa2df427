//! RF architecture classification
//!
//! Works on one group at a time. The group is sub-partitioned by the literal
//! directed `(tx, rx)` pair; the most populous cohort (ties to the earliest
//! first occurrence) is the reference, and only its frequency/polarization
//! cardinalities drive the architecture table. The table is a presentation
//! contract calibrated against the regional permit dataset — reproduce it,
//! don't improve it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::{Architecture, ChannelRecord};

/// Classification result for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub architecture: Architecture,
    /// True when any direction in the group has a lapsed permit; one lapsed
    /// license puts the whole physical link at risk
    pub is_expired: bool,
}

/// Classify one group's records.
///
/// Pure and deterministic for a given input order; never fails — an
/// ambiguous reference cohort comes back [`Architecture::Unknown`].
pub fn classify_group(records: &[ChannelRecord], now: DateTime<Utc>) -> Classification {
    let cohorts = directional_cohorts(records);
    let architecture = match reference_cohort(&cohorts) {
        Some(reference) => classify_cohort(reference),
        None => Architecture::Unknown,
    };
    let is_expired = records.iter().any(|r| r.is_lapsed(now));
    Classification { architecture, is_expired }
}

/// Sub-partition by literal directed pair, first-seen cohort order.
fn directional_cohorts(records: &[ChannelRecord]) -> Vec<Vec<&ChannelRecord>> {
    let mut cohorts: Vec<(String, Vec<&ChannelRecord>)> = Vec::new();
    for record in records {
        let key = record.directed_key();
        match cohorts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(record),
            None => cohorts.push((key, vec![record])),
        }
    }
    cohorts.into_iter().map(|(_, members)| members).collect()
}

/// Most records win; ties break to the cohort seen first. The strict `>`
/// keeps the earliest cohort on equal sizes.
fn reference_cohort<'a>(cohorts: &'a [Vec<&'a ChannelRecord>]) -> Option<&'a [&'a ChannelRecord]> {
    let mut best: Option<&[&ChannelRecord]> = None;
    for cohort in cohorts {
        if best.map_or(true, |b| cohort.len() > b.len()) {
            best = Some(cohort);
        }
    }
    best
}

fn classify_cohort(cohort: &[&ChannelRecord]) -> Architecture {
    if cohort.len() == 1 {
        return Architecture::Fdd;
    }
    // Frequencies are rounded upstream, so bit-pattern equality matches the
    // register's numeric equality
    let frequencies: HashSet<u64> = cohort.iter().map(|r| r.frequency_mhz.to_bits()).collect();
    let polarizations: HashSet<&str> = cohort
        .iter()
        .map(|r| r.polarization.as_deref().unwrap_or(""))
        .collect();

    match (frequencies.len(), polarizations.len()) {
        (1, p) if p > 1 => Architecture::Xpic,
        (f, 1) if f > 1 => Architecture::TwoPlusZeroFdd,
        (1, 1) => Architecture::SpaceDiversity,
        _ => Architecture::Unknown,
    }
}
