//! Record grouping into physical-link groups
//!
//! The permit register lists each direction (and each channel of a multi-
//! channel link) as its own record. Records sharing an operator and permit
//! number belong to one physical link; permit-less records fall back to the
//! canonical site-pair key. Groups come out in first-seen order so the whole
//! pipeline stays deterministic for a given input order.

use std::collections::HashMap;

use tracing::debug;

use crate::ChannelRecord;

/// Grouping key for one record: `(operator, permit)` when a permit number is
/// present, `(operator, canonical site pair)` otherwise.
pub fn group_key(record: &ChannelRecord) -> String {
    match &record.permit_number {
        Some(permit) => format!("{}|permit:{permit}", record.operator()),
        None => format!("{}|path:{}", record.operator(), record.path_key()),
    }
}

/// Partition records into physical-link groups, first-seen key order.
///
/// Every record lands in exactly one group; no group is empty.
pub fn group_records(records: &[ChannelRecord]) -> Vec<(String, Vec<ChannelRecord>)> {
    let mut groups: Vec<(String, Vec<ChannelRecord>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = group_key(record);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(record.clone()),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record.clone()]));
            }
        }
    }

    for (key, members) in &groups {
        debug!(key = key.as_str(), members = members.len(), "grouped");
    }
    groups
}
