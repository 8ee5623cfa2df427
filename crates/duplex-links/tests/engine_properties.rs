//! Engine-level properties: partition completeness, canonical-pair
//! reproducibility, and full output stability under input permutation.

use chrono::{DateTime, TimeZone, Utc};
use duplex_links::{ChannelRecord, DuplexLink, Endpoint, LinkSet};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Synthetic site grid; indices map to distinct 6-decimal coordinates.
fn site(index: usize) -> Endpoint {
    Endpoint {
        latitude: 50.0 + index as f64 * 0.013,
        longitude: 19.0 + index as f64 * 0.017,
    }
}

#[derive(Debug, Clone)]
struct LinkPlan {
    /// (frequency MHz, polarization) per channel
    channels: Vec<(f64, Option<String>)>,
    /// Emit the mirrored return direction for each channel
    mirrored: bool,
    has_permit: bool,
    unknown_operator: bool,
    lapsed: bool,
}

fn link_plan() -> impl Strategy<Value = LinkPlan> {
    let channel = (
        prop::sample::select(vec![18000.0_f64, 18200.0, 23000.0]),
        prop::option::of(prop::sample::select(vec!["V", "H"])),
    );
    (
        prop::collection::vec(channel, 1..4),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(channels, mirrored, has_permit, unknown_operator, lapsed)| LinkPlan {
                channels: channels
                    .into_iter()
                    .map(|(freq, pol)| (freq, pol.map(str::to_string)))
                    .collect(),
                mirrored,
                has_permit,
                unknown_operator,
                lapsed,
            },
        )
}

fn records_for(plans: &[LinkPlan]) -> Vec<ChannelRecord> {
    let mut out = Vec::new();
    for (i, plan) in plans.iter().enumerate() {
        let a = site(2 * i);
        let b = site(2 * i + 1);
        let operator_id = (!plan.unknown_operator).then(|| format!("OP-{}", i % 2));
        let permit_number = plan.has_permit.then(|| format!("P-{i}"));
        let permit_expiry = plan
            .lapsed
            .then(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

        let mut push = |id: String, tx: Endpoint, rx: Endpoint, freq: f64, pol: &Option<String>| {
            out.push(ChannelRecord {
                id,
                tx,
                rx,
                frequency_mhz: freq,
                polarization: pol.clone(),
                channel_width_mhz: Some(28.0),
                modulation: Some("256QAM".to_string()),
                permit_number: permit_number.clone(),
                permit_expiry,
                operator_id: operator_id.clone(),
            });
        };

        for (j, (freq, pol)) in plan.channels.iter().enumerate() {
            push(format!("L{i}-F{j}"), a, b, *freq, pol);
            if plan.mirrored {
                push(format!("L{i}-R{j}"), b, a, *freq, pol);
            }
        }
    }
    out
}

/// Comparable digest of one link: canonical endpoint keys, architecture,
/// expiry, direction id sequence, exact distance bits.
type Digest = (String, String, &'static str, bool, Vec<String>, u64);

fn digest(link: &DuplexLink) -> Digest {
    (
        link.endpoint_a.key(),
        link.endpoint_b.key(),
        link.architecture.label(),
        link.is_expired,
        link.directions.iter().map(|r| r.id.clone()).collect(),
        link.distance_m().to_bits(),
    )
}

fn plans_with_shuffle(
) -> impl Strategy<Value = (Vec<ChannelRecord>, Vec<ChannelRecord>)> {
    prop::collection::vec(link_plan(), 1..6).prop_flat_map(|plans| {
        let records = records_for(&plans);
        (Just(records.clone()), Just(records).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn partition_is_complete(plans in prop::collection::vec(link_plan(), 1..6)) {
        let records = records_for(&plans);
        let set = LinkSet::build(&records, fixed_now());

        let mut seen: Vec<String> = set
            .iter()
            .flat_map(|link| link.directions.iter().map(|r| r.id.clone()))
            .collect();
        let mut expected: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        seen.sort();
        expected.sort();
        // No record lost, none duplicated
        prop_assert_eq!(seen, expected);

        for link in set.iter() {
            prop_assert!(!link.directions.is_empty());
            prop_assert!(link.endpoint_a.key() <= link.endpoint_b.key());
        }
    }

    #[test]
    fn group_keys_are_unique(plans in prop::collection::vec(link_plan(), 1..6)) {
        let records = records_for(&plans);
        let set = LinkSet::build(&records, fixed_now());
        let mut keys: Vec<&str> = set.iter().map(|l| l.group_key.as_str()).collect();
        let before = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
    }

    #[test]
    fn output_is_stable_under_input_permutation(
        (records, shuffled) in plans_with_shuffle()
    ) {
        let now = fixed_now();
        let original = LinkSet::build(&records, now);
        let permuted = LinkSet::build(&shuffled, now);

        fn by_key(set: &LinkSet) -> BTreeMap<String, Digest> {
            set.iter()
                .map(|link| (link.group_key.clone(), digest(link)))
                .collect()
        }
        // Same links, same canonical endpoints, same architecture, and the
        // same direction sequence (not merely the same member set)
        prop_assert_eq!(by_key(&original), by_key(&permuted));
    }

    #[test]
    fn every_record_resolves_to_its_link(plans in prop::collection::vec(link_plan(), 1..4)) {
        let records = records_for(&plans);
        let set = LinkSet::build(&records, fixed_now());
        for record in &records {
            let link = set.find_by_record_id(&record.id);
            prop_assert!(link.is_ok());
            prop_assert!(link.unwrap().contains_record(&record.id));
        }
    }
}
