//! Canonical endpoint identity and direction display order
//!
//! The permit register lists whichever site happened to transmit first, so a
//! re-ingest of the same link could otherwise swap its endpoints and flip
//! every bearing downstream. The lexicographically smaller `"lat,lon"` key
//! becomes endpoint A, and the member records get a reproducible display
//! order: XPIC links group channels by side, everything else alternates
//! direction so complementary channel pairs sit together.

use crate::{Architecture, ChannelRecord, Endpoint};

/// Canonical endpoint pair for a group, taken from one of its records: the
/// smaller `"lat,lon"` key becomes endpoint A regardless of which site the
/// register listed as transmitter.
pub fn canonical_endpoints(record: &ChannelRecord) -> (Endpoint, Endpoint) {
    if record.tx.key() <= record.rx.key() {
        (record.tx, record.rx)
    } else {
        (record.rx, record.tx)
    }
}

/// Arrange a group's records into display order.
///
/// Forward cohort: records transmitting from endpoint A. Each cohort sorts by
/// `(polarization, frequency, id)`; the id tail keeps space-diversity twins in
/// a reproducible order no matter how the input was permuted.
pub fn order_directions(
    records: Vec<ChannelRecord>,
    endpoint_a: Endpoint,
    architecture: Architecture,
) -> Vec<ChannelRecord> {
    let a_key = endpoint_a.key();
    let (mut forward, mut reverse): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.tx.key() == a_key);
    sort_cohort(&mut forward);
    sort_cohort(&mut reverse);

    match architecture {
        // Conventional XPIC presentation: all of one side, then the other
        Architecture::Xpic => {
            forward.extend(reverse);
            forward
        }
        _ => interleave(forward, reverse),
    }
}

fn sort_cohort(records: &mut [ChannelRecord]) {
    records.sort_by(|a, b| {
        a.polarization
            .as_deref()
            .unwrap_or("")
            .cmp(b.polarization.as_deref().unwrap_or(""))
            .then(a.frequency_mhz.total_cmp(&b.frequency_mhz))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// `forward[0], reverse[0], forward[1], reverse[1], …` with the longer
/// cohort's remainder appended.
fn interleave(forward: Vec<ChannelRecord>, reverse: Vec<ChannelRecord>) -> Vec<ChannelRecord> {
    let mut out = Vec::with_capacity(forward.len() + reverse.len());
    let mut fwd = forward.into_iter();
    let mut rev = reverse.into_iter();
    loop {
        match (fwd.next(), rev.next()) {
            (Some(f), Some(r)) => {
                out.push(f);
                out.push(r);
            }
            (Some(f), None) => {
                out.push(f);
                out.extend(fwd);
                break;
            }
            (None, Some(r)) => {
                out.push(r);
                out.extend(rev);
                break;
            }
            (None, None) => break,
        }
    }
    out
}
