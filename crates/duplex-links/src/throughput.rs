//! Coarse throughput estimation
//!
//! Per-direction estimate from channel width and modulation order. This is a
//! presentation figure, not a link-budget result: symbol rate is taken as the
//! channel width with a fixed spectral-efficiency derating.

use crate::ChannelRecord;

/// Fixed derating applied to the raw `width x bits/symbol` product.
/// Covers roll-off and coding overhead at presentation accuracy.
const SPECTRAL_EFFICIENCY_DERATE: f64 = 0.85;

/// Bits per symbol for a modulation name, `None` when unrecognized.
///
/// Unlisted `<N>QAM` names resolve to `log2(N)` when that is an integer in
/// `[1, 14]`; anything else contributes no estimate.
pub fn bits_per_symbol(modulation: &str) -> Option<u32> {
    let name = modulation.trim().to_ascii_uppercase();
    match name.as_str() {
        "BPSK" => Some(1),
        "QPSK" | "4QAM" => Some(2),
        "8QAM" => Some(3),
        "16QAM" => Some(4),
        "32QAM" => Some(5),
        "64QAM" => Some(6),
        "128QAM" => Some(7),
        "256QAM" => Some(8),
        "512QAM" => Some(9),
        "1024QAM" => Some(10),
        "2048QAM" => Some(11),
        "4096QAM" => Some(12),
        _ => derived_qam_bits(&name),
    }
}

fn derived_qam_bits(name: &str) -> Option<u32> {
    let order: u64 = name.strip_suffix("QAM")?.parse().ok()?;
    if !order.is_power_of_two() {
        return None;
    }
    let bits = order.trailing_zeros();
    (1..=14).contains(&bits).then_some(bits)
}

/// One-way estimate in Mbps for a single direction, `None` when channel
/// width or modulation is missing or unrecognized.
pub fn direction_estimate_mbps(record: &ChannelRecord) -> Option<f64> {
    let width = record.channel_width_mhz?;
    let bits = bits_per_symbol(record.modulation.as_deref()?)?;
    Some(width * f64::from(bits) * SPECTRAL_EFFICIENCY_DERATE)
}

/// Aggregate over all directions that yield an estimate.
///
/// `None` when no direction does — "unavailable" is distinct from zero.
pub fn aggregate_mbps(directions: &[ChannelRecord]) -> Option<f64> {
    let mut total = None;
    for record in directions {
        if let Some(estimate) = direction_estimate_mbps(record) {
            total = Some(total.unwrap_or(0.0) + estimate);
        }
    }
    total
}
