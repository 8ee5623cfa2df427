//! Duplex Link Reconstruction
//!
//! Rebuilds physical duplex microwave links from unidirectional licensing
//! records. Each record describes one frequency/polarization assignment
//! between two fixed sites; the pipeline groups records into physical links,
//! classifies the RF architecture of each link, and fixes a canonical
//! endpoint pair plus a stable direction display order.
//!
//! # Pipeline
//!
//! ```text
//! records -> grouper -> classifier -> orderer -> LinkSet
//! ```
//!
//! # Architecture table
//!
//! Classification inspects the most populous directional cohort of a group:
//!
//! | Cohort contents                      | Architecture   |
//! |--------------------------------------|----------------|
//! | single record                        | FDD            |
//! | one frequency, >1 polarizations      | XPIC           |
//! | >1 frequencies, one polarization     | 2+0 FDD        |
//! | one frequency, one polarization      | Space diversity|
//! | anything else                        | Unknown        |
//!
//! The table was calibrated against a regional permit dataset and is treated
//! as a presentation contract, reproduced exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod classifier;
pub mod grouper;
pub mod orderer;
pub mod throughput;

pub use classifier::{classify_group, Classification};
pub use grouper::group_records;
pub use orderer::{canonical_endpoints, order_directions};

/// Operator bucket for records with no operator id. Keeps operator-less paths
/// from merging with a real operator's link that shares coordinates.
pub const UNKNOWN_OPERATOR: &str = "unknown-operator";

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Record not found: {0}")]
    RecordNotFound(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// One fixed site of a link. Coordinates arrive rounded to 6 decimals
/// upstream; equality is exact on those rounded values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl Endpoint {
    /// Canonical `"lat,lon"` key used for grouping and endpoint ordering.
    /// Fixed 6-decimal rendering matches the upstream rounding.
    pub fn key(&self) -> String {
        format!("{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// One unidirectional frequency/polarization assignment from the permit
/// register. Read-only input to the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: String,
    pub tx: Endpoint,
    pub rx: Endpoint,
    pub frequency_mhz: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_width_mhz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modulation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_expiry: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<String>,
}

impl ChannelRecord {
    /// Operator id, or the unknown-operator sentinel.
    pub fn operator(&self) -> &str {
        self.operator_id.as_deref().unwrap_or(UNKNOWN_OPERATOR)
    }

    /// Literal directed `tx->rx` key (not canonicalized).
    pub fn directed_key(&self) -> String {
        format!("{}->{}", self.tx.key(), self.rx.key())
    }

    /// Canonical unordered site-pair key: smaller endpoint key first.
    pub fn path_key(&self) -> String {
        let tx = self.tx.key();
        let rx = self.rx.key();
        if tx <= rx {
            format!("{tx}|{rx}")
        } else {
            format!("{rx}|{tx}")
        }
    }

    /// True when the permit lapsed before `now`.
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.permit_expiry.map_or(false, |expiry| expiry < now)
    }
}

/// RF architecture of a duplex link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    Fdd,
    TwoPlusZeroFdd,
    Xpic,
    SpaceDiversity,
    Unknown,
}

impl Architecture {
    /// Display label for the details panel
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fdd => "FDD",
            Self::TwoPlusZeroFdd => "2+0 FDD",
            Self::Xpic => "XPIC",
            Self::SpaceDiversity => "Space diversity",
            Self::Unknown => "Unknown",
        }
    }
}

/// One reconstructed physical link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplexLink {
    pub group_key: String,
    /// Canonical endpoint pair: `endpoint_a.key() <= endpoint_b.key()`
    pub endpoint_a: Endpoint,
    pub endpoint_b: Endpoint,
    /// Member records in display order; never empty
    pub directions: Vec<ChannelRecord>,
    pub architecture: Architecture,
    pub is_expired: bool,
}

impl DuplexLink {
    /// Path length between the canonical endpoints in meters
    pub fn distance_m(&self) -> f64 {
        radio_geo::haversine_m(
            self.endpoint_a.latitude,
            self.endpoint_a.longitude,
            self.endpoint_b.latitude,
            self.endpoint_b.longitude,
        )
    }

    /// Initial bearing from endpoint A toward endpoint B, [0, 360) degrees
    pub fn bearing_deg(&self) -> f64 {
        radio_geo::initial_bearing_deg(
            self.endpoint_a.latitude,
            self.endpoint_a.longitude,
            self.endpoint_b.latitude,
            self.endpoint_b.longitude,
        )
    }

    /// Sum of per-direction throughput estimates, or `None` when no direction
    /// carries enough data for an estimate
    pub fn aggregate_throughput_mbps(&self) -> Option<f64> {
        throughput::aggregate_mbps(&self.directions)
    }

    pub fn contains_record(&self, record_id: &str) -> bool {
        self.directions.iter().any(|r| r.id == record_id)
    }
}

/// Reconstructed link set for one record snapshot.
///
/// Built fresh on every invocation; nothing is mutated in place, so
/// overlapping viewport fetches can each hold their own set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkSet {
    links: Vec<DuplexLink>,
}

impl LinkSet {
    /// Run the full pipeline over a record snapshot.
    ///
    /// `now` is the expiry reference instant; every input record lands in
    /// exactly one output link.
    pub fn build(records: &[ChannelRecord], now: DateTime<Utc>) -> Self {
        let groups = grouper::group_records(records);
        info!(
            records = records.len(),
            links = groups.len(),
            "assembled duplex links"
        );

        let mut links = Vec::with_capacity(groups.len());
        for (group_key, members) in groups {
            // Grouper never emits an empty group
            let Some(first) = members.first() else {
                continue;
            };
            let classification = classifier::classify_group(&members, now);
            let (endpoint_a, endpoint_b) = orderer::canonical_endpoints(first);
            let directions =
                orderer::order_directions(members, endpoint_a, classification.architecture);
            links.push(DuplexLink {
                group_key,
                endpoint_a,
                endpoint_b,
                directions,
                architecture: classification.architecture,
                is_expired: classification.is_expired,
            });
        }
        Self { links }
    }

    /// `build` against the wall clock
    pub fn build_now(records: &[ChannelRecord]) -> Self {
        Self::build(records, Utc::now())
    }

    pub fn links(&self) -> &[DuplexLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DuplexLink> {
        self.links.iter()
    }

    /// Resolve a rendered segment back to its owning duplex link.
    pub fn find_by_record_id(&self, record_id: &str) -> Result<&DuplexLink> {
        self.links
            .iter()
            .find(|link| link.contains_record(record_id))
            .ok_or_else(|| LinkError::RecordNotFound(record_id.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use chrono::TimeZone;

    pub fn endpoint(lat: f64, lon: f64) -> Endpoint {
        Endpoint { latitude: lat, longitude: lon }
    }

    pub fn record(id: &str, tx: Endpoint, rx: Endpoint, freq: f64, pol: Option<&str>) -> ChannelRecord {
        ChannelRecord {
            id: id.to_string(),
            tx,
            rx,
            frequency_mhz: freq,
            polarization: pol.map(str::to_string),
            channel_width_mhz: None,
            modulation: None,
            permit_number: None,
            permit_expiry: None,
            operator_id: Some("OP-1".to_string()),
        }
    }

    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }
}
