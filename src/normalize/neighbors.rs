//! Routing neighbor normalization (BGP and OSPF).
//!
//! Vendors disagree on both the key holding a session's state and its
//! encoding. A BGP neighbor is up iff its state is one of
//! [`BGP_UP_STATES`]; an OSPF neighbor is up iff its adjacency is `Full`
//! (optionally with a role suffix such as `FULL/DR`). Everything else,
//! including a missing state, is down and keeps the literal value for
//! diagnostics.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::facts::RawFacts;
use crate::utils::constants::{BGP_UP_STATES, OSPF_FULL_STATE};
use crate::utils::math::as_state;

/// Keys that may hold a neighbor's state, in lookup order
const STATE_KEYS: [&str; 3] = ["state", "peer_state", "status"];

/// Keys that may hold a neighbor's address or identifier
const PEER_KEYS: [&str; 4] = ["peer", "neighbor", "address", "neighbor_id"];

// ═══════════════════════════════════════════════════════════════════════════════
// PROTOCOL
// ═══════════════════════════════════════════════════════════════════════════════

/// Routing protocol whose neighbors are being read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// BGP peers from `neighbors`
    Bgp,
    /// OSPF adjacencies from `ospf.neighbors`
    Ospf,
}

impl Protocol {
    /// Whether a literal state means the session is up
    pub fn is_up(&self, state: &str) -> bool {
        match self {
            Protocol::Bgp => BGP_UP_STATES.contains(&state),
            Protocol::Ospf => {
                state.eq_ignore_ascii_case(OSPF_FULL_STATE)
                    || state.to_ascii_uppercase().starts_with("FULL/")
            }
        }
    }

    fn section<'a>(&self, facts: &'a RawFacts) -> Option<&'a Value> {
        match self {
            Protocol::Bgp => facts.get("neighbors"),
            Protocol::Ospf => facts.mapping("ospf").and_then(|ospf| ospf.get("neighbors")),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NEIGHBOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionState {
    /// Session is up
    Established,
    /// Session is anything but up
    Down,
}

/// One canonical neighbor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    /// Peer address or identifier, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    /// Canonical state
    pub state: SessionState,
    /// State exactly as the device reported it
    pub raw_state: Option<String>,
}

impl Neighbor {
    fn from_record(protocol: Protocol, record: &Value, key: Option<&str>) -> Self {
        let fields = record.as_object();
        let raw_state = fields.and_then(first_state).or_else(|| {
            // Some collectors flatten the map to `peer -> state`
            fields.is_none().then(|| as_state(record)).flatten()
        });
        let peer = fields
            .and_then(|f| PEER_KEYS.iter().find_map(|k| f.get(*k).and_then(as_state)))
            .or_else(|| key.map(str::to_string));

        let state = match raw_state.as_deref() {
            Some(s) if protocol.is_up(s) => SessionState::Established,
            _ => SessionState::Down,
        };

        Self { peer, state, raw_state }
    }

    /// Whether the session is up
    pub fn is_up(&self) -> bool {
        self.state == SessionState::Established
    }
}

fn first_state(fields: &Map<String, Value>) -> Option<String> {
    STATE_KEYS
        .iter()
        .find_map(|key| fields.get(*key).and_then(as_state))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANONICAL METRIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical neighbor table with derived counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborMetric {
    /// Protocol the table belongs to
    pub protocol: Protocol,
    /// Neighbors in reported order (sorted by peer for keyed tables)
    pub neighbors: Vec<Neighbor>,
    /// Neighbors up
    pub up_count: usize,
    /// Neighbors down
    pub down_count: usize,
    /// All neighbors
    pub total_count: usize,
}

impl NeighborMetric {
    fn from_neighbors(protocol: Protocol, neighbors: Vec<Neighbor>) -> Self {
        let up_count = neighbors.iter().filter(|n| n.is_up()).count();
        let total_count = neighbors.len();
        Self {
            protocol,
            neighbors,
            up_count,
            down_count: total_count - up_count,
            total_count,
        }
    }

    /// Neighbors that are not up
    pub fn down_neighbors(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbors.iter().filter(|n| !n.is_up())
    }

    /// Neighbors that are up
    pub fn up_neighbors(&self) -> impl Iterator<Item = &Neighbor> {
        self.neighbors.iter().filter(|n| n.is_up())
    }
}

/// Normalize the neighbor table for a protocol.
///
/// Accepts a sequence of neighbor records or a mapping keyed by peer.
/// Anything else reads as an empty table.
pub fn normalize(facts: &RawFacts, protocol: Protocol) -> NeighborMetric {
    let neighbors = match protocol.section(facts) {
        Some(Value::Array(records)) => records
            .iter()
            .map(|record| Neighbor::from_record(protocol, record, None))
            .collect(),
        Some(Value::Object(by_peer)) => by_peer
            .iter()
            .map(|(peer, record)| Neighbor::from_record(protocol, record, Some(peer)))
            .collect(),
        Some(other) => {
            tracing::warn!(?protocol, found = ?other, "neighbor table is neither a list nor a mapping");
            Vec::new()
        }
        None => Vec::new(),
    };

    NeighborMetric::from_neighbors(protocol, neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn facts(value: Value) -> RawFacts {
        RawFacts::from_value(value).unwrap()
    }

    #[test]
    fn test_vendor_state_encodings() {
        let metric = normalize(
            &facts(json!({"neighbors": [
                {"peer": "10.0.0.1", "state": "Established"},
                {"peer": "10.0.0.2", "peer_state": 1},
                {"peer": "10.0.0.3", "status": "Established/OpenConfirm"},
                {"peer": "10.0.0.4", "state": "Idle"},
                {"peer": "10.0.0.5"}
            ]})),
            Protocol::Bgp,
        );

        assert_eq!(metric.up_count, 3);
        assert_eq!(metric.down_count, 2);
        assert_eq!(metric.total_count, 5);

        let down: Vec<_> = metric.down_neighbors().collect();
        assert_eq!(down[0].raw_state.as_deref(), Some("Idle"));
        assert_eq!(down[1].raw_state, None);
    }

    #[test]
    fn test_state_key_precedence() {
        let metric = normalize(
            &facts(json!({"neighbors": [{"state": "Active", "status": "Established"}]})),
            Protocol::Bgp,
        );
        assert_eq!(metric.up_count, 0);
        assert_eq!(metric.neighbors[0].raw_state.as_deref(), Some("Active"));
    }

    #[test]
    fn test_state_match_is_exact_for_bgp() {
        let metric = normalize(
            &facts(json!({"neighbors": [{"state": "established"}]})),
            Protocol::Bgp,
        );
        assert_eq!(metric.up_count, 0);
    }

    #[test]
    fn test_keyed_by_peer() {
        let metric = normalize(
            &facts(json!({"neighbors": {
                "192.0.2.1": {"state": "Established"},
                "192.0.2.2": "Connect"
            }})),
            Protocol::Bgp,
        );
        assert_eq!(metric.total_count, 2);
        assert_eq!(metric.up_count, 1);
        assert_eq!(metric.neighbors[1].peer.as_deref(), Some("192.0.2.2"));
        assert_eq!(metric.neighbors[1].raw_state.as_deref(), Some("Connect"));
    }

    #[test]
    fn test_missing_or_malformed_table() {
        assert_eq!(normalize(&facts(json!({})), Protocol::Bgp).total_count, 0);
        assert_eq!(normalize(&facts(json!({"neighbors": 4})), Protocol::Bgp).total_count, 0);
    }

    #[test]
    fn test_ospf_full_adjacency() {
        let metric = normalize(
            &facts(json!({"ospf": {"neighbors": [
                {"neighbor_id": "1.1.1.1", "state": "Full"},
                {"neighbor_id": "2.2.2.2", "state": "FULL/DR"},
                {"neighbor_id": "3.3.3.3", "state": "2WAY/DROTHER"},
                {"neighbor_id": "4.4.4.4", "state": "ExStart"}
            ]}})),
            Protocol::Ospf,
        );
        assert_eq!(metric.up_count, 2);
        assert_eq!(metric.total_count, 4);
        assert_eq!(metric.neighbors[0].peer.as_deref(), Some("1.1.1.1"));
    }
}
