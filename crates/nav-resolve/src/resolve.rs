//! Pure resolution functions: descriptor + database → entity.
//!
//! None of these fail loudly.  Whatever cannot be derived comes back as
//! `None` (or as a `None` field of the returned [`RoadPosition`]).

use log::debug;

use nav_core::{ConnectionId, GeoPoint, NodeId};
use nav_network::{Connection, EdgeHit, Node, RoadNetworkDatabase};

use crate::descriptor::{ConnectionDescriptor, NodeDescriptor, RoadPosition, RoadPositionDescriptor};

pub fn resolve_node<'db>(db: &'db RoadNetworkDatabase, d: &NodeDescriptor) -> Option<&'db Node> {
    db.node(d.id.as_str())
}

/// Resolve a connection, trying in order:
///
/// 1. the descriptor's id, if the database knows it;
/// 2. the composed `<way>_<start>_<end>` id, when all three are known;
/// 3. the first connection, in `start`'s adjacency order, leaving `start`
///    and arriving at `end` (restricted to `way` when known).
///
/// Parallel connections between the same nodes resolve to the one added
/// first.
pub fn resolve_connection<'db>(
    db: &'db RoadNetworkDatabase,
    d:  &ConnectionDescriptor,
) -> Option<&'db Connection> {
    if let Some(con) = d.id.as_ref().and_then(|id| db.connection(id.as_str())) {
        return Some(con);
    }
    let (Some(start), Some(end)) = (&d.start, &d.end) else {
        return None;
    };
    if let Some(way) = &d.way {
        if let Some(con) = db.connection(ConnectionId::compose(way, start, end).as_str()) {
            return Some(con);
        }
    }

    let arriving = db.arriving(end.as_str());
    db.leaving(start.as_str())
        .iter()
        .filter(|id| arriving.contains(id))
        .filter_map(|id| db.connection(id.as_str()))
        .find(|con| d.way.as_ref().is_none_or(|w| &con.way == w))
}

/// The connection lookup implied by a road position descriptor.
pub fn position_connection(d: &RoadPositionDescriptor) -> ConnectionDescriptor {
    ConnectionDescriptor {
        id:    d.connection.clone(),
        way:   None,
        start: d.previous_node.clone(),
        end:   d.upcoming_node.clone(),
    }
}

/// Complete a reported road position.
///
/// The connection comes from the reported id or, failing that, from the
/// previous/upcoming node pair.  A single known node is completed with its
/// neighbour on the connection; with neither node known the offset locates
/// the segment.
pub fn resolve_road_position(db: &RoadNetworkDatabase, d: &RoadPositionDescriptor) -> RoadPosition {
    complete_road_position(db, d, resolve_connection(db, &position_connection(d)))
}

/// [`resolve_road_position`] with the connection already resolved.
pub fn complete_road_position(
    db:         &RoadNetworkDatabase,
    d:          &RoadPositionDescriptor,
    connection: Option<&Connection>,
) -> RoadPosition {
    let mut previous = d.previous_node.clone();
    let mut upcoming = d.upcoming_node.clone();
    if let Some(con) = connection {
        if previous.is_none() && upcoming.is_none() {
            if d.offset_m > 0.0 {
                if let Some((p, u)) = segment_at_offset(db, con, d.offset_m) {
                    previous = Some(p);
                    upcoming = Some(u);
                }
            }
        } else if upcoming.is_none() {
            upcoming = previous.as_ref().and_then(|p| con.node_after(p)).cloned();
        } else if previous.is_none() {
            previous = upcoming.as_ref().and_then(|u| con.node_before(u)).cloned();
        }
    } else {
        debug!(
            "road position on {:?} ({:?} -> {:?}) has no known connection",
            d.connection, d.previous_node, d.upcoming_node
        );
    }

    RoadPosition {
        connection:     connection.map(|c| c.id.clone()).or_else(|| d.connection.clone()),
        previous_node:  previous,
        upcoming_node:  upcoming,
        lane_index:     d.lane_index,
        lateral_offset: d.lateral_offset,
        offset_m:       d.offset_m,
    }
}

/// The node pair bracketing `offset_m` metres from the start of `con`.
/// Offsets past the end map to the last segment.
fn segment_at_offset(db: &RoadNetworkDatabase, con: &Connection, offset_m: f64) -> Option<(NodeId, NodeId)> {
    let last = con.nodes.len().saturating_sub(2);
    let mut travelled = 0.0;
    for (i, pair) in con.nodes.windows(2).enumerate() {
        let a = db.node(pair[0].as_str())?.position?;
        let b = db.node(pair[1].as_str())?.position?;
        travelled += a.distance_m(b);
        if travelled > offset_m || i == last {
            return Some((pair[0].clone(), pair[1].clone()));
        }
    }
    None
}

/// Road position of `point` projected onto the segment of `hit`.
///
/// The offset counts from the start of the connection: the length of the
/// segments before the hit plus the projected distance, clamped to the
/// segment.
pub fn road_position_on_edge(db: &RoadNetworkDatabase, hit: &EdgeHit, point: GeoPoint) -> RoadPosition {
    let mut offset_m = 0.0;
    if let Some(con) = db.connection(hit.connection.as_str()) {
        let positions: Vec<Option<GeoPoint>> =
            con.nodes.iter().map(|n| db.node(n.as_str()).and_then(|n| n.position)).collect();
        let seg = con.index_of(&hit.previous_node).unwrap_or(0);

        offset_m = positions[..=seg]
            .windows(2)
            .filter_map(|w| Some(w[0]?.distance_m(w[1]?)))
            .sum();
        if let (Some(a), Some(b)) = (positions[seg], positions.get(seg + 1).copied().flatten()) {
            let projected = point.closest_point_on_segment(a, b);
            offset_m += a.distance_m(projected).min(a.distance_m(b));
        }
    }

    RoadPosition {
        connection:     Some(hit.connection.clone()),
        previous_node:  Some(hit.previous_node.clone()),
        upcoming_node:  Some(hit.next_node.clone()),
        lane_index:     0,
        lateral_offset: 0.0,
        offset_m,
    }
}
