//! Synthetic arterial corridor with a parallel bypass.
//!
//! ```text
//!   west ── w1 ── mid ── e1 ── east
//!            \            /
//!             ── bypass ──        (motorway, two shape nodes)
//! ```
//! Every road is two-way.  Intersections `w1` and `e1` are signalised.

use nav_core::GeoPoint;
use nav_network::{NetworkResult, Node, RoadNetworkBuilder, RoadNetworkDatabase, Way};

const LAT: f64 = 30.690;

/// Two one-way connections (`<way>_<a>_<b>` and back) following `nodes`.
fn two_way(b: &mut RoadNetworkBuilder, way: &str, nodes: &[&str], lanes: u32) -> NetworkResult<()> {
    let forward = format!("{way}_{}_{}", nodes[0], nodes[nodes.len() - 1]);
    b.add_connection(forward, way, nodes, lanes, None)?;

    let reversed: Vec<&str> = nodes.iter().rev().copied().collect();
    let backward = format!("{way}_{}_{}", reversed[0], reversed[reversed.len() - 1]);
    b.add_connection(backward, way, &reversed, lanes, None)?;
    Ok(())
}

pub fn build_network() -> NetworkResult<RoadNetworkDatabase> {
    let mut b = RoadNetworkBuilder::new();

    b.add_node(Node::new("west", GeoPoint::new(LAT, -88.080)))?;
    b.add_node(Node::new("w1",   GeoPoint::new(LAT, -88.070)).with_traffic_light().with_intersection())?;
    b.add_node(Node::new("mid",  GeoPoint::new(LAT, -88.060)))?;
    b.add_node(Node::new("e1",   GeoPoint::new(LAT, -88.050)).with_traffic_light().with_intersection())?;
    b.add_node(Node::new("east", GeoPoint::new(LAT, -88.040)))?;
    b.add_node(Node::new("by1",  GeoPoint::new(LAT - 0.004, -88.065)))?;
    b.add_node(Node::new("by2",  GeoPoint::new(LAT - 0.004, -88.055)))?;

    // ~50 km/h arterial, ~100 km/h bypass.
    b.add_way(Way::new("10", "primary",  13.9))?;
    b.add_way(Way::new("11", "primary",  13.9))?;
    b.add_way(Way::new("12", "primary",  13.9))?;
    b.add_way(Way::new("13", "primary",  13.9))?;
    b.add_way(Way::new("20", "motorway", 27.8))?;

    two_way(&mut b, "10", &["west", "w1"], 2)?;
    two_way(&mut b, "11", &["w1", "mid"], 1)?;
    two_way(&mut b, "12", &["mid", "e1"], 1)?;
    two_way(&mut b, "13", &["e1", "east"], 2)?;
    two_way(&mut b, "20", &["w1", "by1", "by2", "e1"], 2)?;

    // Scenario routes loaded with the network.
    b.add_route("1", &["10_west_w1", "11_w1_mid", "12_mid_e1", "13_e1_east"])?;
    b.add_route("2", &["13_east_e1", "12_e1_mid", "11_mid_w1", "10_w1_west"])?;

    Ok(b.build())
}
