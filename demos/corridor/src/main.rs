//! corridor: navigation walkthrough on a small synthetic network.
//!
//! Loads an arterial corridor with two scenario routes, then drives the
//! route coordinator the way a traffic simulator would: origin/destination
//! departures, a mid-trip reroute onto the bypass, distance queries and a
//! route repair.  Set `RUST_LOG=debug` to see every decision.

mod network;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use nav_core::{ConnectionId, GeoCircle, GeoPoint, NavConfig, SimTime, VehicleId};
use nav_network::{DijkstraPathFinder, RoutingParameters, RoutingRequest};
use nav_routing::{MessageKind, RecordingBroadcast, RouteCoordinator};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:           u64 = 42;
const VEHICLE_COUNT:  u64 = 5;
const AREA_RADIUS_M:  f64 = 40.0;

fn main() -> Result<()> {
    env_logger::init();

    // 1. Road network.
    let db = Arc::new(build_network()?);
    println!(
        "Road network: {} nodes, {} connections, {} routes",
        db.node_count(),
        db.connection_count(),
        db.routes().len()
    );

    // 2. Coordinator.
    let config = NavConfig { seed: SEED, alternative_routes: 1, ..NavConfig::default() };
    let mut nav = RouteCoordinator::new(db, config, DijkstraPathFinder, RecordingBroadcast::new())?;
    nav.initialize(SimTime::ZERO)?;

    // 3. Departures from the west end to the east end.
    let origin      = GeoCircle::new(GeoPoint::new(30.690, -88.080), AREA_RADIUS_M);
    let destination = GeoCircle::new(GeoPoint::new(30.690, -88.040), AREA_RADIUS_M);
    for i in 0..VEHICLE_COUNT {
        let departure = nav.create_route_for_od(&origin, &destination, SimTime::from_secs(i * 10))?;
        println!("veh_{i}: departs at {:>4.0} s on route {}", departure.time.as_secs_f64(), departure.route_id);
    }

    // 4. A vehicle on route "1" approaching w1.
    let vehicle = VehicleId::from("veh_0");
    let here = GeoPoint::new(30.6901, -88.0750);
    let position = nav
        .find_closest_road_position(here, Some(90.0))
        .context("vehicle is off the network")?;
    let upcoming = position.upcoming_node.clone().context("position has no upcoming node")?;
    println!("{vehicle} is on {:?} heading for {upcoming}", position.connection);

    if let Some(light) = nav.next_node_matching("1", &position, |n| n.has_traffic_light)? {
        let d = nav.distance_along("1", upcoming.as_str(), light.id.as_str(), here)?;
        println!("  next traffic light: {} in {d:.0} m", light.id);
    }
    let to_end = nav.distance_along("1", upcoming.as_str(), "east", here)?;
    println!("  remaining distance on route 1: {to_end:.0} m");

    // 5. Reroute from w1 over the fastest path.
    let request = RoutingRequest::new(
        GeoPoint::new(30.690, -88.070),
        GeoPoint::new(30.690, -88.040),
        RoutingParameters::default().alternatives(1),
    );
    let response = nav.find_routes(&request);
    let best = response.best.context("no path from w1 to east")?;
    for alt in nav.approximate_costs(&response.alternatives) {
        println!("  alternative: {:.0} m, {:.0} s", alt.length_m, alt.time_s);
    }

    let current = nav.route("1").context("route 1 missing")?.clone();
    let switched = nav.switch_route(&vehicle, &best, &current, SimTime::from_secs(60))?;
    println!(
        "{vehicle} now follows route {} ({:.0} m): {}",
        switched.id,
        switched.length_m,
        switched.connection_ids.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" → ")
    );

    // 6. Repair a route with a gap between w1 and e1.
    let gappy: [ConnectionId; 2] = ["10_west_w1".into(), "13_e1_east".into()];
    let fixed = nav.fix_route(&gappy);
    println!(
        "fixed route: {}",
        fixed.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(" → ")
    );

    // 7. Summary.
    let sent = nav.broadcast();
    println!();
    println!("{:<22} {:>5}", "Message", "Count");
    println!("{}", "-".repeat(28));
    for kind in [MessageKind::RoutesInitialization, MessageKind::RouteRegistration, MessageKind::RouteChange] {
        println!("{:<22} {:>5}", format!("{kind:?}"), sent.count(kind));
    }
    info!("{} routes registered", nav.registry().len());

    Ok(())
}
