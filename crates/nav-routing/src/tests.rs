//! Unit tests for nav-routing.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use nav_core::{GeoPoint, NavConfig, SimTime};
    use nav_network::{Node, PathFinder, RoadNetworkBuilder, RoadNetworkDatabase, Way};

    use crate::{RecordingBroadcast, RouteCoordinator};

    /// ```text
    ///              D
    ///              ^ 3_B_D
    ///   A ------> B ======> C ------> E ----S----> G
    ///     1_A_B      2_B_C    4_C_E      5_E_G
    ///                7_B_C (parallel, slow, 100 m)
    /// ```
    /// Nodes sit on the equator 0.001° (≈ 111.2 m) apart.  C has a traffic
    /// light.  Database routes: "1" = A→B→C, "2" = A→B→D.
    pub fn network() -> Arc<RoadNetworkDatabase> {
        let mut b = RoadNetworkBuilder::new();
        for (id, lat, lon) in [
            ("A", 0.0, 0.0),
            ("B", 0.0, 0.001),
            ("D", 0.001, 0.001),
            ("E", 0.0, 0.003),
            ("S", 0.0, 0.0035),
            ("G", 0.0, 0.004),
        ] {
            b.add_node(Node::new(id, GeoPoint::new(lat, lon))).unwrap();
        }
        b.add_node(Node::new("C", GeoPoint::new(0.0, 0.002)).with_traffic_light()).unwrap();
        for (id, speed) in [("1", 13.9), ("2", 13.9), ("3", 8.3), ("4", 13.9), ("5", 13.9), ("7", 8.3)] {
            b.add_way(Way::new(id, "primary", speed)).unwrap();
        }
        b.add_connection("1_A_B", "1", &["A", "B"], 1, None).unwrap();
        b.add_connection("2_B_C", "2", &["B", "C"], 1, None).unwrap();
        b.add_connection("3_B_D", "3", &["B", "D"], 1, None).unwrap();
        b.add_connection("4_C_E", "4", &["C", "E"], 1, None).unwrap();
        b.add_connection("5_E_G", "5", &["E", "S", "G"], 1, None).unwrap();
        b.add_connection("7_B_C", "7", &["B", "C"], 1, Some(100.0)).unwrap();
        b.add_route("1", &["1_A_B", "2_B_C"]).unwrap();
        b.add_route("2", &["1_A_B", "3_B_D"]).unwrap();
        Arc::new(b.build())
    }

    pub fn coordinator<P: PathFinder>(
        path_finder: P,
        broadcast:   RecordingBroadcast,
    ) -> RouteCoordinator<P, RecordingBroadcast> {
        let mut c = RouteCoordinator::new(network(), NavConfig::default(), path_finder, broadcast).unwrap();
        c.initialize(SimTime::ZERO).unwrap();
        c
    }

    pub fn ids<T: ToString>(items: &[T]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }
}

// ── Suffix matching ───────────────────────────────────────────────────────────

#[cfg(test)]
mod suffix {
    use nav_core::ConnectionId;

    use crate::is_suffix;

    fn seq(ids: &[&str]) -> Vec<ConnectionId> {
        ids.iter().map(|&s| ConnectionId::from(s)).collect()
    }

    #[test]
    fn every_suffix_matches() {
        let route = seq(&["a", "b", "c", "d"]);
        for start in 0..=route.len() {
            assert!(is_suffix(&route[start..], &route), "suffix from {start}");
        }
    }

    #[test]
    fn non_suffixes_do_not_match() {
        let route = seq(&["a", "b", "c", "d"]);
        assert!(!is_suffix(&seq(&["a", "b"]), &route));
        assert!(!is_suffix(&seq(&["b", "c"]), &route));
        assert!(!is_suffix(&seq(&["b", "d"]), &route));
        assert!(!is_suffix(&seq(&["x", "a", "b", "c", "d"]), &route));
    }

    #[test]
    fn empty_route() {
        assert!(is_suffix(&[], &[]));
        assert!(!is_suffix(&seq(&["a"]), &[]));
    }
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use nav_core::RouteId;

    use crate::{Route, RouteRegistry, RoutingError};

    fn route(id: &str, connections: &[&str]) -> Route {
        Route {
            id:             RouteId::from(id),
            connection_ids: connections.iter().map(|&c| c.into()).collect(),
            node_ids:       Vec::new(),
            length_m:       0.0,
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut reg = RouteRegistry::new();
        reg.register(route("1", &["x"])).unwrap();
        assert!(matches!(reg.register(route("1", &["y"])), Err(RoutingError::DuplicateRoute(_))));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("1").unwrap().connection_ids[0].as_str(), "x");
    }

    #[test]
    fn bulk_is_all_or_nothing() {
        let mut reg = RouteRegistry::new();
        reg.register(route("1", &["x"])).unwrap();
        let batch = vec![route("2", &["y"]), route("1", &["z"])];
        assert!(reg.register_bulk(batch).is_err());
        assert_eq!(reg.len(), 1);
        assert!(!reg.contains("2"));

        let repeated = vec![route("3", &["y"]), route("3", &["z"])];
        assert!(reg.register_bulk(repeated).is_err());
        assert!(reg.register_bulk(vec![route("2", &["y"]), route("3", &["z"])]).is_ok());
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn suffix_lookup_in_registration_order() {
        let mut reg = RouteRegistry::new();
        reg.register(route("1", &["a", "b", "c"])).unwrap();
        reg.register(route("2", &["b", "c"])).unwrap();
        let found = reg.find_suffix_match(&["b".into(), "c".into()]).unwrap();
        assert_eq!(found.id.as_str(), "1");
        assert!(reg.find_suffix_match(&["a".into(), "b".into()]).is_none());
    }
}

// ── Materializer ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod materializer {
    use nav_core::{GeoPoint, NodeId, RouteId};
    use nav_network::{CandidateRoute, Node, RoadNetworkBuilder, RoadNetworkDatabase, Way};

    use crate::{approximate_cost, connection_sequence, flatten, RouteMaterializer, RoutingError, Shortest};

    use super::helpers::{ids, network};

    fn nodes(ids: &[&str]) -> Vec<NodeId> {
        ids.iter().map(|&n| NodeId::from(n)).collect()
    }

    #[test]
    fn ids_start_above_database_maximum() {
        let db = network();
        assert_eq!(RouteMaterializer::new(&db).peek_id().as_str(), "3");
        assert_eq!(RouteMaterializer::new(&RoadNetworkDatabase::empty()).peek_id().as_str(), "1");
    }

    #[test]
    fn non_numeric_ids_ignored() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(Node::new("a", GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(Node::new("b", GeoPoint::new(0.0, 0.001))).unwrap();
        b.add_way(Way::new("w", "primary", 10.0)).unwrap();
        b.add_connection("w_a_b", "w", &["a", "b"], 1, None).unwrap();
        for id in ["7", "main", "12", "r-40"] {
            b.add_route(id, &["w_a_b"]).unwrap();
        }
        assert_eq!(RouteMaterializer::new(&b.build()).peek_id().as_str(), "13");
    }

    #[test]
    fn reproduces_database_routes() {
        let db = network();
        let mut m = RouteMaterializer::new(&db);
        for existing in m.routes_from_database(&db) {
            let again = flatten(&db, &m.materialize(&db, &existing.node_ids).unwrap());
            assert_eq!(again.connection_ids, existing.connection_ids);
            assert_eq!(again.node_ids, existing.node_ids);
            assert!((again.length_m - existing.length_m).abs() < 1e-9);
        }
    }

    #[test]
    fn ids_strictly_increase() {
        let db = network();
        let mut m = RouteMaterializer::new(&db);
        let mut last = 2;
        for _ in 0..5 {
            let id = m.materialize(&db, &nodes(&["A", "B", "C"])).unwrap().id.as_number().unwrap();
            assert!(id > last);
            last = id;
        }
        assert_eq!(last, 7);
    }

    #[test]
    fn planning_edges_does_not_mint() {
        let db = network();
        let m = RouteMaterializer::new(&db);
        let candidate = CandidateRoute::from_connections(&db, vec!["4_C_E".into(), "5_E_G".into()]);
        let edges = m.candidate_edges(&db, &candidate).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(ids(&connection_sequence(&edges)), ["4_C_E", "5_E_G"]);
        assert_eq!(m.peek_id().as_str(), "3");
    }

    #[test]
    fn id_counter_saturates_at_maximum() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(Node::new("a", GeoPoint::new(0.0, 0.0))).unwrap();
        b.add_node(Node::new("b", GeoPoint::new(0.0, 0.001))).unwrap();
        b.add_way(Way::new("w", "primary", 10.0)).unwrap();
        b.add_connection("w_a_b", "w", &["a", "b"], 1, None).unwrap();
        b.add_route(u64::MAX.to_string(), &["w_a_b"]).unwrap();
        b.add_route("+7", &["w_a_b"]).unwrap();
        let db = b.build();

        let mut m = RouteMaterializer::new(&db);
        assert_eq!(m.peek_id(), RouteId::from_number(u64::MAX));
        let route = m.materialize(&db, &nodes(&["a", "b"])).unwrap();
        assert_eq!(route.id, RouteId::from_number(u64::MAX));
        assert_eq!(m.peek_id(), RouteId::from_number(u64::MAX));
    }

    #[test]
    fn missing_connection_is_illegal() {
        let db = network();
        let mut m = RouteMaterializer::new(&db);
        match m.materialize(&db, &nodes(&["A", "C"])) {
            Err(RoutingError::IllegalRoute { from, to }) => {
                assert_eq!((from.as_str(), to.as_str()), ("A", "C"));
            }
            other => panic!("expected IllegalRoute, got {other:?}"),
        }
        // Failures do not consume ids.
        assert_eq!(m.peek_id().as_str(), "3");
        assert!(matches!(m.materialize(&db, &nodes(&["A"])), Err(RoutingError::EmptyRoute)));
    }

    #[test]
    fn parallel_connections_follow_cost_policy() {
        let db = network();
        let fastest = RouteMaterializer::new(&db).materialize(&db, &nodes(&["B", "C"])).unwrap();
        assert_eq!(fastest.edges[0].connection.as_str(), "2_B_C");

        let shortest = RouteMaterializer::with_cost(&db, Shortest).materialize(&db, &nodes(&["B", "C"])).unwrap();
        assert_eq!(shortest.edges[0].connection.as_str(), "7_B_C");
    }

    #[test]
    fn shape_nodes_collapse_into_one_connection() {
        let db = network();
        let mut m = RouteMaterializer::new(&db);
        let route = flatten(&db, &m.materialize(&db, &nodes(&["C", "E", "S", "G"])).unwrap());
        assert_eq!(ids(&route.connection_ids), ["4_C_E", "5_E_G"]);
        assert_eq!(ids(&route.node_ids), ["C", "E", "S", "G"]);
        assert!((route.length_m - 222.39).abs() < 0.1, "got {}", route.length_m);
    }

    #[test]
    fn candidate_without_nodes_is_expanded() {
        let db = network();
        let mut m = RouteMaterializer::new(&db);
        let candidate = CandidateRoute {
            connection_ids: vec!["4_C_E".into(), "5_E_G".into()],
            node_ids:       Vec::new(),
            length_m:       0.0,
            time_s:         0.0,
        };
        let route = m.create_route(&db, &candidate).unwrap();
        assert_eq!(route.id.as_str(), "3");
        assert_eq!(ids(&route.node_ids), ["C", "E", "S", "G"]);
    }

    #[test]
    fn approximate_cost_uses_speed_limits() {
        let db = network();
        let candidate = CandidateRoute {
            connection_ids: vec!["1_A_B".into(), "7_B_C".into(), "nope".into()],
            node_ids:       Vec::new(),
            length_m:       0.0,
            time_s:         0.0,
        };
        let costed = approximate_cost(&db, &candidate);
        assert!((costed.length_m - 211.19).abs() < 0.1);
        assert!((costed.time_s - (111.19 / 13.9 + 100.0 / 8.3)).abs() < 0.01);
        assert_eq!(costed.connection_ids, candidate.connection_ids);
    }
}

// ── Route fixer ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod fixer {
    use nav_core::ConnectionId;

    use crate::RouteFixer;

    use super::helpers::{ids, network};

    fn seq(ids: &[&str]) -> Vec<ConnectionId> {
        ids.iter().map(|&s| ConnectionId::from(s)).collect()
    }

    #[test]
    fn contiguous_route_untouched() {
        let db = network();
        let route = seq(&["1_A_B", "2_B_C", "4_C_E"]);
        assert_eq!(RouteFixer::default().fix_route(&db, &route), route);
    }

    #[test]
    fn gap_bridged_with_shortest_chain() {
        let db = network();
        let fixed = RouteFixer::default().fix_route(&db, &seq(&["1_A_B", "4_C_E", "5_E_G"]));
        assert_eq!(ids(&fixed), ["1_A_B", "7_B_C", "4_C_E", "5_E_G"]);
    }

    #[test]
    fn depth_limit_leaves_route_unchanged() {
        let db = network();
        let route = seq(&["1_A_B", "4_C_E"]);
        assert_eq!(RouteFixer::new(1).fix_route(&db, &route), route);
        assert_eq!(ids(&RouteFixer::new(2).fix_route(&db, &route)), ["1_A_B", "7_B_C", "4_C_E"]);
    }

    #[test]
    fn unknown_or_unreachable_left_unchanged() {
        let db = network();
        let unknown = seq(&["1_A_B", "bogus"]);
        assert_eq!(RouteFixer::default().fix_route(&db, &unknown), unknown);
        // Nothing leaves D.
        let dead_end = seq(&["3_B_D", "4_C_E"]);
        assert_eq!(RouteFixer::default().fix_route(&db, &dead_end), dead_end);
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod coordinator {
    use nav_core::{CostFunction, GeoCircle, GeoPoint, NavConfig, SimTime, VehicleId};
    use nav_network::{CandidateRoute, DijkstraPathFinder, NoPathFinder, RoutingParameters, RoutingRequest};
    use nav_resolve::RoadPositionDescriptor;

    use crate::{MessageKind, NavMessage, NoopBroadcast, RecordingBroadcast, RouteCoordinator, RoutingError};

    use super::helpers::{coordinator, ids, network};

    fn veh() -> VehicleId {
        VehicleId::from("veh_0")
    }

    fn t(s: u64) -> SimTime {
        SimTime::from_secs(s)
    }

    #[test]
    fn initialize_registers_and_announces_once() {
        let c = coordinator(NoPathFinder, RecordingBroadcast::new());
        assert_eq!(c.registry().len(), 2);
        assert_eq!(ids(&c.route("1").unwrap().node_ids), ["A", "B", "C"]);
        assert_eq!(c.broadcast().messages.len(), 1);
        match &c.broadcast().messages[0] {
            NavMessage::RoutesInitialization { routes, .. } => assert_eq!(routes.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn initialize_twice_is_a_protocol_fault() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        assert!(matches!(c.initialize(t(1)), Err(RoutingError::DuplicateRoute(_))));
    }

    #[test]
    fn failed_initialization_broadcast_is_an_error() {
        let mut c = RouteCoordinator::new(
            network(),
            NavConfig::default(),
            NoPathFinder,
            RecordingBroadcast::rejecting(MessageKind::RoutesInitialization),
        )
        .unwrap();
        assert!(matches!(c.initialize(SimTime::ZERO), Err(RoutingError::Broadcast(_))));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = NavConfig { route_fixer_max_depth: 0, ..NavConfig::default() };
        let c = RouteCoordinator::new(network(), config, NoPathFinder, NoopBroadcast);
        assert!(matches!(c, Err(RoutingError::Config(_))));
    }

    #[test]
    fn candidate_on_current_route_keeps_it() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["2_B_C".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(after.id.as_str(), "1");
        assert_eq!(c.broadcast().messages.len(), 1);
    }

    #[test]
    fn candidate_matching_known_route_adopts_it() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["3_B_D".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(after.id.as_str(), "2");
        assert_eq!(c.registry().len(), 2);
        assert_eq!(c.broadcast().count(MessageKind::RouteRegistration), 0);
        assert_eq!(
            c.broadcast().messages.last(),
            Some(&NavMessage::RouteChange { time: t(5), vehicle: veh(), route: "2".into() })
        );
    }

    #[test]
    fn unknown_candidate_mints_new_route() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["2_B_C".into(), "4_C_E".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();

        assert_eq!(after.id.as_str(), "3");
        assert_eq!(ids(&after.connection_ids), ["2_B_C", "4_C_E"]);
        assert!(c.registry().contains("3"));

        let kinds: Vec<MessageKind> = c.broadcast().messages.iter().map(NavMessage::kind).collect();
        assert_eq!(kinds, [MessageKind::RoutesInitialization, MessageKind::RouteRegistration, MessageKind::RouteChange]);
        assert_eq!(
            c.broadcast().messages[2],
            NavMessage::RouteChange { time: t(5), vehicle: veh(), route: "3".into() }
        );

        // Asking again adopts the minted route instead of minting another.
        let again = c.switch_route(&VehicleId::from("veh_1"), &candidate, &current, t(6)).unwrap();
        assert_eq!(again.id.as_str(), "3");
        assert_eq!(c.registry().len(), 3);
    }

    #[test]
    fn failed_route_change_keeps_current_but_registration_persists() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::rejecting(MessageKind::RouteChange));
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["2_B_C".into(), "4_C_E".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(after.id.as_str(), "1");
        assert!(c.registry().contains("3"));
    }

    #[test]
    fn failed_registration_keeps_current_and_registers_nothing() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::rejecting(MessageKind::RouteRegistration));
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["2_B_C".into(), "4_C_E".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(after.id.as_str(), "1");
        assert_eq!(c.registry().len(), 2);
        assert_eq!(c.broadcast().count(MessageKind::RouteChange), 0);
    }

    #[test]
    fn illegal_candidate_surfaces_error() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute {
            connection_ids: vec!["x".into()],
            node_ids:       vec!["A".into(), "D".into()],
            length_m:       0.0,
            time_s:         0.0,
        };
        assert!(matches!(
            c.switch_route(&veh(), &candidate, &current, t(5)),
            Err(RoutingError::IllegalRoute { .. })
        ));
        assert_eq!(c.registry().len(), 2);
    }

    #[test]
    fn distance_along_route() {
        let c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let at_a = GeoPoint::new(0.0, 0.0);
        let d = c.distance_along("1", "B", "C", at_a).unwrap();
        assert!((d - 222.39).abs() < 0.1, "got {d}");
        assert_eq!(c.distance_along("1", "B", "Z", at_a).unwrap(), f64::INFINITY);
        assert!(matches!(c.distance_along("1", "C", "B", at_a), Err(RoutingError::InvalidArgument(_))));
        assert!(matches!(c.distance_along("1", "D", "C", at_a), Err(RoutingError::InvalidArgument(_))));
        assert!(matches!(c.distance_along("9", "B", "C", at_a), Err(RoutingError::UnknownRoute(_))));
    }

    #[test]
    fn next_node_matching_scans_forward() {
        let c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let mut pos = c.find_closest_road_position(GeoPoint::new(-0.0001, 0.0004), Some(90.0)).unwrap();
        assert_eq!(pos.upcoming_node.as_ref().map(|n| n.as_str()), Some("B"));

        let light = c.next_node_matching("1", &pos, |n| n.has_traffic_light).unwrap();
        assert_eq!(light.map(|n| n.id.as_str()), Some("C"));
        assert!(c.next_node_matching("1", &pos, |n| n.is_intersection).unwrap().is_none());

        pos.upcoming_node = Some("G".into());
        assert!(c.next_node_matching("1", &pos, |_| true).unwrap().is_none());
        assert!(c.next_node_matching("9", &pos, |_| true).is_err());
    }

    #[test]
    fn od_without_route_has_no_side_effects() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let area = GeoCircle::new(GeoPoint::new(0.0, 0.0), 50.0);
        assert!(matches!(c.create_route_for_od(&area, &area, t(1)), Err(RoutingError::NoRouteFound)));
        assert_eq!(c.registry().len(), 2);
        assert_eq!(c.broadcast().messages.len(), 1);
    }

    #[test]
    fn od_mints_then_reuses() {
        let mut c = coordinator(DijkstraPathFinder, RecordingBroadcast::new());
        let origin = GeoCircle::new(GeoPoint::new(0.0, 0.0), 0.0);
        let destination = GeoCircle::new(GeoPoint::new(0.0, 0.003), 0.0);

        let first = c.create_route_for_od(&origin, &destination, t(1)).unwrap();
        assert_eq!(first.route_id.as_str(), "3");
        assert_eq!(first.time, t(1));
        assert_eq!(ids(&c.route("3").unwrap().connection_ids), ["1_A_B", "2_B_C", "4_C_E"]);
        assert_eq!(c.broadcast().count(MessageKind::RouteRegistration), 1);

        let second = c.create_route_for_od(&origin, &destination, t(2)).unwrap();
        assert_eq!(second.route_id.as_str(), "3");
        assert_eq!(c.registry().len(), 3);
        assert_eq!(c.broadcast().count(MessageKind::RouteRegistration), 1);
    }

    #[test]
    fn od_to_known_destination_adopts_database_route() {
        let mut c = coordinator(DijkstraPathFinder, RecordingBroadcast::new());
        let origin = GeoCircle::new(GeoPoint::new(0.0, 0.0), 0.0);
        let destination = GeoCircle::new(GeoPoint::new(0.001, 0.001), 0.0);
        assert_eq!(c.create_route_for_od(&origin, &destination, t(1)).unwrap().route_id.as_str(), "2");
        assert_eq!(c.broadcast().messages.len(), 1);
    }

    #[test]
    fn od_registration_failure_registers_nothing() {
        let mut c = coordinator(DijkstraPathFinder, RecordingBroadcast::rejecting(MessageKind::RouteRegistration));
        let origin = GeoCircle::new(GeoPoint::new(0.0, 0.0), 0.0);
        let destination = GeoCircle::new(GeoPoint::new(0.0, 0.003), 0.0);
        assert!(matches!(
            c.create_route_for_od(&origin, &destination, t(1)),
            Err(RoutingError::Broadcast(_))
        ));
        assert_eq!(c.registry().len(), 2);
    }

    #[test]
    fn route_endpoints() {
        let c = coordinator(NoPathFinder, RecordingBroadcast::new());
        assert_eq!(c.source_position_of_route("2"), Some(GeoPoint::new(0.0, 0.0)));
        assert_eq!(c.target_position_of_route("2"), Some(GeoPoint::new(0.001, 0.001)));
        assert_eq!(c.target_position_of_route("9"), None);
    }

    #[test]
    fn connection_queries() {
        let c = coordinator(NoPathFinder, RecordingBroadcast::new());
        assert_eq!(c.length_of_connection("7_B_C"), Some(100.0));
        assert_eq!(c.max_speed_of_connection("7_B_C"), Some(8.3));
        assert_eq!(c.max_speed_of_connection("nope"), None);
        assert_eq!(c.find_closest_node(GeoPoint::new(0.0001, 0.0021)).map(|n| n.id.as_str()), Some("C"));
    }

    #[test]
    fn plain_routing_has_no_side_effects() {
        let c = coordinator(DijkstraPathFinder, RecordingBroadcast::new());
        let params = RoutingParameters::default().cost_function(CostFunction::Shortest).alternatives(1);
        let request = RoutingRequest::new(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.003), params);
        let response = c.find_routes(&request);
        assert_eq!(ids(&response.best.unwrap().connection_ids), ["1_A_B", "7_B_C", "4_C_E"]);
        assert_eq!(response.alternatives.len(), 1);
        assert_eq!(c.registry().len(), 2);

        let costed = c.approximate_costs(&response.alternatives);
        assert_eq!(costed.len(), 1);
        assert!(costed[0].time_s > 0.0);
    }

    #[test]
    fn refine_and_fix_through_coordinator() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let pos = c.refine_road_position(&RoadPositionDescriptor::on_connection("5_E_G", 80.0));
        assert_eq!(pos.previous_node.as_ref().map(|n| n.as_str()), Some("S"));
        assert_eq!(pos.upcoming_node.as_ref().map(|n| n.as_str()), Some("G"));

        let fixed = c.fix_route(&["1_A_B".into(), "4_C_E".into()]);
        assert_eq!(ids(&fixed), ["1_A_B", "7_B_C", "4_C_E"]);
    }

    #[test]
    fn shortest_policy_for_new_routes() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new()).with_connection_cost(crate::Shortest);
        let current = c.route("2").unwrap().clone();
        let candidate = CandidateRoute {
            connection_ids: vec!["2_B_C".into(), "4_C_E".into()],
            node_ids:       vec!["B".into(), "C".into(), "E".into()],
            length_m:       0.0,
            time_s:         0.0,
        };
        let after = c.switch_route(&veh(), &candidate, &current, t(3)).unwrap();
        assert_eq!(after.id.as_str(), "3");
        assert_eq!(ids(&after.connection_ids), ["7_B_C", "4_C_E"]);
    }

    #[test]
    fn slow_parallel_candidate_registered_once() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        // Materializes onto the faster 2_B_C.
        let candidate = CandidateRoute::from_connections(c.database(), vec!["7_B_C".into(), "4_C_E".into()]);

        let first = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(first.id.as_str(), "3");
        assert_eq!(ids(&first.connection_ids), ["2_B_C", "4_C_E"]);

        let second = c.switch_route(&VehicleId::from("veh_1"), &candidate, &current, t(6)).unwrap();
        assert_eq!(second.id.as_str(), "3");
        assert_eq!(c.registry().len(), 3);
        assert_eq!(c.broadcast().count(MessageKind::RouteRegistration), 1);
        assert_eq!(c.broadcast().count(MessageKind::RouteChange), 2);
    }

    #[test]
    fn materialized_candidate_on_current_route_keeps_it() {
        let mut c = coordinator(NoPathFinder, RecordingBroadcast::new());
        let current = c.route("1").unwrap().clone();
        let candidate = CandidateRoute::from_connections(c.database(), vec!["7_B_C".into()]);
        let after = c.switch_route(&veh(), &candidate, &current, t(5)).unwrap();
        assert_eq!(after.id.as_str(), "1");
        assert_eq!(c.registry().len(), 2);
        assert_eq!(c.broadcast().messages.len(), 1);
    }

    #[test]
    fn repeated_od_with_shortest_paths_reuses_route() {
        let config = NavConfig { cost_function: CostFunction::Shortest, ..NavConfig::default() };
        let mut c = RouteCoordinator::new(network(), config, DijkstraPathFinder, RecordingBroadcast::new()).unwrap();
        c.initialize(SimTime::ZERO).unwrap();
        let origin = GeoCircle::new(GeoPoint::new(0.0, 0.0), 0.0);
        let destination = GeoCircle::new(GeoPoint::new(0.0, 0.003), 0.0);

        // The path finder prefers the short 7_B_C; materialization keeps the fast 2_B_C.
        for i in 1..=3 {
            let departure = c.create_route_for_od(&origin, &destination, t(i)).unwrap();
            assert_eq!(departure.route_id.as_str(), "3", "departure {i}");
        }
        assert_eq!(ids(&c.route("3").unwrap().connection_ids), ["1_A_B", "2_B_C", "4_C_E"]);
        assert_eq!(c.registry().len(), 3);
        assert_eq!(c.broadcast().count(MessageKind::RouteRegistration), 1);
    }
}
