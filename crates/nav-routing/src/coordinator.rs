//! `RouteCoordinator`: the single owner of the route registry.
//!
//! # Route switching
//!
//! A vehicle asking to follow a candidate path ends up on exactly one
//! canonical route:
//!
//! 1. the candidate is a suffix of the vehicle's current route → keep it;
//! 2. a registered route ends with the candidate → adopt that route;
//! 3. otherwise materialize it.  The cost policy may pick other parallel
//!    connections than the candidate named, so steps 1 and 2 are repeated
//!    with the materialized connections before a new id is minted,
//!    registered and announced.
//!
//! Every switch is announced with a route-change message.  If an
//! announcement fails the vehicle stays on its current route.  A route that
//! was already registered stays registered.

use std::sync::Arc;

use log::{debug, error, info};

use nav_core::{ConnectionId, GeoCircle, GeoPoint, NavConfig, SimRng, SimTime, VehicleId};
use nav_network::{
    CandidateRoute, Node, PathFinder, RoadNetworkDatabase, RoutingParameters, RoutingRequest,
    RoutingResponse,
};
use nav_resolve::{EntityResolver, RoadPosition, RoadPositionDescriptor};

use crate::broadcast::Broadcast;
use crate::cost::{ConnectionCost, Fastest};
use crate::fixer::RouteFixer;
use crate::materializer::{approximate_cost, connection_sequence, flatten, RouteMaterializer};
use crate::route::is_suffix;
use crate::{Route, RouteRegistry, RoutingError, RoutingResult, VehicleDeparture};

/// Outcome of matching a candidate against known routes.
enum Placement {
    Known(Route),
    New(Route),
}

/// Orchestrates route creation, deduplication and propagation.
///
/// Driven from a single event loop; every mutating operation takes
/// `&mut self`, which also serializes id minting.
pub struct RouteCoordinator<P: PathFinder, B: Broadcast, C: ConnectionCost = Fastest> {
    db:           Arc<RoadNetworkDatabase>,
    config:       NavConfig,
    registry:     RouteRegistry,
    materializer: RouteMaterializer<C>,
    resolver:     EntityResolver,
    fixer:        RouteFixer,
    path_finder:  P,
    broadcast:    B,
    rng:          SimRng,
}

impl<P: PathFinder, B: Broadcast> RouteCoordinator<P, B, Fastest> {
    /// Validate `config` and set up an empty registry.  Call
    /// [`initialize`](Self::initialize) before serving vehicles.
    pub fn new(
        db:          Arc<RoadNetworkDatabase>,
        config:      NavConfig,
        path_finder: P,
        broadcast:   B,
    ) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self {
            materializer: RouteMaterializer::new(&db),
            resolver:     EntityResolver::new(Arc::clone(&db)),
            fixer:        RouteFixer::new(config.route_fixer_max_depth),
            rng:          SimRng::new(config.seed),
            registry:     RouteRegistry::new(),
            db,
            config,
            path_finder,
            broadcast,
        })
    }
}

impl<P: PathFinder, B: Broadcast, C: ConnectionCost> RouteCoordinator<P, B, C> {
    /// Swap the tie-break policy used when materializing new routes.
    pub fn with_connection_cost<C2: ConnectionCost>(self, cost: C2) -> RouteCoordinator<P, B, C2> {
        RouteCoordinator {
            db:           self.db,
            config:       self.config,
            registry:     self.registry,
            materializer: self.materializer.into_cost(cost),
            resolver:     self.resolver,
            fixer:        self.fixer,
            path_finder:  self.path_finder,
            broadcast:    self.broadcast,
            rng:          self.rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn database(&self) -> &RoadNetworkDatabase {
        &self.db
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.registry.get(id)
    }

    pub fn broadcast(&self) -> &B {
        &self.broadcast
    }

    pub fn broadcast_mut(&mut self) -> &mut B {
        &mut self.broadcast
    }

    // ── Start-up ──────────────────────────────────────────────────────────

    /// Register all database routes and announce them in one message.
    pub fn initialize(&mut self, time: SimTime) -> RoutingResult<()> {
        let routes = self.materializer.routes_from_database(&self.db);
        let count = routes.len();
        self.registry.register_bulk(routes)?;
        info!("sending initialization of {count} route(s)");
        self.broadcast.routes_initialized(time, self.registry.routes())?;
        Ok(())
    }

    // ── Route switching ───────────────────────────────────────────────────

    /// Put `vehicle` on the canonical route for `candidate`; see the module
    /// docs for the decision order.  Returns the route the vehicle is on
    /// afterwards.
    pub fn switch_route(
        &mut self,
        vehicle:   &VehicleId,
        candidate: &CandidateRoute,
        current:   &Route,
        time:      SimTime,
    ) -> RoutingResult<Route> {
        debug!("vehicle {vehicle} asks to switch away from route {}", current.id);

        match self.place(candidate, Some(current))? {
            Placement::Known(route) if route.id == current.id => {
                debug!("candidate lies on current route {} of vehicle {vehicle}", current.id);
                Ok(current.clone())
            }
            Placement::Known(route) => Ok(self.request_route_change(vehicle, route, current, time)),
            Placement::New(route) => {
                debug!("propagating unknown route {}", route.id);
                if let Err(e) = self.propagate(route.clone(), time) {
                    error!("unable to propagate route {}: {e}", route.id);
                    return Ok(current.clone());
                }
                Ok(self.request_route_change(vehicle, route, current, time))
            }
        }
    }

    /// The canonical route for `candidate`: `current` or a registered route
    /// when either ends with it, else a freshly minted (unregistered) route.
    ///
    /// Matching is tried on the candidate's own connections and again on
    /// the connections it materializes to.  No id is minted for a path that
    /// is already registered.
    fn place(&mut self, candidate: &CandidateRoute, current: Option<&Route>) -> RoutingResult<Placement> {
        if let Some(found) = self.find_existing(&candidate.connection_ids, current) {
            return Ok(Placement::Known(found));
        }

        let edges = self.materializer.candidate_edges(&self.db, candidate)?;
        let connections = connection_sequence(&edges);
        if connections != candidate.connection_ids {
            debug!(
                "candidate [{}] materializes onto [{}]",
                join(&candidate.connection_ids),
                join(&connections)
            );
            if let Some(found) = self.find_existing(&connections, current) {
                return Ok(Placement::Known(found));
            }
        }
        Ok(Placement::New(flatten(&self.db, &self.materializer.mint(edges))))
    }

    fn find_existing(&self, connections: &[ConnectionId], current: Option<&Route>) -> Option<Route> {
        if let Some(current) = current.filter(|r| is_suffix(connections, &r.connection_ids)) {
            return Some(current.clone());
        }
        self.registry.find_suffix_match(connections).cloned()
    }

    fn request_route_change(&mut self, vehicle: &VehicleId, new: Route, previous: &Route, time: SimTime) -> Route {
        match self.broadcast.route_changed(time, vehicle, &new.id) {
            Ok(()) => {
                info!("vehicle {vehicle} changes to route {}", new.id);
                new
            }
            Err(e) => {
                error!("unable to announce route change of vehicle {vehicle} to {}: {e}", new.id);
                previous.clone()
            }
        }
    }

    /// Announce and register a new route.  Nothing is registered if the
    /// announcement fails.
    fn propagate(&mut self, route: Route, time: SimTime) -> RoutingResult<()> {
        if self.registry.contains(route.id.as_str()) {
            return Err(RoutingError::DuplicateRoute(route.id));
        }
        self.broadcast.route_registered(time, &route)?;
        self.registry.register(route)
    }

    // ── Route queries ─────────────────────────────────────────────────────

    /// Distance from `current_position` to `to_node`, travelling along
    /// `route_id` through every node from `from_upcoming` on.
    ///
    /// Infinite when `to_node` is not on the route.
    pub fn distance_along(
        &self,
        route_id:         &str,
        from_upcoming:    &str,
        to_node:          &str,
        current_position: GeoPoint,
    ) -> RoutingResult<f64> {
        let route = self.known_route(route_id)?;
        let Some(to) = route.index_of_node(to_node) else {
            return Ok(f64::INFINITY);
        };
        let from = route.index_of_node(from_upcoming).ok_or_else(|| {
            RoutingError::InvalidArgument(format!("node {from_upcoming} is not on route {route_id}"))
        })?;
        if to < from {
            return Err(RoutingError::InvalidArgument(format!(
                "node {to_node} lies before node {from_upcoming} on route {route_id}"
            )));
        }

        let mut distance = 0.0;
        let mut here = current_position;
        for id in &route.node_ids[from..=to] {
            let next = self
                .db
                .node(id.as_str())
                .and_then(|n| n.position)
                .ok_or_else(|| RoutingError::MissingPosition(id.clone()))?;
            distance += here.distance_m(next);
            here = next;
        }
        Ok(distance)
    }

    /// First node at or after the upcoming node of `position` on `route_id`
    /// that satisfies `predicate`.
    pub fn next_node_matching<F>(
        &self,
        route_id:      &str,
        position:      &RoadPosition,
        mut predicate: F,
    ) -> RoutingResult<Option<&Node>>
    where
        F: FnMut(&Node) -> bool,
    {
        let route = self.known_route(route_id)?;
        let Some(start) = position
            .upcoming_node
            .as_ref()
            .and_then(|n| route.index_of_node(n.as_str()))
        else {
            return Ok(None);
        };
        Ok(route.node_ids[start..]
            .iter()
            .filter_map(|id| self.db.node(id.as_str()))
            .find(|n| predicate(*n)))
    }

    pub fn source_position_of_route(&self, route_id: &str) -> Option<GeoPoint> {
        let node = self.registry.get(route_id)?.first_node()?;
        self.db.node(node.as_str())?.position
    }

    pub fn target_position_of_route(&self, route_id: &str) -> Option<GeoPoint> {
        let node = self.registry.get(route_id)?.last_node()?;
        self.db.node(node.as_str())?.position
    }

    fn known_route(&self, route_id: &str) -> RoutingResult<&Route> {
        self.registry
            .get(route_id)
            .ok_or_else(|| RoutingError::UnknownRoute(route_id.into()))
    }

    // ── Origin / destination ──────────────────────────────────────────────

    /// Route a new vehicle between two areas.
    ///
    /// Start and end points are drawn uniformly inside the circles.  The best
    /// path is matched against the registry before a new route is minted.
    /// On any error nothing is registered or announced.
    pub fn create_route_for_od(
        &mut self,
        origin:      &GeoCircle,
        destination: &GeoCircle,
        time:        SimTime,
    ) -> RoutingResult<VehicleDeparture> {
        let source = self.rng.point_in(origin);
        let target = self.rng.point_in(destination);
        let params = RoutingParameters::default()
            .alternatives(self.config.alternative_routes)
            .cost_function(self.config.cost_function);

        let best = self
            .find_routes(&RoutingRequest::new(source, target, params))
            .best
            .ok_or(RoutingError::NoRouteFound)?;

        match self.place(&best, None)? {
            Placement::Known(known) => {
                debug!("origin/destination path matches route {}", known.id);
                Ok(VehicleDeparture { route_id: known.id, time })
            }
            Placement::New(route) => {
                let route_id = route.id.clone();
                self.propagate(route, time)?;
                Ok(VehicleDeparture { route_id, time })
            }
        }
    }

    // ── Pass-through queries ──────────────────────────────────────────────

    /// Ask the path finder; registers nothing.
    pub fn find_routes(&self, request: &RoutingRequest) -> RoutingResponse {
        RoutingResponse::from_ranked(self.path_finder.find_routes(&self.db, request))
    }

    pub fn approximate_costs(&self, candidates: &[CandidateRoute]) -> Vec<CandidateRoute> {
        candidates.iter().map(|c| approximate_cost(&self.db, c)).collect()
    }

    pub fn refine_road_position(&mut self, descriptor: &RoadPositionDescriptor) -> RoadPosition {
        self.resolver.road_position(descriptor)
    }

    pub fn find_closest_node(&self, point: GeoPoint) -> Option<&Node> {
        self.db.closest_node(point)
    }

    /// Closest road position to `point`; with a heading, edges aligned with
    /// it within the configured tolerance win.
    pub fn find_closest_road_position(&self, point: GeoPoint, heading_deg: Option<f64>) -> Option<RoadPosition> {
        self.resolver
            .closest_road_position(point, heading_deg, self.config.heading_tolerance_deg)
    }

    pub fn length_of_connection(&self, id: &str) -> Option<f64> {
        self.db.connection(id).map(|c| c.length_m)
    }

    pub fn max_speed_of_connection(&self, id: &str) -> Option<f64> {
        self.db.connection(id).map(|c| self.db.max_speed_ms(c))
    }

    pub fn fix_route(&self, route: &[ConnectionId]) -> Vec<ConnectionId> {
        self.fixer.fix_route(&self.db, route)
    }
}

fn join(ids: &[ConnectionId]) -> String {
    ids.iter().map(ConnectionId::as_str).collect::<Vec<_>>().join(" ")
}
