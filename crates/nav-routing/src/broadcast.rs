//! Cross-process broadcast seam.
//!
//! The coordinator announces routes and route changes to the cooperating
//! simulation processes through [`Broadcast`].  The transport itself lives in
//! the embedding process; this crate only defines the messages.

use nav_core::{RouteId, SimTime, VehicleId};

use crate::{BroadcastError, Route};

/// Messages the coordinator emits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum NavMessage {
    /// Every bulk-loaded route, sent once at start-up.
    RoutesInitialization { time: SimTime, routes: Vec<Route> },
    /// A newly minted route.
    RouteRegistration { time: SimTime, route: Route },
    /// A vehicle is switched to `route`.
    RouteChange { time: SimTime, vehicle: VehicleId, route: RouteId },
}

impl NavMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            NavMessage::RoutesInitialization { .. } => MessageKind::RoutesInitialization,
            NavMessage::RouteRegistration { .. }    => MessageKind::RouteRegistration,
            NavMessage::RouteChange { .. }          => MessageKind::RouteChange,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    RoutesInitialization,
    RouteRegistration,
    RouteChange,
}

/// Outbound channel to the other simulation processes.
///
/// All methods default to accepting the message and doing nothing, so
/// implementors only override what they forward.
pub trait Broadcast {
    fn routes_initialized(&mut self, _time: SimTime, _routes: &[Route]) -> Result<(), BroadcastError> {
        Ok(())
    }

    fn route_registered(&mut self, _time: SimTime, _route: &Route) -> Result<(), BroadcastError> {
        Ok(())
    }

    fn route_changed(&mut self, _time: SimTime, _vehicle: &VehicleId, _route: &RouteId) -> Result<(), BroadcastError> {
        Ok(())
    }
}

/// A [`Broadcast`] that drops everything.  Use for a process running alone.
pub struct NoopBroadcast;

impl Broadcast for NoopBroadcast {}

/// Keeps every accepted message in memory.
///
/// Messages of the kinds listed in `reject` fail with
/// [`BroadcastError::Rejected`] and are not recorded.
#[derive(Default, Debug)]
pub struct RecordingBroadcast {
    pub messages: Vec<NavMessage>,
    pub reject:   Vec<MessageKind>,
}

impl RecordingBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(kind: MessageKind) -> Self {
        Self { messages: Vec::new(), reject: vec![kind] }
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages.iter().filter(|m| m.kind() == kind).count()
    }

    fn record(&mut self, msg: NavMessage) -> Result<(), BroadcastError> {
        let kind = msg.kind();
        if self.reject.contains(&kind) {
            return Err(BroadcastError::Rejected(format!("{kind:?}")));
        }
        self.messages.push(msg);
        Ok(())
    }
}

impl Broadcast for RecordingBroadcast {
    fn routes_initialized(&mut self, time: SimTime, routes: &[Route]) -> Result<(), BroadcastError> {
        self.record(NavMessage::RoutesInitialization { time, routes: routes.to_vec() })
    }

    fn route_registered(&mut self, time: SimTime, route: &Route) -> Result<(), BroadcastError> {
        self.record(NavMessage::RouteRegistration { time, route: route.clone() })
    }

    fn route_changed(&mut self, time: SimTime, vehicle: &VehicleId, route: &RouteId) -> Result<(), BroadcastError> {
        self.record(NavMessage::RouteChange { time, vehicle: vehicle.clone(), route: route.clone() })
    }
}
