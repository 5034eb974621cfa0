use tracing::{debug, info, warn};

use crate::lookup::{AirportMessage, AirportRequest};
use crate::model::Airport;

#[derive(Clone, Debug, PartialEq)]
pub enum ResolverState {
    Unresolved,
    Resolving(AirportRequest),
    Resolved { code: String, airport: Airport },
}

/// Destination airport cache. Every lookup carries an id and the code it was
/// issued for, so answers for an older destination are dropped.
#[derive(Debug)]
pub struct DestinationResolver {
    state: ResolverState,
    next_id: u64,
}

impl Default for DestinationResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DestinationResolver {
    pub fn new() -> Self {
        Self {
            state: ResolverState::Unresolved,
            next_id: 1,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    /// Starts a lookup for `destination` when nothing is cached or in flight.
    pub fn poll(&mut self, destination: &str) -> Option<AirportRequest> {
        if self.state != ResolverState::Unresolved {
            return None;
        }
        let code = destination.trim();
        if code.is_empty() {
            return None;
        }
        let request = AirportRequest {
            id: self.next_id,
            code: code.to_string(),
        };
        self.next_id += 1;
        debug!("airport lookup #{} for {}", request.id, request.code);
        self.state = ResolverState::Resolving(request.clone());
        Some(request)
    }

    /// Applies a lookup answer. Returns true when coordinates were committed.
    pub fn complete(&mut self, message: AirportMessage, live_destination: &str) -> bool {
        let ResolverState::Resolving(pending) = &self.state else {
            debug!("airport answer #{} with no lookup pending, dropped", message.request_id());
            return false;
        };
        if pending.id != message.request_id() || pending.code != live_destination.trim() {
            debug!(
                "stale airport answer #{} (pending #{} {}), dropped",
                message.request_id(),
                pending.id,
                pending.code
            );
            return false;
        }
        let code = pending.code.clone();

        match message {
            AirportMessage::Found { mut airports, .. } if !airports.is_empty() => {
                let airport = airports.swap_remove(0);
                info!(
                    "destination {} resolved to {:.4},{:.4}",
                    airport.icao, airport.lat, airport.lon
                );
                self.state = ResolverState::Resolved { code, airport };
                true
            }
            AirportMessage::Found { .. } => {
                warn!("airport {code} not found");
                self.state = ResolverState::Unresolved;
                false
            }
            AirportMessage::Error { message, .. } => {
                warn!("airport lookup for {code} failed: {message}");
                self.state = ResolverState::Unresolved;
                false
            }
        }
    }

    /// Forgets the cached airport and any lookup in flight.
    pub fn invalidate(&mut self) {
        if self.state != ResolverState::Unresolved {
            debug!("destination cache invalidated");
        }
        self.state = ResolverState::Unresolved;
    }

    /// Cached airport, only when it belongs to `destination`.
    pub fn airport_for(&self, destination: &str) -> Option<&Airport> {
        match &self.state {
            ResolverState::Resolved { code, airport } if code == destination.trim() => Some(airport),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(icao: &str, lat: f64, lon: f64) -> Airport {
        Airport {
            icao: icao.to_string(),
            lat,
            lon,
        }
    }

    fn found(request: &AirportRequest, airports: Vec<Airport>) -> AirportMessage {
        AirportMessage::Found {
            request_id: request.id,
            code: request.code.clone(),
            airports,
        }
    }

    #[test]
    fn resolves_first_result() {
        let mut resolver = DestinationResolver::new();
        let request = resolver.poll("KSEA").unwrap();
        assert!(resolver.poll("KSEA").is_none());
        assert!(matches!(resolver.state(), ResolverState::Resolving(_)));

        let committed = resolver.complete(
            found(&request, vec![airport("KSEA", 47.45, -122.31), airport("KBFI", 47.53, -122.3)]),
            "KSEA",
        );
        assert!(committed);
        assert_eq!(resolver.airport_for("KSEA").unwrap().lat, 47.45);
        assert!(resolver.poll("KSEA").is_none());
    }

    #[test]
    fn empty_result_stays_unresolved() {
        let mut resolver = DestinationResolver::new();
        let request = resolver.poll("ZZZZ").unwrap();
        assert!(!resolver.complete(found(&request, Vec::new()), "ZZZZ"));
        assert_eq!(resolver.state(), &ResolverState::Unresolved);
        assert!(resolver.poll("ZZZZ").is_some());
    }

    #[test]
    fn lookup_error_stays_unresolved() {
        let mut resolver = DestinationResolver::new();
        let request = resolver.poll("KSEA").unwrap();
        let message = AirportMessage::Error {
            request_id: request.id,
            code: request.code.clone(),
            message: "host unavailable".to_string(),
        };
        assert!(!resolver.complete(message, "KSEA"));
        assert_eq!(resolver.state(), &ResolverState::Unresolved);
    }

    #[test]
    fn invalidate_clears_resolved() {
        let mut resolver = DestinationResolver::new();
        let request = resolver.poll("KSEA").unwrap();
        resolver.complete(found(&request, vec![airport("KSEA", 47.45, -122.31)]), "KSEA");
        resolver.invalidate();
        assert_eq!(resolver.state(), &ResolverState::Unresolved);
        assert!(resolver.airport_for("KSEA").is_none());
    }

    #[test]
    fn stale_answer_after_destination_change_is_dropped() {
        let mut resolver = DestinationResolver::new();
        let old = resolver.poll("KSEA").unwrap();
        resolver.invalidate();
        let new = resolver.poll("KPDX").unwrap();
        assert_ne!(old.id, new.id);

        assert!(!resolver.complete(found(&old, vec![airport("KSEA", 47.45, -122.31)]), "KPDX"));
        assert!(matches!(resolver.state(), ResolverState::Resolving(r) if r.id == new.id));

        assert!(resolver.complete(found(&new, vec![airport("KPDX", 45.59, -122.6)]), "KPDX"));
        assert!(resolver.airport_for("KPDX").is_some());
    }

    #[test]
    fn answer_for_changed_live_destination_is_dropped() {
        let mut resolver = DestinationResolver::new();
        let request = resolver.poll("KSEA").unwrap();
        assert!(!resolver.complete(found(&request, vec![airport("KSEA", 47.45, -122.31)]), "KPDX"));
        assert!(resolver.airport_for("KSEA").is_none());
    }
}
