use anyhow::Result;
use std::collections::HashMap;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use tracing::{debug, info};

use crate::model::Airport;

pub const REQUEST_ID_PREFIX: &str = "streamer-overlay-lookup";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirportRequest {
    pub id: u64,
    pub code: String,
}

impl AirportRequest {
    /// Identifier handed to the host lookup service.
    pub fn host_request_id(&self) -> String {
        format!("{REQUEST_ID_PREFIX}-{}", self.id)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AirportMessage {
    Found {
        request_id: u64,
        code: String,
        airports: Vec<Airport>,
    },
    Error {
        request_id: u64,
        code: String,
        message: String,
    },
}

impl AirportMessage {
    pub fn request_id(&self) -> u64 {
        match self {
            AirportMessage::Found { request_id, .. } | AirportMessage::Error { request_id, .. } => {
                *request_id
            }
        }
    }
}

/// Host airport database.
pub trait AirportDirectory {
    /// All airports matching `code`; an empty list when none do.
    fn find_by_code(&self, request_id: &str, code: &str) -> Result<Vec<Airport>>;
}

/// In-memory directory keyed by upper-case ICAO code.
#[derive(Clone, Debug, Default)]
pub struct AirportTable {
    airports: HashMap<String, Airport>,
}

impl AirportTable {
    pub fn new(airports: impl IntoIterator<Item = Airport>) -> Self {
        Self {
            airports: airports
                .into_iter()
                .map(|airport| (airport.icao.to_ascii_uppercase(), airport))
                .collect(),
        }
    }
}

impl AirportDirectory for AirportTable {
    fn find_by_code(&self, _request_id: &str, code: &str) -> Result<Vec<Airport>> {
        Ok(self
            .airports
            .get(&code.trim().to_ascii_uppercase())
            .cloned()
            .into_iter()
            .collect())
    }
}

pub fn resolve(directory: &dyn AirportDirectory, request: &AirportRequest) -> AirportMessage {
    match directory.find_by_code(&request.host_request_id(), &request.code) {
        Ok(airports) => AirportMessage::Found {
            request_id: request.id,
            code: request.code.clone(),
            airports,
        },
        Err(err) => AirportMessage::Error {
            request_id: request.id,
            code: request.code.clone(),
            message: format!("{err:#}"),
        },
    }
}

/// Serves lookups on a worker thread until the request channel closes.
pub fn spawn_airport_lookup<D>(directory: D, rx: Receiver<AirportRequest>, tx: Sender<AirportMessage>)
where
    D: AirportDirectory + Send + 'static,
{
    thread::spawn(move || {
        info!("airport lookup started");
        while let Ok(request) = rx.recv() {
            debug!("airport lookup #{} {}", request.id, request.code);
            if tx.send(resolve(&directory, &request)).is_err() {
                debug!("receiver dropped, exiting airport lookup");
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::mpsc;
    use std::time::Duration;

    struct Offline;

    impl AirportDirectory for Offline {
        fn find_by_code(&self, _request_id: &str, _code: &str) -> Result<Vec<Airport>> {
            Err(anyhow!("airport database not loaded"))
        }
    }

    fn table() -> AirportTable {
        AirportTable::new([Airport {
            icao: "KSEA".to_string(),
            lat: 47.45,
            lon: -122.31,
        }])
    }

    #[test]
    fn table_lookup_is_case_insensitive() {
        let request = AirportRequest {
            id: 3,
            code: "ksea".to_string(),
        };
        match resolve(&table(), &request) {
            AirportMessage::Found { request_id, airports, .. } => {
                assert_eq!(request_id, 3);
                assert_eq!(airports.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(request.host_request_id(), "streamer-overlay-lookup-3");
    }

    #[test]
    fn directory_errors_become_messages() {
        let request = AirportRequest {
            id: 1,
            code: "KSEA".to_string(),
        };
        match resolve(&Offline, &request) {
            AirportMessage::Error { message, .. } => assert!(message.contains("not loaded")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn worker_answers_over_channel() {
        let (req_tx, req_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        spawn_airport_lookup(table(), req_rx, res_tx);
        req_tx
            .send(AirportRequest {
                id: 9,
                code: "EGLL".to_string(),
            })
            .unwrap();
        let message = res_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(
            message,
            AirportMessage::Found {
                request_id: 9,
                code: "EGLL".to_string(),
                airports: Vec::new(),
            }
        );
    }
}
