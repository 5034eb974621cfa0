use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::model::{FlightPlan, OfpResponse};
use crate::simbrief::{PlanMessage, PlanRequest};

pub const DEFAULT_SIMBRIEF_URL: &str = "https://www.simbrief.com/api/xml.fetcher.php";

/// Fetches the latest OFP for each request on a worker thread.
pub fn spawn_plan_fetcher(
    base_url: String,
    timeout: Duration,
    rx: Receiver<PlanRequest>,
    tx: Sender<PlanMessage>,
) {
    thread::spawn(move || {
        info!("simbrief fetcher started");
        let client = match Client::builder().timeout(timeout).build() {
            Ok(client) => client,
            Err(err) => {
                error!("simbrief client error: {err}");
                let _ = tx.send(PlanMessage::Error(format!("Client error: {err}")));
                return;
            }
        };

        while let Ok(request) = rx.recv() {
            let message = match fetch_plan(&client, &base_url, &request.username) {
                Ok(plan) => {
                    debug!("simbrief plan {} -> {}", plan.origin, plan.destination);
                    PlanMessage::Plan(plan)
                }
                Err(err) => {
                    warn!("simbrief fetch failed: {err}");
                    PlanMessage::Error(err)
                }
            };
            if tx.send(message).is_err() {
                debug!("receiver dropped, exiting simbrief fetcher");
                break;
            }
        }
    });
}

pub fn fetch_plan(client: &Client, base_url: &str, username: &str) -> Result<FlightPlan, String> {
    let url = Url::parse_with_params(base_url, &[("username", username.trim()), ("json", "1")])
        .map_err(|err| format!("Invalid SimBrief URL {base_url}: {err}"))?;
    let resp = client.get(url).send().map_err(|err| err.to_string())?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("SimBrief HTTP {status}"));
    }
    let ofp: OfpResponse = resp
        .json()
        .map_err(|err| format!("Parse error: {err}"))?;
    FlightPlan::try_from(ofp).map_err(|err| format!("Parse error: {err:#}"))
}
