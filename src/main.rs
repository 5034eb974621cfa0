use anyhow::Result;
use std::path::Path;
use std::sync::mpsc;
use std::time::Instant;

use streamer_overlay::config::parse_args;
use streamer_overlay::logging::init as init_logging;
use streamer_overlay::lookup::{spawn_airport_lookup, AirportTable};
use streamer_overlay::net::spawn_plan_fetcher;
use streamer_overlay::overlay::Overlay;
use streamer_overlay::runtime::{
    run_overlay, spawn_stdin_events, ConsoleSurface, HostEvent, LookupChannels, PlanChannels,
    TickTiming,
};
use streamer_overlay::storage::{load_airports, TomlSettingsStore};
use streamer_overlay::telemetry::StaticTelemetry;
use tracing::{debug, info, warn};

fn main() -> Result<()> {
    let config = parse_args()?;
    let _log_guard = init_logging(&config);
    info!("streamer-overlay starting ({} variant)", config.variant.label());
    debug!("config path: {}", config.config_path.display());

    let airports = if config.airports_file.trim().is_empty() {
        Vec::new()
    } else {
        let path = Path::new(config.airports_file.trim());
        load_airports(path).unwrap_or_else(|err| {
            warn!("failed to load airports from {}: {err:#}", path.display());
            Vec::new()
        })
    };
    debug!("{} airports loaded", airports.len());

    let (lookup_req_tx, lookup_req_rx) = mpsc::channel();
    let (lookup_res_tx, lookup_res_rx) = mpsc::channel();
    spawn_airport_lookup(AirportTable::new(airports), lookup_req_rx, lookup_res_tx);

    let plan_channels = if config.simbrief_enabled() {
        let (plan_req_tx, plan_req_rx) = mpsc::channel();
        let (plan_res_tx, plan_res_rx) = mpsc::channel();
        spawn_plan_fetcher(
            config.simbrief_url.clone(),
            config.simbrief_timeout(),
            plan_req_rx,
            plan_res_tx,
        );
        Some(PlanChannels {
            req_tx: plan_req_tx,
            res_rx: plan_res_rx,
        })
    } else {
        None
    };

    let store = TomlSettingsStore::new(config.settings_file.trim());
    let overlay = Overlay::new(
        config.variant,
        Box::new(store),
        config.simbrief_cooldown(),
        Instant::now(),
    );

    let (event_tx, event_rx) = mpsc::channel();
    spawn_stdin_events(overlay.options(), event_tx.clone());
    let _ = event_tx.send(HostEvent::Attach);
    drop(event_tx);

    let telemetry = StaticTelemetry::new();
    let mut surface = ConsoleSurface::default();
    let res = run_overlay(
        overlay,
        &telemetry,
        &mut surface,
        event_rx,
        LookupChannels {
            req_tx: lookup_req_tx,
            res_rx: lookup_res_rx,
        },
        plan_channels,
        TickTiming::from(&config),
    );

    if let Err(err) = res {
        warn!("runtime error: {err}");
        eprintln!("{err}");
    }

    info!("streamer-overlay exited");
    Ok(())
}
