use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::lookup::{AirportMessage, AirportRequest};
use crate::options::{OptionDescriptor, OptionInput, OptionKind};
use crate::overlay::Overlay;
use crate::simbrief::{PlanMessage, PlanRequest};
use crate::telemetry::Telemetry;
use crate::view::{Anchor, OverlayView};

/// Everything the host can tell the overlay.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    OptionChanged { name: String, input: OptionInput },
    Wheel(f64),
    Scroll,
    Run,
    Attach,
    Detach,
    Shutdown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayStatus {
    pub icon: &'static str,
    pub info: String,
    pub active: bool,
}

impl OverlayStatus {
    pub fn of(overlay: &Overlay, now: Instant) -> Self {
        Self {
            icon: overlay.status_icon(),
            info: overlay.status_info(now),
            active: overlay.is_active(),
        }
    }
}

/// Where the host renders the overlay.
pub trait Surface {
    fn present(&mut self, view: &OverlayView, status: &OverlayStatus);
}

pub struct LookupChannels {
    pub req_tx: Sender<AirportRequest>,
    pub res_rx: Receiver<AirportMessage>,
}

pub struct PlanChannels {
    pub req_tx: Sender<PlanRequest>,
    pub res_rx: Receiver<PlanMessage>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickTiming {
    pub slow: Duration,
    pub fast: Duration,
}

impl From<&OverlayConfig> for TickTiming {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            slow: config.slow_tick,
            fast: config.fast_tick,
        }
    }
}

/// Drives `overlay` until the host sends `Shutdown` or drops its event
/// sender. Worker results are drained between events; ticks run when due.
pub fn run_overlay(
    mut overlay: Overlay,
    telemetry: &dyn Telemetry,
    surface: &mut dyn Surface,
    events: Receiver<HostEvent>,
    lookup: LookupChannels,
    plans: Option<PlanChannels>,
    timing: TickTiming,
) -> Result<Overlay> {
    let fast_enabled = overlay.variant().has_fast_tick();
    let start = Instant::now();
    let mut next_slow = start;
    let mut next_fast = start;
    let mut dirty = true;

    loop {
        while let Ok(message) = lookup.res_rx.try_recv() {
            if overlay.apply_airport_result(message) {
                next_slow = Instant::now();
            }
        }
        if let Some(plans) = &plans {
            while let Ok(message) = plans.res_rx.try_recv() {
                overlay.apply_plan(message);
                dirty = true;
            }
        }

        let now = Instant::now();
        if now >= next_slow {
            overlay.slow_tick(telemetry);
            next_slow = now + timing.slow;
            dirty = true;
        }
        if fast_enabled && now >= next_fast {
            overlay.fast_tick(telemetry);
            next_fast = now + timing.fast;
            dirty = true;
        }
        if let Some(request) = overlay.take_airport_request() {
            if lookup.req_tx.send(request).is_err() {
                warn!("airport lookup worker gone");
            }
        }

        if dirty {
            if let Some(view) = overlay.view() {
                surface.present(view, &OverlayStatus::of(&overlay, Instant::now()));
            }
            dirty = false;
        }

        let deadline = if fast_enabled {
            next_slow.min(next_fast)
        } else {
            next_slow
        };
        let timeout = deadline.saturating_duration_since(Instant::now());
        match events.recv_timeout(timeout) {
            Ok(HostEvent::Shutdown) => {
                info!("shutdown requested");
                break;
            }
            Ok(event) => {
                if matches!(event, HostEvent::Attach) {
                    next_slow = Instant::now();
                    next_fast = next_slow;
                }
                handle_event(&mut overlay, event, plans.as_ref(), Instant::now());
                dirty = true;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("host event channel closed");
                break;
            }
        }
    }
    Ok(overlay)
}

fn handle_event(
    overlay: &mut Overlay,
    event: HostEvent,
    plans: Option<&PlanChannels>,
    now: Instant,
) {
    match event {
        HostEvent::OptionChanged { name, input } => {
            if let Err(err) = overlay.apply_option(&name, input) {
                warn!("option {name} rejected: {err:#}");
            }
        }
        HostEvent::Wheel(delta_y) => overlay.on_wheel(delta_y),
        HostEvent::Scroll => {
            let Some(request) = overlay.on_scroll(now) else {
                return;
            };
            match plans {
                Some(plans) => {
                    if plans.req_tx.send(request).is_err() {
                        warn!("simbrief fetcher gone");
                    }
                }
                None => debug!("simbrief fetch disabled in config"),
            }
        }
        HostEvent::Run => overlay.toggle_overlay(),
        HostEvent::Attach => overlay.attach(),
        HostEvent::Detach => overlay.detach(),
        HostEvent::Shutdown => {}
    }
}

/// Parses one stdin command. Checkbox settings take `true`/`false`; every
/// other value is passed through as text.
pub fn parse_command(line: &str, options: &[OptionDescriptor]) -> Option<HostEvent> {
    let line = line.trim();
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(command, rest)| (command, rest.trim()))
        .unwrap_or((line, ""));
    match command {
        "scroll" => Some(HostEvent::Scroll),
        "run" => Some(HostEvent::Run),
        "attach" => Some(HostEvent::Attach),
        "detach" => Some(HostEvent::Detach),
        "quit" | "exit" => Some(HostEvent::Shutdown),
        "wheel" => rest.parse().ok().map(HostEvent::Wheel),
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let option = options.iter().find(|option| option.name == name)?;
            let input = match option.kind {
                OptionKind::Checkbox => OptionInput::Checkbox(matches!(
                    value.trim(),
                    "1" | "true" | "yes" | "on"
                )),
                OptionKind::Text => OptionInput::Text(value.trim().to_string()),
            };
            Some(HostEvent::OptionChanged {
                name: name.to_string(),
                input,
            })
        }
        _ => None,
    }
}

/// Feeds stdin commands to the runtime until stdin closes or `quit`.
pub fn spawn_stdin_events(options: Vec<OptionDescriptor>, tx: Sender<HostEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim() == "options" {
                for option in &options {
                    println!("{:<22} {}", option.name, option.label);
                }
                continue;
            }
            match parse_command(&line, &options) {
                Some(event) => {
                    let quit = event == HostEvent::Shutdown;
                    if tx.send(event).is_err() || quit {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("unknown command: {}", line.trim()),
            }
        }
        let _ = tx.send(HostEvent::Shutdown);
    });
}

/// One-line text rendering of the visible items.
pub fn render_line(view: &OverlayView) -> String {
    view.items()
        .iter()
        .filter(|item| item.visible)
        .map(|item| format!("{} {}", item.label, item.text))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Prints the overlay to stdout whenever its rendering changes.
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    last: String,
}

impl Surface for ConsoleSurface {
    fn present(&mut self, view: &OverlayView, status: &OverlayStatus) {
        let line = if view.visible {
            render_line(view)
        } else {
            String::new()
        };
        let frame = format!(
            "[{}] {}{}{}",
            status.info,
            if view.anchor == Anchor::Bottom { "v " } else { "" },
            line,
            if view.show_icons { "" } else { " (labels)" }
        );
        if frame == self.last {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{frame}");
        self.last = frame;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::derive_options;
    use crate::settings::{SettingsModel, SETTINGS_SCHEMA};
    use crate::storage::MemoryStore;
    use crate::view::Variant;

    fn options() -> Vec<OptionDescriptor> {
        let model = SettingsModel::initialize(SETTINGS_SCHEMA, Box::new(MemoryStore::default()));
        derive_options(&model)
    }

    #[test]
    fn commands_parse() {
        let options = options();
        assert_eq!(parse_command("scroll", &options), Some(HostEvent::Scroll));
        assert_eq!(parse_command(" wheel -3 ", &options), Some(HostEvent::Wheel(-3.0)));
        assert_eq!(parse_command("quit", &options), Some(HostEvent::Shutdown));
        assert_eq!(
            parse_command("set wind_enabled true", &options),
            Some(HostEvent::OptionChanged {
                name: "wind_enabled".to_string(),
                input: OptionInput::Checkbox(true),
            })
        );
        assert_eq!(
            parse_command("set custom Hello chat", &options),
            Some(HostEvent::OptionChanged {
                name: "custom".to_string(),
                input: OptionInput::Text("Hello chat".to_string()),
            })
        );
        assert_eq!(parse_command("set overlay_toggle false", &options), None);
        assert_eq!(parse_command("wheel up", &options), None);
        assert_eq!(parse_command("dance", &options), None);
    }

    #[test]
    fn render_line_lists_visible_items() {
        let mut view = OverlayView::new(Variant::Compact);
        view.set_visible("origin", true);
        view.set_text("origin", "KPDX");
        view.set_visible("heading", true);
        view.set_text("heading", "090");
        assert_eq!(render_line(&view), "ORIGIN KPDX | HEADING 090");
    }
}
