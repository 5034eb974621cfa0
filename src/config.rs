use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::net::DEFAULT_SIMBRIEF_URL;
use crate::view::Variant;

pub const DEFAULT_CONFIG_FILE: &str = "streamer-overlay.toml";
pub const DEFAULT_VARIANT: &str = "full";
pub const DEFAULT_SLOW_TICK_MS: u64 = 1000;
pub const DEFAULT_FAST_TICK_MS: u64 = 66;
pub const DEFAULT_SETTINGS_FILE: &str = "streamer-overlay-settings.toml";
pub const DEFAULT_AIRPORTS_FILE: &str = "streamer-overlay-airports.toml";
pub const DEFAULT_SIMBRIEF_COOLDOWN_SECS: u64 = 20;
pub const DEFAULT_SIMBRIEF_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FILE: &str = "streamer-overlay.log";

pub const MIN_SLOW_TICK_MS: u64 = 100;
pub const MIN_FAST_TICK_MS: u64 = 16;
pub const MIN_SIMBRIEF_COOLDOWN_SECS: u64 = 1;
pub const MIN_SIMBRIEF_TIMEOUT_SECS: u64 = 2;

/// Runtime configuration of the host process. User-facing overlay settings
/// live in the settings store instead.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    pub config_path: PathBuf,
    pub variant: Variant,
    pub slow_tick: Duration,
    pub fast_tick: Duration,
    pub settings_file: String,
    pub airports_file: String,
    pub simbrief_url: String,
    pub simbrief_cooldown_secs: u64,
    pub simbrief_timeout_secs: u64,
    pub log_enabled: bool,
    pub log_level: String,
    pub log_file: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            variant: Variant::from_str(DEFAULT_VARIANT),
            slow_tick: Duration::from_millis(DEFAULT_SLOW_TICK_MS),
            fast_tick: Duration::from_millis(DEFAULT_FAST_TICK_MS),
            settings_file: DEFAULT_SETTINGS_FILE.to_string(),
            airports_file: DEFAULT_AIRPORTS_FILE.to_string(),
            simbrief_url: DEFAULT_SIMBRIEF_URL.to_string(),
            simbrief_cooldown_secs: DEFAULT_SIMBRIEF_COOLDOWN_SECS,
            simbrief_timeout_secs: DEFAULT_SIMBRIEF_TIMEOUT_SECS,
            log_enabled: false,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn simbrief_cooldown(&self) -> Duration {
        Duration::from_secs(self.simbrief_cooldown_secs)
    }

    pub fn simbrief_timeout(&self) -> Duration {
        Duration::from_secs(self.simbrief_timeout_secs)
    }

    pub fn simbrief_enabled(&self) -> bool {
        !self.simbrief_url.trim().is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    variant: Option<String>,
    slow_tick_ms: Option<u64>,
    fast_tick_ms: Option<u64>,
    settings_file: Option<String>,
    airports_file: Option<String>,
    simbrief_url: Option<String>,
    simbrief_cooldown_secs: Option<u64>,
    simbrief_timeout_secs: Option<u64>,
    log_enabled: Option<bool>,
    log_level: Option<String>,
    log_file: Option<String>,
}

pub fn parse_args() -> Result<OverlayConfig> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_from(&args)
}

fn parse_from(args: &[String]) -> Result<OverlayConfig> {
    let mut explicit_config: Option<PathBuf> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let value = iter
                .next()
                .ok_or_else(|| anyhow!("--config needs a value"))?;
            explicit_config = Some(PathBuf::from(value));
        }
    }

    let env_config = env::var("OVERLAY_CONFIG").ok().map(PathBuf::from);
    let config_path = explicit_config
        .clone()
        .or(env_config)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut config = OverlayConfig::default();
    if config_path.exists() {
        if let Some(file_config) = load_file_config(&config_path)? {
            apply_file_config(&mut config, file_config);
        }
    } else if explicit_config.is_some() {
        return Err(anyhow!("Config file not found: {}", config_path.display()));
    }
    config.config_path = config_path;

    apply_env(&mut config);

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                iter.next();
            }
            "--variant" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--variant needs a value"))?;
                config.variant = Variant::from_str(value);
            }
            "--settings-file" => {
                config.settings_file = iter
                    .next()
                    .ok_or_else(|| anyhow!("--settings-file needs a value"))?
                    .to_string();
            }
            "--airports-file" => {
                config.airports_file = iter
                    .next()
                    .ok_or_else(|| anyhow!("--airports-file needs a value"))?
                    .to_string();
            }
            "--simbrief-url" => {
                config.simbrief_url = iter
                    .next()
                    .ok_or_else(|| anyhow!("--simbrief-url needs a value"))?
                    .to_string();
            }
            "--no-simbrief" => {
                config.simbrief_url.clear();
            }
            "--slow-tick-ms" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--slow-tick-ms needs a value"))?;
                let ms: u64 = value.parse()?;
                config.slow_tick = Duration::from_millis(ms.max(MIN_SLOW_TICK_MS));
            }
            "--fast-tick-ms" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--fast-tick-ms needs a value"))?;
                let ms: u64 = value.parse()?;
                config.fast_tick = Duration::from_millis(ms.max(MIN_FAST_TICK_MS));
            }
            "--log" => {
                config.log_enabled = true;
            }
            "--no-log" => {
                config.log_enabled = false;
            }
            "--log-level" => {
                config.log_level = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-level needs a value"))?
                    .to_string();
            }
            "--log-file" => {
                config.log_file = iter
                    .next()
                    .ok_or_else(|| anyhow!("--log-file needs a value"))?
                    .to_string();
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                return Err(anyhow!("Unknown argument: {other}"));
            }
        }
    }

    Ok(config)
}

fn env_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "yes" | "on")
}

fn apply_env(config: &mut OverlayConfig) {
    if let Ok(value) = env::var("OVERLAY_VARIANT") {
        config.variant = Variant::from_str(&value);
    }
    if let Ok(value) = env::var("OVERLAY_SETTINGS_FILE") {
        config.settings_file = value;
    }
    if let Ok(value) = env::var("OVERLAY_AIRPORTS_FILE") {
        config.airports_file = value;
    }
    if let Ok(value) = env::var("OVERLAY_SIMBRIEF_URL") {
        config.simbrief_url = value;
    }
    if let Ok(value) = env::var("OVERLAY_SIMBRIEF_TIMEOUT") {
        if let Ok(secs) = value.parse::<u64>() {
            config.simbrief_timeout_secs = secs.max(MIN_SIMBRIEF_TIMEOUT_SECS);
        }
    }
    if let Ok(value) = env::var("OVERLAY_LOG_ENABLED") {
        config.log_enabled = env_flag(&value);
    }
    if let Ok(value) = env::var("OVERLAY_LOG_LEVEL") {
        config.log_level = value;
    }
    if let Ok(value) = env::var("OVERLAY_LOG_FILE") {
        config.log_file = value;
    }
}

fn load_file_config(path: &Path) -> Result<Option<FileConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let cfg: FileConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    Ok(Some(cfg))
}

fn apply_file_config(target: &mut OverlayConfig, file: FileConfig) {
    if let Some(variant) = file.variant {
        target.variant = Variant::from_str(&variant);
    }
    if let Some(ms) = file.slow_tick_ms {
        target.slow_tick = Duration::from_millis(ms.max(MIN_SLOW_TICK_MS));
    }
    if let Some(ms) = file.fast_tick_ms {
        target.fast_tick = Duration::from_millis(ms.max(MIN_FAST_TICK_MS));
    }
    if let Some(settings_file) = file.settings_file {
        target.settings_file = settings_file;
    }
    if let Some(airports_file) = file.airports_file {
        target.airports_file = airports_file;
    }
    if let Some(simbrief_url) = file.simbrief_url {
        target.simbrief_url = simbrief_url;
    }
    if let Some(secs) = file.simbrief_cooldown_secs {
        target.simbrief_cooldown_secs = secs.max(MIN_SIMBRIEF_COOLDOWN_SECS);
    }
    if let Some(secs) = file.simbrief_timeout_secs {
        target.simbrief_timeout_secs = secs.max(MIN_SIMBRIEF_TIMEOUT_SECS);
    }
    if let Some(log_enabled) = file.log_enabled {
        target.log_enabled = log_enabled;
    }
    if let Some(log_level) = file.log_level {
        target.log_level = log_level;
    }
    if let Some(log_file) = file.log_file {
        target.log_file = log_file;
    }
}

fn print_help() {
    println!("streamer-overlay");
    println!("Usage: streamer-overlay [--config PATH] [--variant full|compact]");
    println!("       [--settings-file PATH] [--airports-file PATH]");
    println!("       [--simbrief-url URL] [--no-simbrief]");
    println!("       [--slow-tick-ms MS] [--fast-tick-ms MS]");
    println!("       [--log] [--no-log] [--log-level LEVEL] [--log-file PATH]");
    println!("Environment: OVERLAY_CONFIG overrides config path");
    println!("Environment: OVERLAY_VARIANT selects the overlay variant");
    println!("Environment: OVERLAY_SETTINGS_FILE/AIRPORTS_FILE set data paths");
    println!("Environment: OVERLAY_SIMBRIEF_URL/TIMEOUT configure the flight plan fetch");
    println!("Environment: OVERLAY_LOG_ENABLED/LEVEL/FILE configure logging");
    println!();
    println!("Commands on stdin:");
    println!("  set NAME VALUE   change a setting (true/false for checkboxes)");
    println!("  options          list settings");
    println!("  scroll           refresh from SimBrief");
    println!("  wheel DELTA      resize (negative grows)");
    println!("  run              toggle the overlay");
    println!("  attach | detach  create or drop the view");
    println!("  quit             exit");
}
