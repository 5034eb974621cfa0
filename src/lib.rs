//! Flight telemetry overlay core for simulator streaming: samples host
//! telemetry, formats it into labels and keeps a retained overlay view in
//! sync with user settings.

pub mod config;
pub mod logging;
pub mod lookup;
pub mod model;
pub mod net;
pub mod options;
pub mod overlay;
pub mod resolver;
pub mod runtime;
pub mod sampler;
pub mod settings;
pub mod simbrief;
pub mod storage;
pub mod telemetry;
pub mod units;
pub mod view;
pub mod visibility;

pub use lookup::{AirportDirectory, AirportMessage, AirportRequest, AirportTable};
pub use model::{Airport, FlightPlan};
pub use options::{OptionDescriptor, OptionInput, OptionKind};
pub use overlay::Overlay;
pub use runtime::{HostEvent, OverlayStatus, Surface};
pub use settings::{SettingValue, SettingsModel, SettingsStore};
pub use telemetry::Telemetry;
pub use view::{OverlayView, Variant};
