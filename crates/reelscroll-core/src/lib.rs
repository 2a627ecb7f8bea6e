pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod registry;
pub mod scheduler;
pub mod sim;
pub mod surface;
pub mod timeline;

pub use config::{AppConfig, EasingType, LayerConfig, TimelineConfig};
pub use controller::TimelineController;
pub use error::{Error, Result};
pub use input::InputDisposition;
pub use registry::{AppliedEffect, Axis, LayerCategory, SubscriptionId};
pub use surface::{
    Edge, FrameHandle, HostSurface, LayerScan, LayerSpec, Metrics, RevealSpec, VisualEffectSink,
};
pub use timeline::{damp, TickOutcome, TimelineState};
