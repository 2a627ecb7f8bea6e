use std::fmt;
use std::rc::Weak;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{LayerConfig, LayerTuning};

/// Axis a translation is applied on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl FromStr for Axis {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vertical" | "y" => Ok(Axis::Vertical),
            "horizontal" | "x" => Ok(Axis::Horizontal),
            other => Err(crate::Error::Other(format!("unknown axis: {}", other))),
        }
    }
}

/// Depth category of a parallax layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerCategory {
    Background,
    #[serde(alias = "content")]
    Midground,
    Foreground,
    Text,
}

impl LayerCategory {
    pub const ALL: [LayerCategory; 4] = [
        LayerCategory::Background,
        LayerCategory::Midground,
        LayerCategory::Foreground,
        LayerCategory::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerCategory::Background => "background",
            LayerCategory::Midground => "midground",
            LayerCategory::Foreground => "foreground",
            LayerCategory::Text => "text",
        }
    }

    /// Translation tuning for this category; `None` for text, which fades instead
    pub fn tuning(&self, layers: &LayerConfig) -> Option<LayerTuning> {
        match self {
            LayerCategory::Background => Some(layers.background),
            LayerCategory::Midground => Some(layers.midground),
            LayerCategory::Foreground => Some(layers.foreground),
            LayerCategory::Text => None,
        }
    }

    /// Speed used when a layer does not declare one
    pub fn default_speed(&self, layers: &LayerConfig) -> f64 {
        self.tuning(layers).map(|t| t.default_speed).unwrap_or(0.0)
    }
}

impl fmt::Display for LayerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerCategory {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(LayerCategory::Background),
            "midground" | "content" => Ok(LayerCategory::Midground),
            "foreground" => Ok(LayerCategory::Foreground),
            "text" => Ok(LayerCategory::Text),
            other => Err(crate::Error::Other(format!("unknown layer category: {}", other))),
        }
    }
}

/// Stable handle returned by registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

impl SubscriptionId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// How a subscriber entered the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Registered through the controller API; survives rescans
    Explicit,
    /// Found by a host scan; replaced on every rescan
    Scanned,
}

/// The last effect written to the sink for a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppliedEffect {
    Translation { x: f64, y: f64 },
    OpacityScale { opacity: f64, scale: f64 },
}

/// One registered visual element
#[derive(Debug, Clone)]
pub struct Subscriber<E> {
    pub(crate) id: SubscriptionId,
    pub(crate) element: Weak<E>,
    pub(crate) speed_factor: f64,
    pub(crate) axis: Axis,
    pub(crate) category: LayerCategory,
    pub(crate) origin: Origin,
    pub(crate) last_applied: Option<AppliedEffect>,
}

impl<E> Subscriber<E> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn element(&self) -> &Weak<E> {
        &self.element
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn category(&self) -> LayerCategory {
        self.category
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn last_applied(&self) -> Option<AppliedEffect> {
        self.last_applied
    }

    pub fn is_alive(&self) -> bool {
        self.element.strong_count() > 0
    }

    pub(crate) fn refers_to(&self, element: &Weak<E>) -> bool {
        Weak::ptr_eq(&self.element, element)
    }
}
