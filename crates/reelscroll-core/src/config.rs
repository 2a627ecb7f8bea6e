use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub layers: LayerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Easing curve used for programmatic scroll jumps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// Jump straight to the end value
    None,
    Linear,
    Cubic,
    Quintic,
    EaseOut,
    #[default]
    InOutCubic,
}

/// Longest accepted reference frame, in milliseconds
pub const MAX_REFERENCE_FRAME_MS: f64 = 1_000.0;
/// Longest accepted frame delta cap, in milliseconds
pub const MAX_FRAME_LIMIT_MS: f64 = 10_000.0;

/// Tuning for the virtual timeline: damping, easing and scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Fraction of the remaining distance closed per reference frame
    #[serde(default = "default_easing_rate")]
    pub easing_rate: f64,
    /// Multiplier applied to the easing rate while resting on an edge
    #[serde(default = "default_boundary_damping")]
    pub boundary_damping: f64,
    /// Remaining distance under which the scheduler may go idle
    #[serde(default = "default_stop_threshold")]
    pub stop_threshold: f64,
    /// Width of the quadratic damping zone at each edge (0 disables damping)
    #[serde(default = "default_boundary_zone")]
    pub boundary_zone: f64,
    /// Distance from an edge under which the current position snaps onto it
    #[serde(default = "default_snap_epsilon")]
    pub snap_epsilon: f64,
    /// Tolerance used to decide whether the target rests on an edge
    #[serde(default = "default_edge_epsilon")]
    pub edge_epsilon: f64,
    /// Settling window after the last input event
    #[serde(default = "default_settle_window")]
    pub settle_window_ms: u64,
    /// Frame interval the easing rate is expressed against (60 Hz)
    #[serde(default = "default_reference_frame")]
    pub reference_frame_ms: f64,
    /// Longest frame delta fed to the integrator
    #[serde(default = "default_max_frame")]
    pub max_frame_ms: f64,
    /// Viewport width under which the compact easing rate is used
    #[serde(default = "default_compact_breakpoint")]
    pub compact_breakpoint: f64,
    /// Easing rate for compact viewports
    #[serde(default = "default_compact_easing_rate")]
    pub compact_easing_rate: f64,
    /// Default duration of `scroll_to_position`
    #[serde(default = "default_scroll_to_duration")]
    pub scroll_to_duration_ms: u64,
    /// Curve used by `scroll_to_position`
    #[serde(default)]
    pub scroll_to_easing: EasingType,
    /// Ask the sink to restore every subscriber on destroy
    #[serde(default = "default_true")]
    pub restore_on_destroy: bool,
    /// Frames per second under which a warning is logged (0 = never)
    #[serde(default = "default_low_fps_warning")]
    pub low_fps_warning: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            easing_rate: default_easing_rate(),
            boundary_damping: default_boundary_damping(),
            stop_threshold: default_stop_threshold(),
            boundary_zone: default_boundary_zone(),
            snap_epsilon: default_snap_epsilon(),
            edge_epsilon: default_edge_epsilon(),
            settle_window_ms: default_settle_window(),
            reference_frame_ms: default_reference_frame(),
            max_frame_ms: default_max_frame(),
            compact_breakpoint: default_compact_breakpoint(),
            compact_easing_rate: default_compact_easing_rate(),
            scroll_to_duration_ms: default_scroll_to_duration(),
            scroll_to_easing: EasingType::default(),
            restore_on_destroy: default_true(),
            low_fps_warning: default_low_fps_warning(),
        }
    }
}

impl TimelineConfig {
    /// Replace unusable values with safe ones.
    ///
    /// Rates outside `(0, 1]` fall back to their defaults and multipliers are
    /// clamped into `(0, 1]`. A non-positive boundary zone turns damping off.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.easing_rate = rate_or_default(self.easing_rate, default_easing_rate(), "easing_rate");
        out.compact_easing_rate = rate_or_default(
            self.compact_easing_rate,
            default_compact_easing_rate(),
            "compact_easing_rate",
        );
        out.boundary_damping = if self.boundary_damping.is_finite() && self.boundary_damping > 0.0 {
            self.boundary_damping.min(1.0)
        } else {
            warn!("timeline.boundary_damping must be positive, using default");
            default_boundary_damping()
        };
        out.stop_threshold =
            non_negative_or_default(self.stop_threshold, default_stop_threshold(), "stop_threshold");
        out.snap_epsilon =
            non_negative_or_default(self.snap_epsilon, default_snap_epsilon(), "snap_epsilon");
        out.edge_epsilon =
            non_negative_or_default(self.edge_epsilon, default_edge_epsilon(), "edge_epsilon");
        out.compact_breakpoint = non_negative_or_default(
            self.compact_breakpoint,
            default_compact_breakpoint(),
            "compact_breakpoint",
        );
        out.boundary_zone = if self.boundary_zone.is_finite() {
            self.boundary_zone.max(0.0)
        } else {
            warn!("timeline.boundary_zone is not finite, disabling boundary damping");
            0.0
        };
        if !(self.reference_frame_ms > 0.0 && self.reference_frame_ms <= MAX_REFERENCE_FRAME_MS) {
            warn!(
                "timeline.reference_frame_ms must be in (0, {}], using default",
                MAX_REFERENCE_FRAME_MS
            );
            out.reference_frame_ms = default_reference_frame();
        }
        if !(self.max_frame_ms >= out.reference_frame_ms && self.max_frame_ms <= MAX_FRAME_LIMIT_MS)
        {
            warn!(
                "timeline.max_frame_ms must be between one reference frame and {}, using default",
                MAX_FRAME_LIMIT_MS
            );
            out.max_frame_ms = default_max_frame().max(out.reference_frame_ms);
        }
        out
    }

    #[inline]
    pub fn settle_window(&self) -> Duration {
        Duration::from_millis(self.settle_window_ms)
    }

    #[inline]
    pub fn reference_frame(&self) -> Duration {
        Duration::try_from_secs_f64(self.reference_frame_ms / 1000.0)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_reference_frame() / 1000.0))
    }

    #[inline]
    pub fn max_frame(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_frame_ms / 1000.0)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_max_frame() / 1000.0))
    }

    #[inline]
    pub fn scroll_to_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_to_duration_ms)
    }
}

fn rate_or_default(value: f64, default: f64, field: &str) -> f64 {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        value
    } else {
        warn!("timeline.{} = {} is outside (0, 1], using {}", field, value, default);
        default
    }
}

fn non_negative_or_default(value: f64, default: f64, field: &str) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("timeline.{} = {} must be non-negative, using {}", field, value, default);
        default
    }
}

/// Per-category translation tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTuning {
    /// Category-wide multiplier on top of each subscriber's speed
    pub intensity: f64,
    /// Speed used when a scanned layer does not declare one
    pub default_speed: f64,
}

/// Fade/scale tuning for text layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextTuning {
    #[serde(default = "default_text_min_opacity")]
    pub min_opacity: f64,
    #[serde(default = "default_text_opacity_falloff")]
    pub opacity_falloff: f64,
    #[serde(default = "default_text_base_scale")]
    pub base_scale: f64,
    #[serde(default = "default_text_scale_gain")]
    pub scale_gain: f64,
}

impl Default for TextTuning {
    fn default() -> Self {
        Self {
            min_opacity: default_text_min_opacity(),
            opacity_falloff: default_text_opacity_falloff(),
            base_scale: default_text_base_scale(),
            scale_gain: default_text_scale_gain(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerConfig {
    #[serde(default = "default_background")]
    pub background: LayerTuning,
    #[serde(default = "default_midground")]
    pub midground: LayerTuning,
    #[serde(default = "default_foreground")]
    pub foreground: LayerTuning,
    #[serde(default)]
    pub text: TextTuning,
    /// Fraction of the viewport an element must cross before it is revealed
    #[serde(default = "default_reveal_threshold")]
    pub reveal_threshold: f64,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            midground: default_midground(),
            foreground: default_foreground(),
            text: TextTuning::default(),
            reveal_threshold: default_reveal_threshold(),
        }
    }
}

impl LayerConfig {
    /// Non-finite tunings are replaced by their defaults.
    pub fn sanitized(&self) -> Self {
        fn tuning(t: LayerTuning, fallback: LayerTuning, name: &str) -> LayerTuning {
            if t.intensity.is_finite() && t.default_speed.is_finite() {
                t
            } else {
                warn!("layers.{} has non-finite values, using defaults", name);
                fallback
            }
        }

        let text = self.text;
        let text_ok = [text.min_opacity, text.opacity_falloff, text.base_scale, text.scale_gain]
            .iter()
            .all(|v| v.is_finite());

        Self {
            background: tuning(self.background, default_background(), "background"),
            midground: tuning(self.midground, default_midground(), "midground"),
            foreground: tuning(self.foreground, default_foreground(), "foreground"),
            text: if text_ok {
                TextTuning {
                    min_opacity: text.min_opacity.clamp(0.0, 1.0),
                    ..text
                }
            } else {
                warn!("layers.text has non-finite values, using defaults");
                TextTuning::default()
            },
            reveal_threshold: if self.reveal_threshold.is_finite() {
                self.reveal_threshold.max(0.0)
            } else {
                default_reveal_threshold()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds while nothing animates
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Frame rate while the timeline is moving
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
    /// Scroll units covered by one terminal row
    #[serde(default = "default_units_per_row")]
    pub units_per_row: f64,
    /// Scroll units per wheel notch or line key
    #[serde(default = "default_scroll_step")]
    pub scroll_step: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            animation_fps: default_animation_fps(),
            units_per_row: default_units_per_row(),
            scroll_step: default_scroll_step(),
        }
    }
}

impl UiConfig {
    /// Get tick duration for animation FPS
    pub fn animation_tick_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_millis(16) // ~60fps fallback
        } else {
            Duration::from_millis(1000 / self.animation_fps as u64)
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "G" (Shift+g), "<Space>", "<PageDown>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    /// Quit the application
    #[serde(default = "default_key_quit")]
    pub quit: String,
    /// Scroll one step down
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    /// Scroll one step up
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    /// Scroll one viewport down
    #[serde(default = "default_key_page_down")]
    pub page_down: String,
    /// Scroll one viewport up
    #[serde(default = "default_key_page_up")]
    pub page_up: String,
    /// Animated jump to the start of the timeline
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    /// Animated jump to the end of the timeline
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,
    /// Pause or resume the controller
    #[serde(default = "default_key_toggle_pause")]
    pub toggle_pause: String,
    /// Rebuild the layer registry
    #[serde(default = "default_key_rescan")]
    pub rescan: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            page_down: default_key_page_down(),
            page_up: default_key_page_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            toggle_pause: default_key_toggle_pause(),
            rescan: default_key_rescan(),
        }
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_page_down() -> String { "<C-d>".to_string() }
fn default_key_page_up() -> String { "<C-u>".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_toggle_pause() -> String { "p".to_string() }
fn default_key_rescan() -> String { "r".to_string() }

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_easing_rate() -> f64 {
    0.07
}

fn default_boundary_damping() -> f64 {
    0.85
}

fn default_stop_threshold() -> f64 {
    0.05
}

fn default_boundary_zone() -> f64 {
    150.0
}

fn default_snap_epsilon() -> f64 {
    0.5
}

fn default_edge_epsilon() -> f64 {
    1.0
}

fn default_settle_window() -> u64 {
    100
}

fn default_reference_frame() -> f64 {
    1000.0 / 60.0
}

fn default_max_frame() -> f64 {
    100.0
}

fn default_compact_breakpoint() -> f64 {
    768.0
}

fn default_compact_easing_rate() -> f64 {
    0.06
}

fn default_scroll_to_duration() -> u64 {
    1000
}

fn default_low_fps_warning() -> u32 {
    50
}

fn default_background() -> LayerTuning {
    LayerTuning { intensity: 0.5, default_speed: 0.15 }
}

fn default_midground() -> LayerTuning {
    LayerTuning { intensity: 0.75, default_speed: 0.3 }
}

fn default_foreground() -> LayerTuning {
    LayerTuning { intensity: 1.0, default_speed: 0.45 }
}

fn default_text_min_opacity() -> f64 {
    0.8
}

fn default_text_opacity_falloff() -> f64 {
    0.3
}

fn default_text_base_scale() -> f64 {
    0.95
}

fn default_text_scale_gain() -> f64 {
    0.05
}

fn default_reveal_threshold() -> f64 {
    0.5
}

fn default_tick_rate() -> u64 {
    100
}

fn default_animation_fps() -> u32 {
    60
}

fn default_units_per_row() -> f64 {
    8.0
}

fn default_scroll_step() -> f64 {
    24.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from an explicit path, falling back to defaults
    /// when the file does not exist
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/reelscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("reelscroll")
            .join("config.toml")
    }

    /// Get the log file path used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("reelscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeline_config() {
        let config = TimelineConfig::default();
        assert!((config.easing_rate - 0.07).abs() < f64::EPSILON);
        assert!((config.boundary_damping - 0.85).abs() < f64::EPSILON);
        assert!((config.boundary_zone - 150.0).abs() < f64::EPSILON);
        assert_eq!(config.settle_window(), Duration::from_millis(100));
        assert_eq!(config.scroll_to_easing, EasingType::InOutCubic);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [timeline]
            easing_rate = 0.05
            boundary_zone = 100.0

            [layers.background]
            intensity = 0.3
            default_speed = 0.1
            "#,
        )
        .unwrap();

        assert!((config.timeline.easing_rate - 0.05).abs() < f64::EPSILON);
        assert!((config.timeline.boundary_zone - 100.0).abs() < f64::EPSILON);
        assert!((config.timeline.stop_threshold - 0.05).abs() < f64::EPSILON);
        assert!((config.layers.background.intensity - 0.3).abs() < f64::EPSILON);
        assert!((config.layers.foreground.intensity - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.keymap.quit, "q");
    }

    #[test]
    fn test_easing_type_names() {
        let config: TimelineConfig = toml::from_str(r#"scroll_to_easing = "ease_out""#).unwrap();
        assert_eq!(config.scroll_to_easing, EasingType::EaseOut);
    }

    #[test]
    fn test_sanitize_rejects_bad_values() {
        let config = TimelineConfig {
            easing_rate: -1.0,
            boundary_damping: 3.0,
            boundary_zone: -20.0,
            stop_threshold: f64::NAN,
            reference_frame_ms: 0.0,
            max_frame_ms: 1.0,
            ..Default::default()
        }
        .sanitized();

        assert!((config.easing_rate - 0.07).abs() < f64::EPSILON);
        assert!((config.boundary_damping - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.boundary_zone, 0.0);
        assert!((config.stop_threshold - 0.05).abs() < f64::EPSILON);
        assert!(config.reference_frame_ms > 0.0);
        assert!(config.max_frame_ms >= config.reference_frame_ms);
    }

    #[test]
    fn test_sanitize_bounds_oversized_frames() {
        let config = TimelineConfig {
            reference_frame_ms: 1e300,
            max_frame_ms: 1e300,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.reference_frame_ms, 1000.0 / 60.0);
        assert_eq!(config.max_frame_ms, 100.0);
        assert_eq!(config.max_frame(), Duration::from_millis(100));

        let config: AppConfig =
            toml::from_str("[timeline]\nreference_frame_ms = 1e300\nmax_frame_ms = 5e3").unwrap();
        let config = config.timeline.sanitized();
        assert_eq!(config.reference_frame_ms, 1000.0 / 60.0);
        assert_eq!(config.max_frame_ms, 5_000.0);

        // Unsanitized values must not panic either
        let raw = TimelineConfig {
            reference_frame_ms: 1e300,
            ..Default::default()
        };
        assert!(raw.reference_frame() > Duration::ZERO);
    }

    #[test]
    fn test_save_and_load_round_trip_file() {
        let dir = std::env::temp_dir().join(format!("reelscroll-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.timeline.boundary_zone = 120.0;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert!((loaded.timeline.boundary_zone - 120.0).abs() < f64::EPSILON);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("reelscroll-definitely-missing.toml");
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ui.animation_fps, 60);
    }
}
