//! Virtual timeline for scroll-driven parallax
//!
//! The timeline never exposes the raw host scroll offset to visual effects.
//! Input is hard-clamped and damped near the content edges before it becomes
//! the target, and a per-frame integrator eases the rendered position toward
//! that target. Because the target can never leave `[0, max_extent]`, the
//! rendered position cannot overshoot either, which removes elastic
//! overscroll at its source.
//!
//! # Layers
//!
//! ## Atoms
//! - `damping` - Pure boundary damping function
//! - `easing` - Pure easing curves for programmatic jumps
//! - `timing` - Progress, interpolation and frame-scale helpers
//!
//! ## Molecules
//! - `state` - The authoritative raw/target/current model
//! - `integrator` - One easing step of current toward target

pub mod damping;
pub mod easing;
pub mod timing;

pub mod integrator;
pub mod state;

pub use damping::damp;
pub use integrator::{tick, EasingParams, TickOutcome};
pub use state::TimelineState;
