//! Registry of elements that react to the timeline position
//!
//! # Layers
//!
//! ## Atoms
//! - `subscriber` - Categories, axes, handles and the applied-effect record
//! - `effect` - Pure effect math per category
//!
//! ## Molecules
//! - `reveal` - One-shot reveal animations
//! - `SubscriberRegistry` (this module) - Ordered subscribers and their application

pub mod effect;
pub mod reveal;
pub mod subscriber;

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::LayerConfig;
use crate::surface::{LayerSpec, VisualEffectSink};

pub use effect::compute as compute_effect;
pub use reveal::RevealSet;
pub use subscriber::{AppliedEffect, Axis, LayerCategory, Origin, Subscriber, SubscriptionId};

/// Subscribers in registration order.
///
/// Holds only weak references: an element dropped by the host is skipped on
/// application and forgotten on the next rescan.
#[derive(Debug)]
pub struct SubscriberRegistry<E> {
    entries: Vec<Subscriber<E>>,
    next_id: u64,
}

impl<E> Default for SubscriberRegistry<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> SubscriberRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscriber<E>> {
        self.entries.iter()
    }

    pub fn get(&self, id: SubscriptionId) -> Option<&Subscriber<E>> {
        self.entries.iter().find(|s| s.id == id)
    }

    /// Register an element, replacing any existing entry for the same
    /// element. A replaced entry keeps its handle and its position.
    pub fn register(
        &mut self,
        element: &Rc<E>,
        speed_factor: f64,
        axis: Axis,
        category: LayerCategory,
    ) -> SubscriptionId {
        self.upsert(Rc::downgrade(element), speed_factor, axis, category, Origin::Explicit)
    }

    pub fn register_range<'a, I>(&mut self, items: I) -> Vec<SubscriptionId>
    where
        E: 'a,
        I: IntoIterator<Item = (&'a Rc<E>, f64, Axis, LayerCategory)>,
    {
        items
            .into_iter()
            .map(|(element, speed, axis, category)| self.register(element, speed, axis, category))
            .collect()
    }

    /// Returns false when the handle is unknown
    pub fn unregister(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        before != self.entries.len()
    }

    pub fn unregister_all(&mut self) {
        self.entries.clear();
    }

    /// Replace every scanned subscriber with a fresh scan.
    ///
    /// Explicit registrations stay and win over a scanned spec for the same
    /// element. Dead entries of either origin are pruned. A scanned element
    /// that was already present keeps its handle.
    pub fn rebuild_from_scan(&mut self, specs: Vec<LayerSpec<E>>, layers: &LayerConfig) {
        let previous = std::mem::take(&mut self.entries);
        let (explicit, scanned): (Vec<_>, Vec<_>) = previous
            .into_iter()
            .filter(Subscriber::is_alive)
            .partition(|s| s.origin == Origin::Explicit);
        self.entries = explicit;

        for spec in specs {
            if spec.element.strong_count() == 0 {
                continue;
            }
            if self.entries.iter().any(|s| s.refers_to(&spec.element)) {
                continue;
            }
            // A rescanned element keeps its handle and its last written effect
            let (id, last_applied) = match scanned.iter().find(|s| s.refers_to(&spec.element)) {
                Some(old) => (old.id, old.last_applied),
                None => (self.allocate_id(), None),
            };
            let speed_factor = spec
                .speed
                .filter(|s| s.is_finite())
                .unwrap_or_else(|| spec.category.default_speed(layers));
            self.entries.push(Subscriber {
                id,
                element: spec.element,
                speed_factor,
                axis: spec.axis,
                category: spec.category,
                origin: Origin::Scanned,
                last_applied,
            });
        }
        debug!("Registry rebuilt with {} subscriber(s)", self.entries.len());
    }

    /// Write every live subscriber's effect for `current` to the sink.
    /// Returns how many subscribers were applied.
    pub fn apply_all<K>(
        &mut self,
        current: f64,
        viewport_extent: f64,
        layers: &LayerConfig,
        sink: &mut K,
    ) -> usize
    where
        K: VisualEffectSink<E> + ?Sized,
    {
        let mut applied = 0;
        for subscriber in &mut self.entries {
            let Some(element) = subscriber.element.upgrade() else {
                continue;
            };
            let effect = effect::compute(
                subscriber.category,
                subscriber.speed_factor,
                subscriber.axis,
                current,
                viewport_extent,
                layers,
            );
            match effect {
                AppliedEffect::Translation { x, y } => sink.apply_translation(&element, x, y),
                AppliedEffect::OpacityScale { opacity, scale } => {
                    sink.apply_opacity_scale(&element, opacity, scale)
                }
            }
            subscriber.last_applied = Some(effect);
            applied += 1;
        }
        applied
    }

    /// Hand every touched element back to the sink for restoration
    pub fn restore_all<K>(&mut self, sink: &mut K)
    where
        K: VisualEffectSink<E> + ?Sized,
    {
        for subscriber in &mut self.entries {
            if subscriber.last_applied.take().is_none() {
                continue;
            }
            if let Some(element) = subscriber.element.upgrade() {
                sink.restore(&element);
            }
        }
    }

    fn upsert(
        &mut self,
        element: Weak<E>,
        speed_factor: f64,
        axis: Axis,
        category: LayerCategory,
        origin: Origin,
    ) -> SubscriptionId {
        let speed_factor = if speed_factor.is_finite() { speed_factor } else { 0.0 };

        if let Some(existing) = self.entries.iter_mut().find(|s| s.refers_to(&element)) {
            existing.speed_factor = speed_factor;
            existing.axis = axis;
            existing.category = category;
            existing.origin = origin;
            return existing.id;
        }

        let id = self.allocate_id();
        self.entries.push(Subscriber {
            id,
            element,
            speed_factor,
            axis,
            category,
            origin,
            last_applied: None,
        });
        id
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }
}
