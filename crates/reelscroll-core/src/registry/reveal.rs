//! One-shot reveal animations triggered by scroll position

use std::rc::Weak;

use tracing::debug;

use crate::surface::{RevealSpec, VisualEffectSink};

#[derive(Debug, Clone)]
struct RevealEntry<E> {
    element: Weak<E>,
    offset: f64,
    threshold: Option<f64>,
    animation: String,
    revealed: bool,
}

/// Elements waiting to be revealed, rebuilt on every scan
#[derive(Debug)]
pub struct RevealSet<E> {
    entries: Vec<RevealEntry<E>>,
}

impl<E> Default for RevealSet<E> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<E> RevealSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revealed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.revealed).count()
    }

    /// Replace the set with freshly scanned specs.
    ///
    /// An element that was already revealed stays revealed.
    pub fn rebuild(&mut self, specs: Vec<RevealSpec<E>>) {
        let previous = std::mem::take(&mut self.entries);
        self.entries = specs
            .into_iter()
            .filter(|spec| spec.element.strong_count() > 0)
            .map(|spec| {
                let revealed = previous
                    .iter()
                    .any(|old| old.revealed && Weak::ptr_eq(&old.element, &spec.element));
                RevealEntry {
                    element: spec.element,
                    offset: spec.offset,
                    threshold: spec.threshold,
                    animation: spec.animation,
                    revealed,
                }
            })
            .collect();
    }

    /// Reveal every pending element whose leading edge has crossed the
    /// threshold line. Returns how many were revealed by this call.
    pub fn evaluate<K>(
        &mut self,
        current: f64,
        viewport_extent: f64,
        default_threshold: f64,
        sink: &mut K,
    ) -> usize
    where
        K: VisualEffectSink<E> + ?Sized,
    {
        let mut count = 0;
        for entry in self.entries.iter_mut().filter(|e| !e.revealed) {
            let Some(element) = entry.element.upgrade() else {
                continue;
            };
            let threshold = entry.threshold.unwrap_or(default_threshold);
            if entry.offset - current < viewport_extent * threshold {
                sink.reveal(&element, &entry.animation);
                entry.revealed = true;
                count += 1;
            }
        }
        if count > 0 {
            debug!("Revealed {} element(s) at position {:.1}", count, current);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Edge;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl VisualEffectSink<&'static str> for Log {
        fn apply_translation(&mut self, _: &&'static str, _: f64, _: f64) {}
        fn apply_opacity_scale(&mut self, _: &&'static str, _: f64, _: f64) {}
        fn reveal(&mut self, element: &&'static str, animation: &str) {
            self.0.push(format!("{}:{}", element, animation));
        }
        fn boundary_changed(&mut self, _: Edge, _: bool) {}
    }

    #[test]
    fn test_reveals_once_past_threshold() {
        let lineup = Rc::new("lineup");
        let mut set = RevealSet::new();
        set.rebuild(vec![RevealSpec::new(Rc::downgrade(&lineup), 1000.0, "fade-up")]);
        let mut log = Log::default();

        assert_eq!(set.evaluate(500.0, 800.0, 0.5, &mut log), 0);
        assert_eq!(set.evaluate(700.0, 800.0, 0.5, &mut log), 1);
        assert_eq!(set.evaluate(900.0, 800.0, 0.5, &mut log), 0);
        assert_eq!(log.0, vec!["lineup:fade-up".to_string()]);
    }

    #[test]
    fn test_rebuild_keeps_revealed_flags() {
        let hero = Rc::new("hero");
        let mut set = RevealSet::new();
        set.rebuild(vec![RevealSpec::new(Rc::downgrade(&hero), 0.0, "zoom")]);
        let mut log = Log::default();
        set.evaluate(0.0, 800.0, 0.5, &mut log);

        set.rebuild(vec![RevealSpec::new(Rc::downgrade(&hero), 0.0, "zoom")]);
        assert_eq!(set.revealed_count(), 1);
        assert_eq!(set.evaluate(0.0, 800.0, 0.5, &mut log), 0);
    }

    #[test]
    fn test_dead_elements_are_dropped() {
        let gone = Rc::new("gone");
        let weak = Rc::downgrade(&gone);
        drop(gone);

        let mut set: RevealSet<&'static str> = RevealSet::new();
        set.rebuild(vec![RevealSpec::new(weak, 0.0, "fade")]);
        assert!(set.is_empty());
    }
}
