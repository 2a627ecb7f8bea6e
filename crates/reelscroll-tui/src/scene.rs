//! The festival poster drawn by the terminal demo
//!
//! Positions are in terminal cells of the unscrolled poster. Each element
//! carries the effect most recently written by the controller, so the
//! renderer never has to ask the controller anything.

use std::cell::Cell;
use std::rc::Rc;

use reelscroll_core::{Axis, LayerCategory};

/// Colour role an element is painted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Stars,
    Moon,
    Hills,
    Stage,
    Crowd,
    Lights,
    Headline,
    Body,
}

/// Effect state written by the sink, read by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Presentation {
    /// Horizontal shift in scroll units
    pub dx: f64,
    /// Vertical shift in scroll units
    pub dy: f64,
    pub opacity: f64,
    pub scale: f64,
    pub revealed: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            dx: 0.0,
            dy: 0.0,
            opacity: 1.0,
            scale: 1.0,
            revealed: false,
        }
    }
}

/// One piece of ASCII art on the poster
#[derive(Debug)]
pub struct SceneElement {
    pub name: String,
    pub row: u16,
    pub col: u16,
    pub art: Vec<String>,
    pub paint: Paint,
    presentation: Cell<Presentation>,
}

impl SceneElement {
    pub fn new(name: &str, row: u16, col: u16, art: &[&str], paint: Paint) -> Self {
        Self {
            name: name.to_string(),
            row,
            col,
            art: art.iter().map(|line| line.to_string()).collect(),
            paint,
            presentation: Cell::new(Presentation::default()),
        }
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation.get()
    }

    pub fn update(&self, f: impl FnOnce(&mut Presentation)) {
        let mut p = self.presentation.get();
        f(&mut p);
        self.presentation.set(p);
    }

    pub fn height(&self) -> u16 {
        self.art.len() as u16
    }
}

/// A parallax layer of the poster
#[derive(Debug, Clone)]
pub struct SceneLayer {
    pub element: Rc<SceneElement>,
    pub category: LayerCategory,
    pub speed: Option<f64>,
    pub axis: Axis,
}

/// A poster section that slides in once it is scrolled into view
#[derive(Debug, Clone)]
pub struct SceneReveal {
    pub element: Rc<SceneElement>,
    pub animation: String,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub rows: u16,
    pub layers: Vec<SceneLayer>,
    pub reveals: Vec<SceneReveal>,
}

impl Scene {
    /// Every element, back to front
    pub fn elements(&self) -> impl Iterator<Item = &Rc<SceneElement>> {
        self.layers
            .iter()
            .map(|l| &l.element)
            .chain(self.reveals.iter().map(|r| &r.element))
    }

    pub fn find(&self, name: &str) -> Option<&Rc<SceneElement>> {
        self.elements().find(|e| e.name == name)
    }

    /// The night-festival poster
    pub fn festival() -> Self {
        let mut scene = Scene {
            rows: 140,
            layers: Vec::new(),
            reveals: Vec::new(),
        };

        scene.layer(
            SceneElement::new(
                "stars",
                0,
                2,
                &[
                    "  .    *        .         +      .     *   .        .    *",
                    "*    .      +        .  *     .            .    +        .",
                    "   .     .      *          .      *   .        *   .   ",
                    " +    *      .      .   +      .        .  *        .  +",
                ],
                Paint::Stars,
            ),
            LayerCategory::Background,
            Some(0.1),
        );
        scene.layer(
            SceneElement::new("moon", 2, 60, &[" _..._ ", ".:::::.", ":::::::", "`:::::'", "  `\"`  "], Paint::Moon),
            LayerCategory::Background,
            None,
        );
        scene.layer(
            SceneElement::new(
                "hills",
                14,
                0,
                &[
                    "        /\\                 /\\/\\                    /\\        ",
                    "   /\\  /  \\      /\\      /    \\    /\\         /\\ /  \\   /\\   ",
                    "  /  \\/    \\    /  \\/\\  /      \\  /  \\  /\\   /  V    \\ /  \\  ",
                    " /          \\__/      \\/        \\/    \\/  \\_/          V    \\ ",
                ],
                Paint::Hills,
            ),
            LayerCategory::Background,
            Some(0.25),
        );
        scene.layer(
            SceneElement::new(
                "stage",
                20,
                14,
                &[
                    "   ____________________________________   ",
                    "  |  ~  ~  ~  REELSCROLL  FEST  ~  ~  ~ |  ",
                    "  |____________________________________|  ",
                    "  ||   []      []      []      []     ||  ",
                    " _||__________________________________||_ ",
                ],
                Paint::Stage,
            ),
            LayerCategory::Midground,
            None,
        );
        scene.layer(
            SceneElement::new(
                "crowd",
                27,
                4,
                &[
                    " o  \\o/  o   o/  \\o  o  \\o/   o  o/  \\o   o  \\o/  o ",
                    "/|\\  |  /|\\ /|   |\\ /|\\  |   /|\\ /|   |\\ /|\\  |  /|\\",
                ],
                Paint::Crowd,
            ),
            LayerCategory::Midground,
            Some(0.35),
        );
        scene.layer(
            SceneElement::new(
                "lights",
                8,
                0,
                &[
                    "\\\\                                                            //",
                    " \\\\                                                          // ",
                    "  \\\\                                                        //  ",
                ],
                Paint::Lights,
            ),
            LayerCategory::Foreground,
            None,
        );
        let drift = scene.layer(
            SceneElement::new("drift", 32, 0, &["~ ~ ~   ~ ~   ~ ~ ~   ~ ~ ~   ~ ~   ~ ~ ~"], Paint::Lights),
            LayerCategory::Foreground,
            Some(0.3),
        );
        drift.axis = Axis::Horizontal;
        scene.layer(
            SceneElement::new(
                "headline",
                36,
                16,
                &["R E E L S C R O L L   F E S T", "three nights under the open sky"],
                Paint::Headline,
            ),
            LayerCategory::Text,
            None,
        );

        let sections: [(&str, u16, &[&str], &str); 4] = [
            (
                "lineup",
                50,
                &["LINEUP", "", "Fri  The Parallax Owls", "Sat  Damped Oscillators", "Sun  Frame Budget"],
                "slide-up",
            ),
            (
                "tickets",
                72,
                &["TICKETS", "", "Day pass      40", "Weekend pass  95", "Camping       +20"],
                "fade-in",
            ),
            (
                "map",
                94,
                &["GETTING THERE", "", "Shuttle from the station every 20 min", "Bike parking at the north gate"],
                "slide-left",
            ),
            (
                "faq",
                116,
                &["FAQ", "", "Rain?  The show goes on.", "Pets?  Only the well behaved ones.", "", "See you at the front."],
                "fade-in",
            ),
        ];
        for (name, row, art, animation) in sections {
            scene.reveals.push(SceneReveal {
                element: Rc::new(SceneElement::new(name, row, 12, art, Paint::Body)),
                animation: animation.to_string(),
            });
        }

        scene
    }

    fn layer(
        &mut self,
        element: SceneElement,
        category: LayerCategory,
        speed: Option<f64>,
    ) -> &mut SceneLayer {
        self.layers.push(SceneLayer {
            element: Rc::new(element),
            category,
            speed,
            axis: Axis::Vertical,
        });
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_festival_scene_fits_its_rows() {
        let scene = Scene::festival();
        for element in scene.elements() {
            assert!(element.row + element.height() <= scene.rows, "{} overflows", element.name);
        }
        assert!(scene.find("headline").is_some());
        assert_eq!(scene.reveals.len(), 4);
    }

    #[test]
    fn test_update_presentation() {
        let element = SceneElement::new("x", 0, 0, &["x"], Paint::Body);
        element.update(|p| p.dy = -12.0);
        assert_eq!(element.presentation().dy, -12.0);
        assert!(!element.presentation().revealed);
    }
}
