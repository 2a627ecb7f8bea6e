mod parallax_view;
mod status_bar;

pub use parallax_view::ParallaxView;
pub use status_bar::StatusBarWidget;
