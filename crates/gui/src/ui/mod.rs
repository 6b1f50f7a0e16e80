pub mod notices;
pub mod sketch_canvas;
pub mod sketch_toolbar;
pub mod status_bar;
