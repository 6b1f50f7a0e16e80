// Library crate: the editor, scene and export logic, testable without a window.
// GUI-specific modules (app, ui, GL viewport) remain in the binary crate.

pub mod export;
pub mod grid;
pub mod harness;
pub mod scene;
pub mod sketch;
pub mod state;
