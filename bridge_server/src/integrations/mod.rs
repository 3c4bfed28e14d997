//! Concrete implementations of the engine's remote-system seams, plus the event hook wiring.
pub mod mirror;
pub mod refresh;
pub mod splynx;
pub mod uisp;
