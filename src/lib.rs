//! liveline: animated live line-chart engine.
//!
//! Each frame a pure `tick` eases the displayed value, range and window
//! toward the latest data and emits a backend-agnostic `RenderFrame`.
//! Hosts drive the loop through `LivelineEngine` (or the `LivelineInstance`
//! wrapper around loosely typed JSON options) and hand frames to a
//! `Renderer`.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{
    EngineHandle, FrameClock, LivelineConfig, LivelineEngine, LivelineInstance, LivelineOptions,
    TickOutcome, create_engine, tick,
};
pub use error::{LivelineError, LivelineResult};
