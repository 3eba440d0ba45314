//! dmthread-tui: terminal front end for the dmthread pipeline.
//!
//! The core pipeline talks to an abstract display surface; this crate
//! provides the terminal implementation of that surface, the frame model
//! the app paints into, and the interactive view model.

pub mod app;
pub mod frame;
pub mod thread_view;
