//! dmthread-core: the normalization and incremental-rendering pipeline for
//! exported direct-message conversations.
//!
//! The pipeline takes raw, untrusted export records ([`model::RawMessage`]),
//! repairs mis-decoded text, drops platform event noise, resolves shared
//! links, and produces a sorted canonical sequence that the windowed
//! [`render::RenderTask`] materializes onto an abstract
//! [`render::ThreadSurface`] in cooperative batches. The
//! [`conversation::Conversation`] controller ties the stages together and
//! owns the visible-window state across load-more actions.
//!
//! Front ends (terminal, or anything else that can implement
//! `ThreadSurface`) live in sibling crates.

pub mod conversation;
pub mod feed;
pub mod grouping;
pub mod model;
pub mod mojibake;
pub mod noise;
pub mod normalize;
pub mod render;
pub mod share;
