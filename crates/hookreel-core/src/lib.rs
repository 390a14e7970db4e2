//! # hookreel-core
//!
//! Core types shared by every hookreel crate: the RGBA frame buffer the
//! composer draws into, colors, the error taxonomy and the TOML configuration.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;

pub use config::*;

pub use color::Color;
pub use error::{CompositionStep, HookreelError, HookreelResult};
pub use frame::FrameBuffer;
