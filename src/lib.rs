//! minpair - minimal-pair listening drills in the terminal
//!
//! Loads a catalog of minimal-pair contrasts (e.g. "pat"/"bat" for a p/b
//! drill), renders it as a navigable list, and speaks words through the
//! host platform's text-to-speech engine.

pub mod error;
pub mod input;
pub mod speech;
pub mod state;
pub mod terminal;
pub mod view;
pub mod words;

pub use error::{MinpairError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "minpair";
