//! Asynchronous stylesheet and script loading for a live page, with
//! completion detection across engine families that disagree on how (or
//! whether) to signal that an injected resource has become usable.

pub mod config;
pub mod detect;
pub mod engine;
pub mod env;
pub mod errors;
pub mod page;
pub mod plugin;

pub use config::LoaderConfig;
pub use errors::LoaderError;

pub use engine::*;
