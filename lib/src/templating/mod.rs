pub mod minijinja;
mod loader;

pub use loader::*;

use std::fmt::Debug;

use serde::Serialize;

use crate::error::Result;

/// Name under which engine-reserved data is exposed to every template.
pub const RESERVED_NAMESPACE: &str = "swatch";

/// Constructs engines. Engines may cache templates they have loaded, so every
/// rendering phase asks for a new one instead of reusing an old one.
pub trait EngineInit {
    type Engine: Engine + 'static;

    /// Builds an engine resolving template names through `loader` and exposing
    /// `reserved` to templates as [`RESERVED_NAMESPACE`].
    fn init<L: Loader, G: Serialize>(loader: L, reserved: G) -> Self::Engine;
}

pub trait Engine: Debug {
    /// Renders the template `name` with `context` as its variables.
    fn render<C: Serialize + ?Sized>(&self, name: &str, context: &C) -> Result<String>;
}
