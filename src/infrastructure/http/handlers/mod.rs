//! HTTP Handlers

mod ping;
mod speech;
mod voices;

pub use ping::*;
pub use speech::*;
pub use voices::*;
