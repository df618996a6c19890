//! Control panel for the pixel overlay
//!
//! The panel is the transient half of the system: it holds the user's
//! inputs, runs the pixelizer, and dispatches commands to the renderer.
//! It never computes the overlay's position or visibility itself.

mod panel;
mod share;
mod transport;

pub use panel::{ControlPanel, ImageSettings};
pub use share::{ShareCodeError, ShareConfig};
pub use transport::{
    ChannelTransport, CommandDispatcher, CommandTransport, RendererInjector, TransportError,
};
