//! Overlay renderer for the pixel overlay
//!
//! The renderer is the persistent, page-side half of the system. It owns the
//! overlay's visual state, applies every command from the control panel,
//! writes each resulting snapshot through to the store, and reconstructs
//! itself from the store on startup.
//!
//! Presentation is delegated to an [`OverlaySurface`]; image decoding is the
//! only suspending step and is driven by [`RendererHost`], which runs the
//! renderer on a single cooperative event loop.

pub mod detector;
pub mod drag;
pub mod grid;
pub mod host;
pub mod renderer;
pub mod surface;

pub use detector::{CaptureDetector, NoDetector, PixelSizeDetector};
pub use drag::{DragTarget, DragTracker};
pub use grid::GridLayout;
pub use host::RendererHost;
pub use renderer::{DecodeRequest, DecodeTicket, HandleOutcome, OverlayRenderer, RendererPhase};
pub use surface::{HeadlessSurface, OverlaySurface, Presentation};
