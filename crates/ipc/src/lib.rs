//! IPC message protocol for the pixel overlay
//!
//! Defines the snapshot shared by the control panel and the overlay renderer,
//! the commands the panel sends, and the in-process channel that carries them.

pub mod channel;
pub mod error;
pub mod messages;
pub mod types;

pub use channel::{CommandReceiver, CommandSender, Envelope, command_channel};
pub use error::IpcError;
pub use messages::{CommandReply, OverlayCommand, PixelSizeReply, SetImageRequest};
pub use types::{DataUrlParts, OverlayState, Position, RasterData};
