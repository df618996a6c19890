//! In-process command channel between the panel and renderer event loops.

use tokio::sync::{mpsc, oneshot};

use crate::messages::{CommandReply, OverlayCommand};

/// A command in flight, with the reply slot when the command expects one
#[derive(Debug)]
pub struct Envelope {
    pub command: OverlayCommand,
    pub reply: Option<oneshot::Sender<CommandReply>>,
}

pub type CommandSender = mpsc::UnboundedSender<Envelope>;
pub type CommandReceiver = mpsc::UnboundedReceiver<Envelope>;

/// Create the channel a renderer host listens on
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}

impl Envelope {
    /// Wrap a command, creating a reply channel only if the command expects one
    pub fn new(command: OverlayCommand) -> (Self, Option<oneshot::Receiver<CommandReply>>) {
        if command.expects_reply() {
            let (tx, rx) = oneshot::channel();
            (
                Self {
                    command,
                    reply: Some(tx),
                },
                Some(rx),
            )
        } else {
            (
                Self {
                    command,
                    reply: None,
                },
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::PixelSizeReply;

    #[test]
    fn test_fire_and_forget_has_no_reply_slot() {
        let (envelope, rx) = Envelope::new(OverlayCommand::HideOverlay);
        assert!(envelope.reply.is_none());
        assert!(rx.is_none());
    }

    #[test]
    fn test_detect_round_trips_reply() {
        let (envelope, rx) = Envelope::new(OverlayCommand::DetectPixelSize);
        let tx = envelope.reply.unwrap();
        tx.send(CommandReply::PixelSize(PixelSizeReply {
            pixel_size: Some(8),
        }))
        .unwrap();
        let reply = rx.unwrap().blocking_recv().unwrap();
        assert_eq!(reply.pixel_size(), Some(8));
    }
}
