//! Command delivery from the panel to the renderer

use std::time::Duration;

use pixel_overlay_ipc::{CommandReply, CommandSender, Envelope, OverlayCommand};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("No receiving end for command")]
    NoReceiver,

    #[error("Renderer dropped the reply")]
    ReplyDropped,

    #[error("Renderer injection failed: {0}")]
    Injection(String),
}

/// Link to a (possibly absent) renderer
#[allow(async_fn_in_trait)]
pub trait CommandTransport {
    /// Deliver one command, returning the reply for commands that expect one
    async fn send(&self, command: &OverlayCommand) -> Result<Option<CommandReply>, TransportError>;

    /// Bring up a renderer where there is none
    async fn inject_renderer(&self) -> Result<(), TransportError>;
}

/// Sends commands, recovering once from a missing renderer.
///
/// When nothing receives a command the dispatcher injects the renderer,
/// waits `retry_delay`, and tries again. A second failure drops the command.
#[derive(Debug)]
pub struct CommandDispatcher<T> {
    transport: T,
    retry_delay: Duration,
}

impl<T: CommandTransport> CommandDispatcher<T> {
    pub fn new(transport: T, retry_delay: Duration) -> Self {
        Self {
            transport,
            retry_delay,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn dispatch(&self, command: &OverlayCommand) -> Option<CommandReply> {
        match self.transport.send(command).await {
            Ok(reply) => reply,
            Err(TransportError::NoReceiver) => {
                debug!("No renderer for {}, injecting and retrying", command.action());
                if let Err(e) = self.transport.inject_renderer().await {
                    warn!("{}", e);
                }
                tokio::time::sleep(self.retry_delay).await;
                match self.transport.send(command).await {
                    Ok(reply) => reply,
                    Err(e) => {
                        debug!("Dropping {}: {}", command.action(), e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!("Failed to deliver {}: {}", command.action(), e);
                None
            }
        }
    }
}

/// Starts a renderer and returns the sender it listens on
pub type RendererInjector = Box<dyn Fn() -> Option<CommandSender> + Send + Sync>;

/// Transport over the in-process envelope channel
pub struct ChannelTransport {
    sender: Mutex<Option<CommandSender>>,
    injector: Option<RendererInjector>,
}

impl std::fmt::Debug for ChannelTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelTransport")
            .field("injector", &self.injector.is_some())
            .finish_non_exhaustive()
    }
}

impl ChannelTransport {
    /// Transport bound to a running renderer
    pub fn connected(sender: CommandSender) -> Self {
        Self {
            sender: Mutex::new(Some(sender)),
            injector: None,
        }
    }

    /// Transport with no renderer yet; `injector` starts one on demand
    pub fn lazy(injector: RendererInjector) -> Self {
        Self {
            sender: Mutex::new(None),
            injector: Some(injector),
        }
    }
}

impl CommandTransport for ChannelTransport {
    async fn send(&self, command: &OverlayCommand) -> Result<Option<CommandReply>, TransportError> {
        let reply = {
            let mut sender = self.sender.lock().await;
            let Some(tx) = sender.as_ref() else {
                return Err(TransportError::NoReceiver);
            };
            let (envelope, reply) = Envelope::new(command.clone());
            if tx.send(envelope).is_err() {
                *sender = None;
                return Err(TransportError::NoReceiver);
            }
            reply
        };

        match reply {
            Some(reply) => reply
                .await
                .map(Some)
                .map_err(|_| TransportError::ReplyDropped),
            None => Ok(None),
        }
    }

    async fn inject_renderer(&self) -> Result<(), TransportError> {
        let injector = self
            .injector
            .as_ref()
            .ok_or_else(|| TransportError::Injection("no injector configured".to_string()))?;
        let sender = injector()
            .ok_or_else(|| TransportError::Injection("renderer did not start".to_string()))?;
        *self.sender.lock().await = Some(sender);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_overlay_ipc::{PixelSizeReply, command_channel};
    use pixel_overlay_renderer::{HeadlessSurface, OverlayRenderer, RendererHost};
    use pixel_overlay_store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails the first `failures` sends with `NoReceiver`
    #[derive(Default)]
    struct FlakyTransport {
        failures: usize,
        sends: AtomicUsize,
        injections: AtomicUsize,
    }

    impl CommandTransport for FlakyTransport {
        async fn send(&self, _: &OverlayCommand) -> Result<Option<CommandReply>, TransportError> {
            let attempt = self.sends.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                Err(TransportError::NoReceiver)
            } else {
                Ok(Some(CommandReply::PixelSize(PixelSizeReply {
                    pixel_size: Some(4),
                })))
            }
        }

        async fn inject_renderer(&self) -> Result<(), TransportError> {
            self.injections.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn dispatcher(failures: usize) -> CommandDispatcher<FlakyTransport> {
        CommandDispatcher::new(
            FlakyTransport {
                failures,
                ..Default::default()
            },
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn test_delivers_without_retry() {
        let dispatcher = dispatcher(0);
        let reply = dispatcher.dispatch(&OverlayCommand::DetectPixelSize).await;
        assert_eq!(reply.and_then(|r| r.pixel_size()), Some(4));
        assert_eq!(dispatcher.transport().sends.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.transport().injections.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_retries_once_after_injection() {
        let dispatcher = dispatcher(1);
        let reply = dispatcher.dispatch(&OverlayCommand::DetectPixelSize).await;
        assert_eq!(reply.and_then(|r| r.pixel_size()), Some(4));
        assert_eq!(dispatcher.transport().sends.load(Ordering::SeqCst), 2);
        assert_eq!(dispatcher.transport().injections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_failure_is_dropped() {
        let dispatcher = dispatcher(5);
        let reply = dispatcher.dispatch(&OverlayCommand::ShowOverlay).await;
        assert!(reply.is_none());
        assert_eq!(dispatcher.transport().sends.load(Ordering::SeqCst), 2);
        assert_eq!(dispatcher.transport().injections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_channel_without_renderer_has_no_receiver() {
        let (sender, receiver) = command_channel();
        drop(receiver);
        let transport = ChannelTransport::connected(sender);
        let result = transport.send(&OverlayCommand::HideOverlay).await;
        assert!(matches!(result, Err(TransportError::NoReceiver)));
        assert!(transport.inject_renderer().await.is_err());
    }

    #[tokio::test]
    async fn test_lazy_transport_injects_renderer() {
        let injector: RendererInjector = Box::new(|| {
            let renderer = OverlayRenderer::new(MemoryStore::new(), HeadlessSurface::new())
                .with_detector(|| Some(6u32));
            let (sender, _handle) = RendererHost::spawn(renderer);
            Some(sender)
        });
        let dispatcher = CommandDispatcher::new(
            ChannelTransport::lazy(injector),
            Duration::from_millis(1),
        );

        let reply = dispatcher.dispatch(&OverlayCommand::DetectPixelSize).await;
        assert_eq!(reply.and_then(|r| r.pixel_size()), Some(6));
    }
}
