//! Single-threaded event loop around an [`OverlayRenderer`]
//!
//! Commands are applied in arrival order. Decodes run on the blocking pool
//! and report back into the same loop, so the renderer is never touched
//! from two tasks at once.

use pixel_overlay_imaging::{ImageSize, RasterError, decode_size};
use pixel_overlay_ipc::{CommandReceiver, CommandSender, Envelope, command_channel};
use pixel_overlay_store::StateStore;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::renderer::{DecodeRequest, DecodeTicket, OverlayRenderer};
use crate::surface::OverlaySurface;

struct DecodeCompletion {
    ticket: DecodeTicket,
    result: Result<Result<ImageSize, RasterError>, JoinError>,
}

/// Drives a renderer from a command channel
pub struct RendererHost<S, F> {
    renderer: OverlayRenderer<S, F>,
    commands: CommandReceiver,
}

impl<S, F> RendererHost<S, F>
where
    S: StateStore + Send + 'static,
    F: OverlaySurface + Send + 'static,
{
    pub fn new(renderer: OverlayRenderer<S, F>, commands: CommandReceiver) -> Self {
        Self { renderer, commands }
    }

    /// Spawn a host on the current runtime.
    ///
    /// The task ends once every sender is dropped and outstanding decodes
    /// have reported back; it yields the renderer for inspection.
    pub fn spawn(
        renderer: OverlayRenderer<S, F>,
    ) -> (CommandSender, JoinHandle<OverlayRenderer<S, F>>) {
        let (sender, commands) = command_channel();
        let handle = tokio::spawn(Self::new(renderer, commands).run());
        (sender, handle)
    }

    pub async fn run(mut self) -> OverlayRenderer<S, F> {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<DecodeCompletion>();
        let mut in_flight = 0usize;
        let mut accepting = true;

        if let Some(request) = self.renderer.load() {
            spawn_decode(request, &done_tx);
            in_flight += 1;
        }
        info!("Overlay renderer ready ({:?})", self.renderer.phase());

        while accepting || in_flight > 0 {
            tokio::select! {
                envelope = self.commands.recv(), if accepting => match envelope {
                    Some(envelope) => {
                        if let Some(request) = self.dispatch(envelope) {
                            spawn_decode(request, &done_tx);
                            in_flight += 1;
                        }
                    }
                    None => {
                        debug!("Command channel closed");
                        accepting = false;
                    }
                },
                Some(done) = done_rx.recv(), if in_flight > 0 => {
                    in_flight -= 1;
                    match done.result {
                        Ok(result) => self.renderer.finish_decode(done.ticket, result),
                        Err(e) => self.renderer.fail_decode(done.ticket, &e),
                    }
                }
            }
        }

        debug!("Overlay renderer stopped");
        self.renderer
    }

    fn dispatch(&mut self, envelope: Envelope) -> Option<DecodeRequest> {
        let Envelope { command, reply } = envelope;
        let outcome = self.renderer.handle(command);
        match (outcome.reply, reply) {
            (Some(answer), Some(reply)) => {
                if reply.send(answer).is_err() {
                    debug!("Reply receiver dropped");
                }
            }
            (Some(_), None) => warn!("Reply produced for a command sent without a reply channel"),
            _ => {}
        }
        outcome.decode
    }
}

fn spawn_decode(request: DecodeRequest, done: &mpsc::UnboundedSender<DecodeCompletion>) {
    let done = done.clone();
    let DecodeRequest { ticket, raster } = request;
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || decode_size(&raster)).await;
        let _ = done.send(DecodeCompletion { ticket, result });
    });
}
