//! Pixel Overlay - command-line driver
//!
//! Each run opens the JSON store, starts the renderer host (which restores
//! the stored overlay), restores the control panel, performs one action, then
//! closes the command channel and waits for the renderer to drain.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use pixel_overlay_config::{AppConfig, PalettePreset};
use pixel_overlay_imaging::{Palette, pixelize};
use pixel_overlay_ipc::OverlayState;
use pixel_overlay_panel::{ChannelTransport, CommandDispatcher, ControlPanel, ImageSettings};
use pixel_overlay_renderer::{CaptureDetector, HeadlessSurface, OverlayRenderer, RendererHost};
use pixel_overlay_store::{JsonFileStore, StateStore, ensure_initialized};
use tracing::{info, warn};

mod cli;
mod logging;

use cli::{Cli, Command, PaletteArgs};

type Panel = ControlPanel<ChannelTransport, JsonFileStore>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut config = AppConfig::from_env();
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        Command::Pixelize {
            input,
            output,
            pixel_size,
            palette,
        } => pixelize_file(&input, &output, pixel_size, &palette),
        Command::Status => {
            let state = stored_state(&JsonFileStore::new(&config.store_path));
            println!("{}", status_summary(&state));
            Ok(())
        }
        command => run_session(command, &config).await.map(|_| ()),
    }
}

/// Palette text from `--palette` or `--preset`
fn palette_text(args: &PaletteArgs) -> Result<Option<String>> {
    if let Some(name) = &args.preset {
        let preset = PalettePreset::from_name(name).ok_or_else(|| {
            anyhow!("unknown palette preset {:?} (expected wplace or rplace)", name)
        })?;
        return Ok(Some(preset.text()));
    }
    Ok(args.palette.clone())
}

fn pixelize_file(input: &Path, output: &Path, pixel_size: u32, args: &PaletteArgs) -> Result<()> {
    let source = image::open(input)
        .with_context(|| format!("failed to open {}", input.display()))?
        .to_rgba8();
    let palette = palette_text(args)?.map(|text| Palette::parse(&text));
    if let Some(palette) = &palette {
        if palette.is_empty() {
            bail!("palette contains no valid colors");
        }
    }

    let result = pixelize(&source, pixel_size, palette.as_ref());
    result
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        "Pixelized {} ({}x{}, block {}) -> {}",
        input.display(),
        source.width(),
        source.height(),
        pixel_size.max(1),
        output.display()
    );
    Ok(())
}

/// Run one panel action against a renderer backed by the file store.
///
/// Returns the renderer's final state.
async fn run_session(command: Command, config: &AppConfig) -> Result<OverlayState> {
    let store = JsonFileStore::new(&config.store_path);
    ensure_initialized(&store)
        .with_context(|| format!("failed to initialize {}", config.store_path.display()))?;

    let mut renderer = OverlayRenderer::new(store.clone(), HeadlessSurface::new())
        .with_drag_policy(config.drag_persist)
        .with_image_drag(config.image_drag);
    if let Command::AutoMatch { capture } = &command {
        let capture = image::open(capture)
            .with_context(|| format!("failed to open {}", capture.display()))?
            .to_rgba8();
        renderer = renderer.with_detector(CaptureDetector::new(capture));
    }

    let (sender, host) = RendererHost::spawn(renderer);
    let dispatcher =
        CommandDispatcher::new(ChannelTransport::connected(sender), config.retry_delay);
    let mut panel = ControlPanel::new(dispatcher, store);
    panel.restore();

    let outcome = perform(&mut panel, command).await;
    drop(panel);

    let renderer = host.await.context("renderer task failed")?;
    info!("Overlay {:?}", renderer.phase());
    outcome?;
    Ok(renderer.state().clone())
}

async fn perform(panel: &mut Panel, command: Command) -> Result<()> {
    match command {
        Command::Apply {
            image,
            opacity,
            scale,
            pixel_size,
            pixelize,
            grid,
            palette,
        } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let settings = ImageSettings {
                opacity_percent: opacity,
                scale_percent: scale,
                pixel_size,
                pixelize_enabled: pixelize,
                grid_enabled: grid,
                palette_text: palette_text(&palette)?,
            };
            panel.load_image_with(&bytes, settings).await?;
        }
        Command::Show => {
            if !panel.has_image() {
                bail!("no overlay image loaded");
            }
            if !panel.overlay_visible() {
                panel.toggle_visibility().await;
            }
        }
        Command::Hide => {
            if panel.overlay_visible() {
                panel.toggle_visibility().await;
            }
        }
        Command::Remove => panel.remove_overlay().await,
        Command::Share => match panel.share_code()? {
            Some(code) => println!("{}", code),
            None => bail!("no overlay image loaded"),
        },
        Command::LoadShare { code } => panel.load_share_code(&code).await?,
        Command::AutoMatch { .. } => match panel.auto_match_pixel_size().await {
            Some(size) => println!("Matched: {}px", size),
            None => println!("Not detected"),
        },
        Command::Pixelize { .. } | Command::Status => {}
    }
    Ok(())
}

/// The stored snapshot, or the defaults when it is absent or unreadable
fn stored_state(store: &impl StateStore) -> OverlayState {
    match store.read() {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            warn!("Failed to read overlay state: {}", e);
            OverlayState::default()
        }
    }
}

fn status_summary(state: &OverlayState) -> String {
    if !state.has_image {
        return "No overlay image".to_string();
    }
    let palette = Palette::parse(&state.custom_palette);
    let mut lines = vec![
        format!("visible:   {}", state.visible),
        format!("opacity:   {:.0}%", state.opacity * 100.0),
        format!("scale:     {:.0}%", state.scale * 100.0),
        format!("position:  {}, {}", state.position.x, state.position.y),
    ];
    if state.pixelize_enabled {
        let grid = if state.grid_enabled { "on" } else { "off" };
        lines.push(format!("pixelize:  {}px, grid {}", state.pixel_size, grid));
    } else {
        lines.push("pixelize:  off".to_string());
    }
    if state.custom_palette_enabled {
        lines.push(format!("palette:   {} colors", palette.len()));
    }
    if let Some(raster) = &state.image_data {
        lines.push(format!("image:     {}", raster.media_type().unwrap_or("unknown")));
    }
    lines.join("\n")
}
