mod audio;
mod fft;
mod gui;
mod spectrum;

use anyhow::Result;
use std::path::PathBuf;

use audio::source::{SampleSource, WavSource};
use audio::{OutputDevice, PlayerControls};
use gui::PlayerApp;
use spectrum::analyzer::WindowShape;
use spectrum::scheduler::DEFAULT_RATE_HZ;

// Configuration constants.
const INITIAL_GAIN: f32 = 0.5; // Visualizer gain at startup.
const REFRESH_RATE_HZ: u32 = DEFAULT_RATE_HZ; // Analysis/redraw cadence.

fn main() -> Result<()> {
    //
    // Initialize logging with default filter set to "info".
    //
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting wavescope audio player...");

    //
    // Build the spectrum pipeline: fifo -> analyzer -> scheduler -> frame.
    //
    let (fifo, scheduler, frames) = spectrum::pipeline(WindowShape::Rectangular);

    let controls = PlayerControls::new(INITIAL_GAIN);

    //
    // Load the requested file and start playback on the default device. With
    // no file the visualizer runs on the all-zero frame.
    //
    let (player, now_playing) = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => {
            let src = WavSource::open(&path)?;
            log::info!(
                "Loaded {} ({} ch @ {}Hz)",
                path.display(),
                src.channels(),
                src.sample_rate()
            );

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let device = OutputDevice::open_default()?;
            let player = audio::start_playback(device, Box::new(src), fifo, controls.clone())?;
            (Some(player), name)
        }
        None => {
            log::warn!("No file given. Usage: wavescope <file.wav>");
            (None, String::from("-"))
        }
    };

    //
    // Initialize GUI configuration.
    //
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([900.0, 500.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("wavescope"),
        ..Default::default()
    };

    //
    // Launch GUI application. The scheduler thread starts here so its frame
    // signal can request repaints on the GUI context.
    //
    eframe::run_native(
        "wavescope",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let scheduler = scheduler.spawn(REFRESH_RATE_HZ, move || ctx.request_repaint());

            Ok(Box::new(PlayerApp::new(
                cc,
                frames,
                controls,
                now_playing,
                player,
                scheduler,
            )))
        }),
    )
    .map_err(|err| anyhow::anyhow!("GUI error: {}", err))
}
