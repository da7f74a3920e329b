pub mod source;

use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use ringbuf::{Consumer, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::spectrum::fifo::SampleFifo;
use source::SampleSource;

/// Samples queued between the decoder thread and the output callback.
const PLAYBACK_RING_SIZE: usize = 1 << 15;

/// Interleaved samples pulled from the source per decoder iteration.
const DECODE_BLOCK_SIZE: usize = 4096;

/// Substituted for a gain of exactly zero so the analysis input never
/// degenerates to true silence.
pub const GAIN_EPSILON: f32 = 1e-5;

/// One user action routed from the GUI to the player.
pub enum ControlEvent {
    TogglePlayback,
    SetGain(f32),
}

/// Control surface shared between the GUI and the audio threads.
/// All state is atomic; the audio callback only ever loads.
pub struct PlayerControls {
    playing: AtomicBool,
    gain: AtomicU32,
}

impl PlayerControls {
    pub fn new(gain: f32) -> Arc<Self> {
        Arc::new(Self {
            playing: AtomicBool::new(true),
            gain: AtomicU32::new(sanitize_gain(gain).to_bits()),
        })
    }

    /// Single dispatch point for UI events.
    pub fn dispatch(&self, event: ControlEvent) {
        match event {
            ControlEvent::TogglePlayback => {
                self.playing.fetch_xor(true, Ordering::Relaxed);
            }
            ControlEvent::SetGain(gain) => {
                self.gain
                    .store(sanitize_gain(gain).to_bits(), Ordering::Relaxed);
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn gain(&self) -> f32 {
        f32::from_bits(self.gain.load(Ordering::Relaxed))
    }
}

fn sanitize_gain(gain: f32) -> f32 {
    if gain == 0.0 {
        GAIN_EPSILON
    } else {
        gain
    }
}

/// Explicitly owned handle to the output device; opened once in main and
/// handed to the player.
pub struct OutputDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: SampleFormat,
}

impl OutputDevice {
    /// Opens the host's default output device with its default configuration.
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();

        //
        // Log all available output devices for debugging.
        //
        log::info!("--- AVAILABLE OUTPUT DEVICES ---");
        if let Ok(devices) = host.output_devices() {
            for (i, dev) in devices.enumerate() {
                let name = dev.name().unwrap_or("Unknown".into());
                log::info!("  [{}]: {}", i, name);
            }
        }
        log::info!("--------------------------------");

        let device = host
            .default_output_device()
            .context("no audio output device found, check system settings")?;

        log::info!(
            "Selected audio device: {}",
            device.name().unwrap_or("Unknown".into())
        );

        let supported = device
            .default_output_config()
            .context("failed to get default output config")?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        log::info!(
            "Audio config: {:?} @ {}Hz, Channels: {}",
            sample_format,
            config.sample_rate.0,
            config.channels
        );

        Ok(Self {
            device,
            config,
            sample_format,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

/// Running playback: the output stream plus the decoder thread feeding it.
/// Dropping it stops the decoder and closes the stream.
pub struct Player {
    _stream: cpal::Stream,
    _decoder: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

impl Drop for Player {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Starts playing `source` on `output`, tapping every rendered frame into
/// `fifo` for the visualizer.
pub fn start_playback(
    output: OutputDevice,
    mut src: Box<dyn SampleSource>,
    mut fifo: SampleFifo,
    controls: Arc<PlayerControls>,
) -> Result<Player> {
    let OutputDevice {
        device,
        config,
        sample_format,
    } = output;

    let src_channels = src.channels() as usize;
    let dev_channels = config.channels as usize;

    if src.sample_rate() != config.sample_rate.0 {
        log::warn!(
            "source rate {}Hz != device rate {}Hz, playing without resampling",
            src.sample_rate(),
            config.sample_rate.0
        );
    }

    let (mut producer, mut consumer) = HeapRb::<f32>::new(PLAYBACK_RING_SIZE).split();

    let running = Arc::new(AtomicBool::new(true));

    //
    // Decoder thread: pull blocks from the source, adapt the channel layout
    // and keep the playback ring topped up. Sleeps while the ring is full,
    // which is also how pause back-pressures it.
    //
    let decoder_running = running.clone();
    let decoder = thread::spawn(move || {
        let mut block = vec![0.0f32; DECODE_BLOCK_SIZE];
        let mut adapted: Vec<f32> = Vec::with_capacity(DECODE_BLOCK_SIZE * 2);

        while decoder_running.load(Ordering::Relaxed) {
            let pulled = src.pull(&mut block);
            if pulled == 0 {
                log::info!("End of stream");
                break;
            }

            adapt_channels(&block[..pulled], src_channels, dev_channels, &mut adapted);

            let mut offset = 0;
            while offset < adapted.len() {
                if !decoder_running.load(Ordering::Relaxed) {
                    return;
                }
                offset += producer.push_slice(&adapted[offset..]);
                if offset < adapted.len() {
                    thread::sleep(Duration::from_millis(5));
                }
            }
        }
    });

    let err_fn = |err| log::error!("Audio output error: {}", err);
    let controls_cb = controls;

    let mut scratch: Vec<f32> = Vec::new();

    //
    // Build the output stream for whatever sample format the device wants.
    // Rendering always happens in f32; integer formats convert on the way out.
    //
    let stream = match sample_format {
        SampleFormat::F32 => device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &_| {
                render_block(data, &mut consumer, &mut fifo, &controls_cb, dev_channels);
            },
            err_fn,
            None,
        ),
        SampleFormat::I16 => device.build_output_stream(
            &config,
            move |data: &mut [i16], _: &_| {
                scratch.resize(data.len(), 0.0);
                render_block(
                    &mut scratch,
                    &mut consumer,
                    &mut fifo,
                    &controls_cb,
                    dev_channels,
                );
                for (out, &s) in data.iter_mut().zip(scratch.iter()) {
                    *out = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
                }
            },
            err_fn,
            None,
        ),
        SampleFormat::U16 => device.build_output_stream(
            &config,
            move |data: &mut [u16], _: &_| {
                scratch.resize(data.len(), 0.0);
                render_block(
                    &mut scratch,
                    &mut consumer,
                    &mut fifo,
                    &controls_cb,
                    dev_channels,
                );
                for (out, &s) in data.iter_mut().zip(scratch.iter()) {
                    *out = ((s.clamp(-1.0, 1.0) + 1.0) * 32767.5) as u16;
                }
            },
            err_fn,
            None,
        ),
        other => anyhow::bail!("unsupported audio sample format: {:?}", other),
    }
    .context("failed to build audio stream")?;

    stream.play().context("failed to start audio stream")?;

    Ok(Player {
        _stream: stream,
        _decoder: decoder,
        running,
    })
}

/// Fills `out` from the playback ring and taps every complete frame into the
/// visualizer fifo. Runs on the audio callback; lock-free throughout.
fn render_block(
    out: &mut [f32],
    consumer: &mut Consumer<f32, Arc<HeapRb<f32>>>,
    fifo: &mut SampleFifo,
    controls: &PlayerControls,
    channels: usize,
) {
    if !controls.is_playing() {
        out.fill(0.0);
        return;
    }

    let filled = consumer.pop_slice(out);
    // Underruns render as silence.
    out[filled..].fill(0.0);

    let gain = controls.gain();
    for frame in out[..filled].chunks_exact(channels) {
        tap_frame(fifo, frame, gain);
    }
}

/// Visualizer tap: mono-mixes one interleaved frame, applies the visualizer
/// gain and the hard clip, and feeds the analysis fifo.
///
/// The clip bounds the FFT input to [-1, 1] on both sides; playback itself
/// is untouched by the gain.
fn tap_frame(fifo: &mut SampleFifo, frame: &[f32], gain: f32) {
    let mono = frame.iter().sum::<f32>() / frame.len() as f32;
    fifo.push((mono * gain).clamp(-1.0, 1.0));
}

/// Adapts interleaved frames from `src` channels to `dev` channels.
/// Matching layouts pass through; mono fans out; anything else is averaged
/// to mono first and then fanned out.
fn adapt_channels(input: &[f32], src: usize, dev: usize, out: &mut Vec<f32>) {
    out.clear();

    if src == dev {
        out.extend_from_slice(input);
        return;
    }

    for frame in input.chunks_exact(src) {
        let mono = if src == 1 {
            frame[0]
        } else {
            frame.iter().sum::<f32>() / src as f32
        };
        for _ in 0..dev {
            out.push(mono);
        }
    }
}
