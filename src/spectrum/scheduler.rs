use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::analyzer::SpectrumAnalyzer;
use super::fifo::WindowReader;
use super::{FramePublisher, FFT_SIZE};

/// Default tick rate of the analysis timer.
pub const DEFAULT_RATE_HZ: u32 = 300;

/// Fixed-rate driver of the analyze-and-publish step, decoupled from the
/// audio callback rate and block size.
///
/// Each tick either consumes the staged window and publishes a fresh frame,
/// or does nothing. Ticks are never queued and analysis never overlaps
/// itself: the whole step runs synchronously inside one tick.
pub struct FrameScheduler {
    reader: WindowReader,
    analyzer: SpectrumAnalyzer,
    publisher: FramePublisher,
    scratch: [f32; FFT_SIZE],
}

impl FrameScheduler {
    pub fn new(
        reader: WindowReader,
        analyzer: SpectrumAnalyzer,
        publisher: FramePublisher,
    ) -> Self {
        Self {
            reader,
            analyzer,
            publisher,
            scratch: [0.0; FFT_SIZE],
        }
    }

    /// Runs one timer tick. Returns true when a frame was published.
    pub fn tick(&mut self) -> bool {
        if !self.reader.take(&mut self.scratch) {
            return false;
        }
        let frame = self.analyzer.analyze(&self.scratch);
        self.publisher.publish(frame);
        true
    }

    /// Moves the scheduler onto its own thread ticking at `rate_hz`.
    /// `on_frame` runs after every publish; the GUI hands in its repaint
    /// request here.
    pub fn spawn<F>(mut self, rate_hz: u32, on_frame: F) -> SchedulerHandle
    where
        F: Fn() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let period = Duration::from_secs_f64(1.0 / rate_hz.max(1) as f64);

        log::info!("Starting analysis scheduler at {} Hz", rate_hz);

        let join = thread::spawn(move || {
            while flag.load(Ordering::Relaxed) {
                let started = Instant::now();

                if self.tick() {
                    on_frame();
                }

                // Sleep out the remainder of the tick. A late tick is fine;
                // missed ticks are not made up.
                if let Some(rest) = period.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
        });

        SchedulerHandle {
            running,
            join: Some(join),
        }
    }
}

/// Owner of the scheduler thread; stops and joins it on drop.
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::analyzer::{bin_for_column, WindowShape};
    use crate::spectrum::{fifo, pipeline};
    use std::f32::consts::PI;

    fn feed_sine(fifo: &mut fifo::SampleFifo, bin: usize) {
        for i in 0..FFT_SIZE {
            fifo.push((2.0 * PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin());
        }
    }

    fn argmax(levels: &[f32]) -> usize {
        levels
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn idle_tick_publishes_nothing() {
        let (_fifo, mut scheduler, mut frames) = pipeline(WindowShape::Rectangular);

        assert!(!scheduler.tick());
        assert!(frames.frame().levels().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn ready_window_is_analyzed_exactly_once() {
        let (mut fifo, mut scheduler, mut frames) = pipeline(WindowShape::Rectangular);

        feed_sine(&mut fifo, bin_for_column(128));
        assert!(scheduler.tick());
        assert!(frames.frame().levels().iter().any(|&v| v > 0.5));

        // The staged window was consumed; the next tick is idle.
        assert!(!scheduler.tick());
    }

    #[test]
    fn overrun_keeps_the_first_window_intact() {
        let (mut fifo, mut scheduler, mut frames) = pipeline(WindowShape::Rectangular);

        let first_bin = bin_for_column(128);
        let second_bin = bin_for_column(400);
        assert_ne!(first_bin, second_bin);

        // Two full windows back-to-back with no tick in between: the second
        // must be dropped, not merged into the first.
        feed_sine(&mut fifo, first_bin);
        feed_sine(&mut fifo, second_bin);

        assert!(scheduler.tick());
        assert_eq!(bin_for_column(argmax(frames.frame().levels())), first_bin);

        assert!(!scheduler.tick());
    }

    #[test]
    fn spawned_scheduler_publishes_and_stops() {
        let (mut fifo, scheduler, mut frames) = pipeline(WindowShape::Rectangular);

        feed_sine(&mut fifo, bin_for_column(256));

        let handle = scheduler.spawn(DEFAULT_RATE_HZ, || {});

        // Wait for the timer thread to pick the window up.
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if frames.frame().levels().iter().any(|&v| v > 0.5) {
                break;
            }
            assert!(Instant::now() < deadline, "no frame published in time");
            thread::sleep(Duration::from_millis(5));
        }

        drop(handle);
    }
}
