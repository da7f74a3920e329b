pub mod analyzer;
pub mod fifo;
pub mod scheduler;

use parking_lot::Mutex;
use std::sync::Arc;

// Analysis geometry.
pub const FFT_ORDER: usize = 11; // Size of the FFT window as a power of two.
pub const FFT_SIZE: usize = 1 << FFT_ORDER;
pub const SCOPE_SIZE: usize = 512; // Number of points in the visualization.

// Display range in decibels.
pub const MIN_DB: f32 = -100.0;
pub const MAX_DB: f32 = 0.0;

/// One published spectrum frame: `SCOPE_SIZE` normalized levels in [0, 1],
/// log-frequency indexed. Frames are replaced wholesale, never merged.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SpectrumFrame {
    levels: [f32; SCOPE_SIZE],
}

impl SpectrumFrame {
    pub fn zeroed() -> Self {
        Self {
            levels: [0.0; SCOPE_SIZE],
        }
    }

    pub fn levels(&self) -> &[f32; SCOPE_SIZE] {
        &self.levels
    }
}

/// Writer half of the published-frame slot. Owned by the scheduler.
pub struct FramePublisher {
    slot: Arc<Mutex<SpectrumFrame>>,
}

impl FramePublisher {
    pub fn publish(&self, frame: SpectrumFrame) {
        *self.slot.lock() = frame;
    }
}

/// Reader half of the published-frame slot. Owned by the renderer.
pub struct FrameHandle {
    slot: Arc<Mutex<SpectrumFrame>>,
    last: SpectrumFrame,
}

impl FrameHandle {
    /// Returns the most recently published frame, or the all-zero frame
    /// before the first window completes. Never blocks: while the scheduler
    /// is mid-publish the previous copy is returned.
    pub fn frame(&mut self) -> &SpectrumFrame {
        if let Some(frame) = self.slot.try_lock() {
            self.last = *frame;
        }
        &self.last
    }
}

fn frame_slot() -> (FramePublisher, FrameHandle) {
    let slot = Arc::new(Mutex::new(SpectrumFrame::zeroed()));
    (
        FramePublisher { slot: slot.clone() },
        FrameHandle {
            slot,
            last: SpectrumFrame::zeroed(),
        },
    )
}

/// Builds the complete sample-to-frame pipeline.
///
/// The fifo goes to the audio callback, the scheduler gets spawned on its
/// timer thread, and the handle stays with the renderer.
pub fn pipeline(
    shape: analyzer::WindowShape,
) -> (
    fifo::SampleFifo,
    scheduler::FrameScheduler,
    FrameHandle,
) {
    let (fifo, reader) = fifo::sample_fifo();
    let (publisher, handle) = frame_slot();
    let scheduler = scheduler::FrameScheduler::new(
        reader,
        analyzer::SpectrumAnalyzer::new(shape),
        publisher,
    );
    (fifo, scheduler, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_is_zero_before_first_publish() {
        let (_publisher, mut handle) = frame_slot();
        assert!(handle.frame().levels().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn frame_reads_are_idempotent() {
        let (publisher, mut handle) = frame_slot();

        let mut frame = SpectrumFrame::zeroed();
        for (i, level) in frame.levels.iter_mut().enumerate() {
            *level = (i as f32 / SCOPE_SIZE as f32).fract();
        }
        publisher.publish(frame);

        let first = *handle.frame();
        let second = *handle.frame();
        assert_eq!(first, second);
        assert_eq!(first, frame);
    }

    #[test]
    fn publish_replaces_wholesale() {
        let (publisher, mut handle) = frame_slot();

        let mut a = SpectrumFrame::zeroed();
        a.levels[0] = 0.25;
        publisher.publish(a);

        let mut b = SpectrumFrame::zeroed();
        b.levels[1] = 0.75;
        publisher.publish(b);

        let seen = *handle.frame();
        assert_eq!(seen.levels()[0], 0.0);
        assert_eq!(seen.levels()[1], 0.75);
    }
}
