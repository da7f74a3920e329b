use ringbuf::{Consumer, HeapRb, Producer};
use std::sync::Arc;

use super::FFT_SIZE;

/// Creates the window handoff pair. The staging ring holds either nothing or
/// exactly one completed window.
pub fn sample_fifo() -> (SampleFifo, WindowReader) {
    let (staging, reader) = HeapRb::<f32>::new(FFT_SIZE).split();
    (
        SampleFifo {
            window: [0.0; FFT_SIZE],
            cursor: 0,
            staging,
        },
        WindowReader { staging: reader },
    )
}

/// Producer side: accumulates samples into fixed windows on the audio thread.
pub struct SampleFifo {
    window: [f32; FFT_SIZE],
    cursor: usize,
    staging: Producer<f32, Arc<HeapRb<f32>>>,
}

impl SampleFifo {
    /// Appends one sample. Never blocks and never allocates.
    ///
    /// When the window fills it is copied into the staging ring only if the
    /// previous window has been consumed; otherwise it is dropped. The cursor
    /// resets either way.
    pub fn push(&mut self, sample: f32) {
        self.window[self.cursor] = sample;
        self.cursor += 1;

        if self.cursor == FFT_SIZE {
            if self.staging.free_len() == FFT_SIZE {
                self.staging.push_slice(&self.window);
            }
            self.cursor = 0;
        }
    }
}

/// Consumer side: hands staged windows to the analyzer.
pub struct WindowReader {
    staging: Consumer<f32, Arc<HeapRb<f32>>>,
}

impl WindowReader {
    /// Copies the staged window into `out` and frees the slot.
    /// Returns false when no completed window is pending.
    pub fn take(&mut self, out: &mut [f32; FFT_SIZE]) -> bool {
        if self.staging.len() < FFT_SIZE {
            return false;
        }
        self.staging.pop_slice(out);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_window_before_capacity_reached() {
        let (mut fifo, mut reader) = sample_fifo();
        for i in 0..FFT_SIZE - 1 {
            fifo.push(i as f32);
        }

        let mut out = [1.0; FFT_SIZE];
        assert!(!reader.take(&mut out));
        // The output buffer is untouched on a miss.
        assert!(out.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn full_window_is_staged_in_order() {
        let (mut fifo, mut reader) = sample_fifo();
        for i in 0..FFT_SIZE {
            fifo.push(i as f32);
        }

        let mut out = [0.0; FFT_SIZE];
        assert!(reader.take(&mut out));
        for (i, &v) in out.iter().enumerate() {
            assert_eq!(v, i as f32);
        }

        // Consumed exactly once.
        assert!(!reader.take(&mut out));
    }

    #[test]
    fn overrun_drops_the_newer_window() {
        let (mut fifo, mut reader) = sample_fifo();
        for _ in 0..FFT_SIZE {
            fifo.push(1.0);
        }
        for _ in 0..FFT_SIZE {
            fifo.push(2.0);
        }

        let mut out = [0.0; FFT_SIZE];
        assert!(reader.take(&mut out));
        assert!(out.iter().all(|&v| v == 1.0));
        assert!(!reader.take(&mut out));
    }

    #[test]
    fn slot_frees_after_consumption() {
        let (mut fifo, mut reader) = sample_fifo();
        let mut out = [0.0; FFT_SIZE];

        for _ in 0..FFT_SIZE {
            fifo.push(1.0);
        }
        assert!(reader.take(&mut out));

        for _ in 0..FFT_SIZE {
            fifo.push(2.0);
        }
        assert!(reader.take(&mut out));
        assert!(out.iter().all(|&v| v == 2.0));
    }
}
