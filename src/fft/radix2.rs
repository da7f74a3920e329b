use super::DftBase;
use num_complex::Complex32;
use std::f32::consts::PI;

fn w(k: usize, n: usize) -> Complex32 {
    let angle = -2.0 * PI * (k as f32) / (n as f32);
    Complex32::from_polar(1.0, angle)
}

//
// Radix-2 (Cooley–Tukey) implementation for power-of-two sizes.
//
pub struct DftRadix2 {
    n: usize,
    levels: u32,
    wtable: Vec<Complex32>,
}

impl DftRadix2 {
    pub fn new(n: usize) -> Self {
        assert!(n.is_power_of_two());

        //
        // Precompute twiddle values for the half-spectrum.
        //
        let mut wtable = Vec::with_capacity(n / 2);
        for k in 0..n / 2 {
            wtable.push(w(k, n));
        }

        Self {
            n,
            levels: n.trailing_zeros(),
            wtable,
        }
    }
}

impl DftBase for DftRadix2 {
    fn name(&self) -> String {
        format!("Radix2({})", self.n)
    }
    fn size(&self) -> usize {
        self.n
    }

    fn xform_inplace(&self, buffer: &mut [Complex32]) {
        assert_eq!(buffer.len(), self.n);

        if self.n < 2 {
            return;
        }

        //
        // Bit-reversal permutation into natural butterfly order.
        //
        let shift = usize::BITS - self.levels;
        for i in 0..self.n {
            let j = i.reverse_bits() >> shift;
            if j > i {
                buffer.swap(i, j);
            }
        }

        //
        // Iterative butterfly stages, doubling the sub-transform size.
        //
        let mut size = 2;
        while size <= self.n {
            let half = size / 2;
            let step = self.n / size;

            for block in (0..self.n).step_by(size) {
                let mut k = 0;
                for j in block..block + half {
                    let t = buffer[j + half] * self.wtable[k];
                    buffer[j + half] = buffer[j] - t;
                    buffer[j] = buffer[j] + t;
                    k += step;
                }
            }
            size *= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    /// Direct O(n^2) DFT used as the reference.
    fn naive_dft(input: &[Complex32]) -> Vec<Complex32> {
        let n = input.len();
        let mut out = vec![Complex32::zero(); n];
        for (k, slot) in out.iter_mut().enumerate() {
            for (j, &x) in input.iter().enumerate() {
                *slot += x * w(k * j % n, n);
            }
        }
        out
    }

    fn assert_close(a: Complex32, b: Complex32, tol: f32) {
        assert!(
            (a - b).norm() < tol,
            "expected {:?} to be within {} of {:?}",
            a,
            tol,
            b
        );
    }

    #[test]
    fn matches_naive_dft() {
        let n = 16;
        let input: Vec<Complex32> = (0..n)
            .map(|i| Complex32::new((i as f32 * 0.37).sin(), (i as f32 * 0.91).cos()))
            .collect();

        let expected = naive_dft(&input);

        let mut buffer = input.clone();
        DftRadix2::new(n).xform_inplace(&mut buffer);

        for (got, want) in buffer.iter().zip(expected.iter()) {
            assert_close(*got, *want, 1e-3);
        }
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let n = 64;
        let mut buffer = vec![Complex32::zero(); n];
        buffer[0] = Complex32::new(1.0, 0.0);

        DftRadix2::new(n).xform_inplace(&mut buffer);

        for bin in &buffer {
            assert!((bin.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn dc_concentrates_in_bin_zero() {
        let n = 256;
        let mut buffer = vec![Complex32::new(1.0, 0.0); n];

        DftRadix2::new(n).xform_inplace(&mut buffer);

        assert!((buffer[0].norm() - n as f32).abs() < 1e-2);
        for bin in &buffer[1..] {
            assert!(bin.norm() < 1e-2);
        }
    }

    #[test]
    fn bin_aligned_sine_peaks_at_its_bin() {
        let n = 2048;
        let cycles = 96;
        let mut buffer: Vec<Complex32> = (0..n)
            .map(|i| {
                let phase = 2.0 * PI * cycles as f32 * i as f32 / n as f32;
                Complex32::new(phase.sin(), 0.0)
            })
            .collect();

        DftRadix2::new(n).xform_inplace(&mut buffer);

        // A real sine of unit amplitude lands n/2 in its bin and its mirror.
        assert!((buffer[cycles].norm() - n as f32 / 2.0).abs() < 0.5);
        assert!((buffer[n - cycles].norm() - n as f32 / 2.0).abs() < 0.5);

        for (k, bin) in buffer.iter().enumerate() {
            if k != cycles && k != n - cycles {
                assert!(bin.norm() < 0.5, "unexpected energy in bin {}", k);
            }
        }
    }
}
