//! Recursive radix-2 Cooley-Tukey FFT.
//!
//! The transform keeps the textbook divide-and-conquer shape (split into
//! even/odd halves, recurse, combine with twiddle `exp(-2πik/n)`) so that
//! results match previously stored features bit for bit. Complex values
//! are held as two parallel arrays rather than one object per value.

use std::f64::consts::PI;

use crate::AudioError;

/// FFT output as parallel real/imaginary arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl Spectrum {
    /// Returns the number of bins.
    pub fn len(&self) -> usize {
        self.re.len()
    }

    /// Returns true if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.re.is_empty()
    }

    /// Returns `|X[k]|` for bin `k`.
    pub fn magnitude(&self, k: usize) -> f64 {
        self.re[k].hypot(self.im[k])
    }

    /// Power spectrum `|X[k]|^2` over the first half of the bins.
    ///
    /// For real input the upper half mirrors the lower half, so only
    /// `n / 2` bins carry information.
    pub fn power(&self) -> Vec<f64> {
        (0..self.len() / 2)
            .map(|k| {
                let m = self.magnitude(k);
                m * m
            })
            .collect()
    }
}

/// Transforms a real-valued frame.
///
/// The frame length must be a power of two.
pub fn fft_real(frame: &[f32]) -> Result<Spectrum, AudioError> {
    let re: Vec<f64> = frame.iter().map(|&v| v as f64).collect();
    let im = vec![0.0; re.len()];
    fft(&re, &im)
}

/// Transforms a complex sequence given as parallel arrays.
///
/// `re` and `im` must have the same power-of-two length.
pub fn fft(re: &[f64], im: &[f64]) -> Result<Spectrum, AudioError> {
    let n = re.len();
    if !n.is_power_of_two() || im.len() != n {
        return Err(AudioError::NotPowerOfTwo { len: n });
    }
    let (re, im) = fft_rec(re, im);
    Ok(Spectrum { re, im })
}

fn fft_rec(re: &[f64], im: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = re.len();
    if n == 1 {
        return (vec![re[0]], vec![im[0]]);
    }

    let half = n / 2;
    let mut even_re = Vec::with_capacity(half);
    let mut even_im = Vec::with_capacity(half);
    let mut odd_re = Vec::with_capacity(half);
    let mut odd_im = Vec::with_capacity(half);
    for k in 0..half {
        even_re.push(re[2 * k]);
        even_im.push(im[2 * k]);
        odd_re.push(re[2 * k + 1]);
        odd_im.push(im[2 * k + 1]);
    }

    let (even_re, even_im) = fft_rec(&even_re, &even_im);
    let (odd_re, odd_im) = fft_rec(&odd_re, &odd_im);

    let mut out_re = vec![0.0; n];
    let mut out_im = vec![0.0; n];
    for k in 0..half {
        let angle = -2.0 * k as f64 * PI / n as f64;
        let (w_r, w_i) = (angle.cos(), angle.sin());

        // w * odd[k]
        let t_r = w_r * odd_re[k] - w_i * odd_im[k];
        let t_i = w_r * odd_im[k] + w_i * odd_re[k];

        out_re[k] = even_re[k] + t_r;
        out_im[k] = even_im[k] + t_i;
        out_re[k + half] = even_re[k] - t_r;
        out_im[k + half] = even_im[k] - t_i;
    }
    (out_re, out_im)
}

/// Returns the smallest power of two `>= n` (1 for `n == 0`).
pub fn next_pow2(n: usize) -> usize {
    let mut p = 1;
    while p < n {
        p <<= 1;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fft_impulse() {
        // FFT of unit impulse should be all 1s
        let mut frame = vec![0.0f32; 8];
        frame[0] = 1.0;

        let spec = fft_real(&frame).unwrap();
        assert_eq!(spec.len(), 8);
        for k in 0..8 {
            assert!((spec.re[k] - 1.0).abs() < 1e-10);
            assert!(spec.im[k].abs() < 1e-10);
        }
    }

    #[test]
    fn test_fft_preserves_length() {
        for k in 1..=10 {
            let n = 1usize << k;
            let frame: Vec<f32> = (0..n).map(|i| (i as f32 * 0.37).sin()).collect();
            assert_eq!(fft_real(&frame).unwrap().len(), n);
        }
    }

    #[test]
    fn test_fft_parseval() {
        // sum |x[n]|^2 * N == sum |X[k]|^2
        let n = 64;
        let frame: Vec<f32> = (0..n)
            .map(|i| ((2.0 * PI * 3.0 * i as f64 / n as f64).sin() + 0.25 * (i as f64 * 0.9).cos()) as f32)
            .collect();
        let time_energy: f64 = frame.iter().map(|&v| (v as f64) * (v as f64)).sum();
        let spec = fft_real(&frame).unwrap();
        let freq_energy: f64 = (0..n).map(|k| spec.magnitude(k).powi(2)).sum();

        assert!(
            (time_energy * n as f64 - freq_energy).abs() < 1e-6,
            "Parseval violated: {} vs {}",
            time_energy * n as f64,
            freq_energy
        );
    }

    #[test]
    fn test_fft_sine_peak() {
        // A pure tone on bin 4 concentrates its energy there.
        let n = 32;
        let frame: Vec<f32> = (0..n)
            .map(|i| (2.0 * PI * 4.0 * i as f64 / n as f64).cos() as f32)
            .collect();
        let power = fft_real(&frame).unwrap().power();
        assert_eq!(power.len(), n / 2);
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| k)
            .unwrap();
        assert_eq!(peak, 4);
    }

    #[test]
    fn test_fft_rejects_non_power_of_two() {
        assert!(matches!(
            fft_real(&[0.0; 100]),
            Err(AudioError::NotPowerOfTwo { len: 100 })
        ));
        assert!(matches!(fft_real(&[]), Err(AudioError::NotPowerOfTwo { len: 0 })));
    }

    #[test]
    fn test_next_pow2() {
        assert_eq!(next_pow2(0), 1);
        assert_eq!(next_pow2(400), 512);
        assert_eq!(next_pow2(512), 512);
        assert_eq!(next_pow2(513), 1024);
    }
}
