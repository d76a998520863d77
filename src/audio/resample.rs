//! Channel mixing and resampling for the recognition upload.
//!
//! The speech service's short-audio endpoint expects **16 kHz mono PCM**.
//! Capture devices usually deliver 44.1/48 kHz stereo, so every cpal chunk
//! goes through [`downmix_to_mono`] then [`resample_to_16k`].

/// Sample rate of the audio uploaded for recognition.
pub const TARGET_RATE: u32 = 16_000;

/// Average interleaved channels down to one.
///
/// Returns an empty vector for `channels == 0`; mono input is copied as is.
///
/// ```rust
/// use alessandro::audio::downmix_to_mono;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4];
/// let mono = downmix_to_mono(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Resample mono `samples` from `source_rate` to [`TARGET_RATE`] with linear
/// interpolation.
///
/// Output length is `ceil(len * 16000 / source_rate)`.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || source_rate == 0 {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let step = source_rate as f64 / TARGET_RATE as f64;
    let out_len = (samples.len() as f64 / step).ceil() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            samples[idx] + (samples[next] - samples[idx]) * frac
        })
        .collect()
}
