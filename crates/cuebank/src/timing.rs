//! Length and sample-count helpers for frame-based compressed streams.
//!
//! The stream codec packs 1024 samples per frame; cue lengths and waveform
//! sample counts are derived from the frame count and sample rate.

/// Samples decoded from one stream frame.
pub const SAMPLES_PER_FRAME: u32 = 1024;

/// Total samples in `frames` frames.
pub fn frames_to_samples(frames: u32) -> u64 {
    u64::from(frames) * u64::from(SAMPLES_PER_FRAME)
}

/// Duration of `frames` frames in seconds. Zero when the rate is zero.
pub fn frames_to_seconds(frames: u32, sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    frames_to_samples(frames) as f64 / f64::from(sample_rate)
}

/// Duration of `frames` frames in whole milliseconds, truncated.
pub fn frames_to_ms(frames: u32, sample_rate: u32) -> u32 {
    (frames_to_seconds(frames, sample_rate) * 1000.0) as u32
}
