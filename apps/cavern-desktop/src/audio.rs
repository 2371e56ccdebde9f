//! Procedural cave audio: a looping drone with echoing drips, and a short
//! echoing knock for each selection. Buffers are synthesized up front and
//! handed to rodio.

use cavern_interact::AudioCue;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::f32::consts::TAU;

pub const SAMPLE_RATE: u32 = 44_100;

/// Length of the ambient loop in seconds.
const AMBIENT_SECS: f32 = 2.0;
/// Length of a selection cue including its echo tail.
const CUE_SECS: f32 = 1.5;

/// RBJ-cookbook biquad, direct form I.
#[derive(Debug, Clone)]
pub struct Biquad {
    b: [f32; 3],
    a: [f32; 2],
    x: [f32; 2],
    y: [f32; 2],
}

impl Biquad {
    fn from_coefficients(b: [f32; 3], a0: f32, a1: f32, a2: f32) -> Self {
        Self {
            b: b.map(|v| v / a0),
            a: [a1 / a0, a2 / a0],
            x: [0.0; 2],
            y: [0.0; 2],
        }
    }

    fn omega(sample_rate: u32, frequency: f32, q: f32) -> (f32, f32) {
        let w0 = TAU * frequency / sample_rate as f32;
        (w0.cos(), w0.sin() / (2.0 * q))
    }

    pub fn lowpass(sample_rate: u32, frequency: f32, q: f32) -> Self {
        let (cos, alpha) = Self::omega(sample_rate, frequency, q);
        let b1 = 1.0 - cos;
        Self::from_coefficients([b1 / 2.0, b1, b1 / 2.0], 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
    }

    /// Band-pass with 0 dB gain at the centre frequency.
    pub fn bandpass(sample_rate: u32, frequency: f32, q: f32) -> Self {
        let (cos, alpha) = Self::omega(sample_rate, frequency, q);
        Self::from_coefficients([alpha, 0.0, -alpha], 1.0 + alpha, -2.0 * cos, 1.0 - alpha)
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.b[0] * input + self.b[1] * self.x[0] + self.b[2] * self.x[1]
            - self.a[0] * self.y[0]
            - self.a[1] * self.y[1];
        self.x = [input, self.x[0]];
        self.y = [out, self.y[0]];
        out
    }
}

/// Delay line whose output is fed back into its input.
#[derive(Debug, Clone)]
pub struct FeedbackDelay {
    line: Vec<f32>,
    cursor: usize,
    feedback: f32,
}

impl FeedbackDelay {
    pub fn new(sample_rate: u32, seconds: f32, feedback: f32) -> Self {
        let len = ((seconds * sample_rate as f32).round() as usize).max(1);
        Self {
            line: vec![0.0; len],
            cursor: 0,
            feedback,
        }
    }

    /// Push one sample, return the delayed (wet) sample.
    pub fn process(&mut self, input: f32) -> f32 {
        let out = self.line[self.cursor];
        self.line[self.cursor] = input + out * self.feedback;
        self.cursor = (self.cursor + 1) % self.line.len();
        out
    }
}

/// White noise with an exponential fade over the buffer.
fn decaying_noise(rng: &mut impl Rng, len: usize, decay: f32) -> Vec<f32> {
    (0..len)
        .map(|i| (rng.random::<f32>() * 2.0 - 1.0) * (-(i as f32) / (len as f32 * decay)).exp())
        .collect()
}

/// One seamless loop of cave ambience: a 40 Hz drone plus band-passed noise
/// sent through a 0.28 s echo with 0.42 feedback.
pub fn ambient_loop(sample_rate: u32, rng: &mut impl Rng) -> Vec<f32> {
    let len = (AMBIENT_SECS * sample_rate as f32) as usize;
    let noise = decaying_noise(rng, len, 0.6);
    let mut band = Biquad::bandpass(sample_rate, 800.0, 0.8);
    let mut echo = FeedbackDelay::new(sample_rate, 0.28, 0.42);

    // Run the loop twice and keep the second pass so the echo tail wraps.
    let mut out = Vec::with_capacity(len);
    for n in 0..2 * len {
        let t = n as f32 / sample_rate as f32;
        let drone = (TAU * 40.0 * t).sin() * 0.02;
        let drips = band.process(noise[n % len]) * 0.08;
        let wet = echo.process(drips) * 0.18;
        if n >= len {
            out.push(drone + drips + wet);
        }
    }
    out
}

/// Gain of the knock oscillator: exponential rise to 0.5 over 10 ms, decay to
/// 0.001 by 300 ms, silent after 450 ms.
fn knock_envelope(t: f32) -> f32 {
    if t < 0.01 {
        0.0001 * (0.5_f32 / 0.0001).powf(t / 0.01)
    } else if t < 0.3 {
        0.5 * (0.001_f32 / 0.5).powf((t - 0.01) / 0.29)
    } else if t < 0.45 {
        0.001
    } else {
        0.0
    }
}

fn triangle(phase: f32) -> f32 {
    4.0 * (phase.fract() - 0.5).abs() - 1.0
}

/// A selection cue: a low-passed noise burst and a triangle knock, with a
/// randomized echo.
pub fn echo_burst(sample_rate: u32, rng: &mut impl Rng) -> Vec<f32> {
    let burst_len = (0.5 * sample_rate as f32) as usize;
    let total = (CUE_SECS * sample_rate as f32) as usize;
    let noise = decaying_noise(rng, burst_len, 0.45);
    let mut lowpass = Biquad::lowpass(sample_rate, rng.random_range(1400.0..1600.0), 0.707);
    let knock_hz: f32 = rng.random_range(600.0..1200.0);
    let mut echo = FeedbackDelay::new(
        sample_rate,
        rng.random_range(0.18..0.36),
        rng.random_range(0.35..0.5),
    );

    (0..total)
        .map(|n| {
            let t = n as f32 / sample_rate as f32;
            let burst = lowpass.process(noise.get(n).copied().unwrap_or(0.0));
            let knock = triangle(knock_hz * t) * knock_envelope(t);
            let dry = (burst + knock) * 0.6;
            (dry + echo.process(dry)).clamp(-1.0, 1.0)
        })
        .collect()
}

/// [`AudioCue`] backed by the default output device. Without a device it
/// stays silent and logs instead.
pub struct RodioAudio {
    output: Option<(OutputStream, OutputStreamHandle)>,
    ambient: Option<Sink>,
    rng: SmallRng,
}

impl RodioAudio {
    pub fn new(seed: u64) -> Self {
        let output = match OutputStream::try_default() {
            Ok(output) => Some(output),
            Err(e) => {
                tracing::warn!("no audio output, running silent: {e}");
                None
            }
        };
        Self {
            output,
            ambient: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl AudioCue for RodioAudio {
    fn start_ambient(&mut self) {
        if self.ambient.is_some() {
            return;
        }
        let Some((_, handle)) = &self.output else {
            tracing::info!("ambient audio skipped: no output device");
            return;
        };
        match Sink::try_new(handle) {
            Ok(sink) => {
                let samples = ambient_loop(SAMPLE_RATE, &mut self.rng);
                sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples).repeat_infinite());
                self.ambient = Some(sink);
                tracing::info!("ambient audio started");
            }
            Err(e) => tracing::warn!("failed to start ambient audio: {e}"),
        }
    }

    fn play_selection_cue(&mut self) {
        let Some((_, handle)) = &self.output else {
            tracing::debug!("selection cue skipped: no output device");
            return;
        };
        let samples = echo_burst(SAMPLE_RATE, &mut self.rng);
        if let Err(e) = handle.play_raw(SamplesBuffer::new(1, SAMPLE_RATE, samples)) {
            tracing::warn!("failed to play selection cue: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0_f32, |m, s| m.max(s.abs()))
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    fn steady_peak(mut filter: Biquad, frequency: f32) -> f32 {
        let out: Vec<f32> = (0..SAMPLE_RATE)
            .map(|n| filter.process((TAU * frequency * n as f32 / SAMPLE_RATE as f32).sin()))
            .collect();
        peak(&out[out.len() / 2..])
    }

    #[test]
    fn lowpass_passes_lows_and_cuts_highs() {
        assert!(steady_peak(Biquad::lowpass(SAMPLE_RATE, 1400.0, 0.707), 100.0) > 0.9);
        assert!(steady_peak(Biquad::lowpass(SAMPLE_RATE, 1400.0, 0.707), 10_000.0) < 0.1);
    }

    #[test]
    fn bandpass_peaks_at_centre() {
        let centre = steady_peak(Biquad::bandpass(SAMPLE_RATE, 800.0, 0.8), 800.0);
        let far = steady_peak(Biquad::bandpass(SAMPLE_RATE, 800.0, 0.8), 12_000.0);
        assert!((centre - 1.0).abs() < 0.05);
        assert!(far < 0.2);
    }

    #[test]
    fn delay_echoes_with_feedback() {
        let mut delay = FeedbackDelay::new(100, 0.1, 0.5);
        let out: Vec<f32> = (0..31).map(|n| delay.process(if n == 0 { 1.0 } else { 0.0 })).collect();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[10], 1.0);
        assert_eq!(out[20], 0.5);
        assert_eq!(out[30], 0.25);
    }

    #[test]
    fn ambient_loop_is_two_seconds_and_quiet() {
        let samples = ambient_loop(SAMPLE_RATE, &mut SmallRng::seed_from_u64(1));
        assert_eq!(samples.len(), 2 * SAMPLE_RATE as usize);
        let p = peak(&samples);
        assert!(p > 0.01 && p < 1.0, "peak {p}");
    }

    #[test]
    fn echo_burst_fades_out() {
        let samples = echo_burst(SAMPLE_RATE, &mut SmallRng::seed_from_u64(2));
        let window = SAMPLE_RATE as usize / 10;
        let head = rms(&samples[..window]);
        let tail = rms(&samples[samples.len() - window..]);
        assert!(head > 0.01);
        assert!(tail < head * 0.5, "head {head} tail {tail}");
        assert!(peak(&samples) <= 1.0);
    }

    #[test]
    fn synthesis_is_seeded() {
        let a = echo_burst(SAMPLE_RATE, &mut SmallRng::seed_from_u64(3));
        let b = echo_burst(SAMPLE_RATE, &mut SmallRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn knock_envelope_rises_then_decays() {
        assert!(knock_envelope(0.0) < 0.001);
        assert!((knock_envelope(0.01) - 0.5).abs() < 1e-3);
        assert!(knock_envelope(0.2) < knock_envelope(0.05));
        assert_eq!(knock_envelope(0.5), 0.0);
        assert!(triangle(0.0) == 1.0 && triangle(0.5) == -1.0);
    }
}
