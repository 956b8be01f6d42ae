/// Sound engine: procedural cues for answers, timeouts and game over via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use std::f32::consts::TAU;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_correct: Arc<Vec<u8>>,
        sfx_bonus: Arc<Vec<u8>>,
        sfx_retry: Arc<Vec<u8>>,
        sfx_timeout: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_correct: Arc::new(make_wav(&gen_correct())),
                sfx_bonus: Arc::new(make_wav(&gen_bonus())),
                sfx_retry: Arc::new(make_wav(&gen_retry())),
                sfx_timeout: Arc::new(make_wav(&gen_timeout())),
                sfx_game_over: Arc::new(make_wav(&gen_game_over())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_correct(&self) { self.play(&self.sfx_correct); }
        pub fn play_bonus(&self) { self.play(&self.sfx_bonus); }
        pub fn play_retry(&self) { self.play(&self.sfx_retry); }
        pub fn play_timeout(&self) { self.play(&self.sfx_timeout); }
        pub fn play_game_over(&self) { self.play(&self.sfx_game_over); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// A run of notes, each with a soft decay. `harmonic` mixes in the
    /// octave for a brighter tone.
    fn gen_notes(notes: &[(f32, f32)], harmonic: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in notes {
            let n = (SAMPLE_RATE as f32 * dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * (1.0 - harmonic)
                    + (t * freq * 2.0 * TAU).sin() * harmonic;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Correct answer: two rising notes E5→A5
    fn gen_correct() -> Vec<f32> {
        gen_notes(&[(659.0, 0.07), (880.0, 0.12)], 0.3, 0.3)
    }

    /// Bonus: bright arpeggio C5→E5→G5→C6 with a held top note
    fn gen_bonus() -> Vec<f32> {
        gen_notes(
            &[(523.0, 0.08), (659.0, 0.08), (784.0, 0.08), (1047.0, 0.3)],
            0.35,
            0.3,
        )
    }

    /// Wrong guess: short low buzz
    fn gen_retry() -> Vec<f32> {
        let duration = 0.14;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                // Square wave
                let s = if (t * 160.0).fract() < 0.5 { 1.0 } else { -1.0 };
                s * env * 0.15
            })
            .collect()
    }

    /// Time's up: descending whistle
    fn gen_timeout() -> Vec<f32> {
        let duration = 0.3;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 700.0 - t * 450.0;
                phase += freq / SAMPLE_RATE as f32;
                let env = (1.0 - t).powf(0.6);
                (phase * TAU).sin() * env * 0.25
            })
            .collect()
    }

    /// Game over: sad descending run A4→F#4→Eb4→C4
    fn gen_game_over() -> Vec<f32> {
        let mut samples = gen_notes(
            &[(440.0, 0.14), (370.0, 0.14), (311.0, 0.14), (261.0, 0.3)],
            0.0,
            0.3,
        );
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_correct(&self) {}
    pub fn play_bonus(&self) {}
    pub fn play_retry(&self) {}
    pub fn play_timeout(&self) {}
    pub fn play_game_over(&self) {}
}

impl SoundEngine {
    /// Play the cue for a game event, if it has one.
    pub fn play_event(&self, event: &GameEvent) {
        match event {
            GameEvent::Correct { .. } => self.play_correct(),
            GameEvent::Bonus { .. } => self.play_bonus(),
            GameEvent::WrongAnswer { .. } => self.play_retry(),
            GameEvent::TimedOut { lives_left } if *lives_left > 0 => self.play_timeout(),
            GameEvent::GameOver { .. } => self.play_game_over(),
            _ => {}
        }
    }
}
