//! Audio system using Web Audio API
//!
//! Every sound is a single oscillator with a short decay envelope, so no
//! sample files are needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::host::{AudioSink, Tone, Waveform};

/// Per-tone peak gain before master volume
const TONE_GAIN: f32 = 0.1;

/// Web Audio tone player
pub struct WebAudio {
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.3,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Create an oscillator routed through its own gain node
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        Some((osc, gain))
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}

impl AudioSink for WebAudio {
    fn play_tone(&mut self, tone: Tone) {
        let vol = self.effective_volume();
        if vol <= 0.0 || tone.duration_secs <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let Some((osc, gain)) =
            Self::create_osc(ctx, tone.frequency, oscillator_type(tone.waveform))
        else {
            return;
        };
        let t = ctx.current_time();
        let end = t + tone.duration_secs as f64;
        gain.gain().set_value_at_time(TONE_GAIN * vol, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        osc.start().ok();
        osc.stop_with_when(end).ok();
    }
}
