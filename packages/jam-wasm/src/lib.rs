use serde::Serialize;
use wasm_bindgen::prelude::*;

use jam::{
    GenerationResponse, GenerationToken, InputEvent, InputSource, JamError, JamSession,
    SynthCommand, Transport,
};

#[derive(Serialize)]
struct JamErrorInfo {
    message: String,
    chord: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TickUpdate {
    chord: Option<String>,
    changed: bool,
}

fn error_to_js(e: JamError) -> JsValue {
    let info = JamErrorInfo {
        chord: e.chord().map(String::from),
        message: e.to_string(),
    };
    match serde_json::to_string(&info) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&info.message),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_source(source: &str) -> Result<InputSource, JsValue> {
    match source {
        "keyboard" => Ok(InputSource::Keyboard),
        "button" => Ok(InputSource::Button),
        "midi" => Ok(InputSource::Midi),
        other => Err(JsValue::from_str(&format!("unknown input source '{}'", other))),
    }
}

/// Decode one base64 melody payload into note events (JSON)
#[wasm_bindgen]
pub fn decode_melody(blob: &str) -> Result<String, JsValue> {
    let melody = jam::decode_melody(blob).map_err(error_to_js)?;
    to_json(&melody)
}

/// Static-cache key of a progression descriptor
#[wasm_bindgen]
pub fn cache_key(progression: &str) -> Result<String, JsValue> {
    jam::Progression::parse(progression)
        .map(|p| p.cache_key())
        .map_err(error_to_js)
}

/// Transpose a progression descriptor by a number of semitones
#[wasm_bindgen]
pub fn transpose_progression(progression: &str, semitones: i32, prefer_flats: bool) -> Result<String, JsValue> {
    jam::Progression::parse(progression)
        .map(|p| p.transpose(semitones, prefer_flats).descriptor())
        .map_err(error_to_js)
}

/// One jam session: generation results in, synth commands out
///
/// Every input method returns a JSON array of synth commands for the page's
/// audio library to perform.
#[wasm_bindgen]
pub struct JamEngine {
    session: JamSession,
}

#[wasm_bindgen]
impl JamEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(bpm: f64, ppq: u32, beats_per_measure: u32) -> JamEngine {
        JamEngine {
            session: JamSession::new(Transport::new(bpm, ppq, beats_per_measure)),
        }
    }

    /// Token to pass back with the response of the request about to be sent
    pub fn begin_generation(&mut self) -> f64 {
        self.session.begin_generation().0 as f64
    }

    /// Apply a response body; returns the outcome as JSON
    pub fn complete_generation(&mut self, token: f64, body: &str) -> Result<String, JsValue> {
        let token = GenerationToken(token as u64);
        let outcome = self
            .session
            .complete_generation(token, GenerationResponse::from_json(body))
            .map_err(error_to_js)?;
        to_json(&outcome)
    }

    /// Report a failed request (network error, non-OK status)
    pub fn fail_generation(&mut self, token: f64, message: &str) -> Result<String, JsValue> {
        let token = GenerationToken(token as u64);
        let outcome = self
            .session
            .complete_generation(token, Err(JamError::NetworkError(message.to_string())))
            .map_err(error_to_js)?;
        to_json(&outcome)
    }

    pub fn status(&self) -> Result<String, JsValue> {
        to_json(self.session.status())
    }

    pub fn status_message(&self) -> String {
        self.session.status().message()
    }

    /// Follow the transport; returns `{chord, changed}`
    pub fn on_tick(&mut self, tick: f64) -> Result<String, JsValue> {
        let changed = self.session.on_tick(tick as u64).is_some();
        to_json(&TickUpdate {
            chord: self.session.active_chord().map(String::from),
            changed,
        })
    }

    pub fn key_down(&mut self, source: &str, key: u8, tick: f64) -> Result<String, JsValue> {
        let source = parse_source(source)?;
        self.commands(InputEvent::KeyDown { source, key }, tick)
    }

    pub fn key_up(&mut self, source: &str, key: u8, tick: f64) -> Result<String, JsValue> {
        let source = parse_source(source)?;
        self.commands(InputEvent::KeyUp { source, key }, tick)
    }

    /// Handle an `InputEvent` object, e.g. `{type: "aftertouch", value: 64}`
    pub fn handle_input(&mut self, event: JsValue, tick: f64) -> Result<String, JsValue> {
        let event: InputEvent = serde_wasm_bindgen::from_value(event)?;
        self.commands(event, tick)
    }

    /// Handle a raw MIDI message from the Web MIDI API
    pub fn midi_message(&mut self, data: &[u8], tick: f64) -> Result<String, JsValue> {
        let mut commands: Vec<SynthCommand> = Vec::new();
        for event in InputEvent::from_midi(data) {
            commands.extend(self.session.handle_input(event, tick as u64));
        }
        to_json(&commands)
    }

    /// MIDI device disconnected
    pub fn device_lost(&mut self, tick: f64) -> Result<String, JsValue> {
        self.commands(InputEvent::DeviceLost, tick)
    }

    pub fn stop(&mut self, tick: f64) -> Result<String, JsValue> {
        to_json(&self.session.stop(tick as u64))
    }

    pub fn loop_ticks(&self) -> f64 {
        self.session.loop_ticks() as f64
    }

    pub fn backing_schedule(&self) -> Result<String, JsValue> {
        to_json(&self.session.backing_schedule())
    }

    pub fn piano_roll(&self) -> Result<String, JsValue> {
        to_json(&self.session.melody_schedule())
    }

    fn commands(&mut self, event: InputEvent, tick: f64) -> Result<String, JsValue> {
        to_json(&self.session.handle_input(event, tick as u64))
    }
}
