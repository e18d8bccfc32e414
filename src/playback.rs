//! Playback schedule from exported MIDI
//!
//! Turns the bytes returned by `/export-midi` into a flat, time-sorted list of
//! notes in seconds. Sound output is left to the page's synthesizer.

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Notes shorter than this (seconds) are dropped
pub const MIN_NOTE_SECONDS: f64 = 0.01;

const DEFAULT_US_PER_BEAT: u32 = 500_000;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScheduledNote {
    /// Start, seconds from the beginning
    pub time: f64,
    pub midi: u8,
    /// 0.0 to 1.0
    pub velocity: f64,
    pub duration: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    /// Initial tempo
    pub tempo_bpm: f64,
    pub notes: Vec<ScheduledNote>,
}

impl Schedule {
    /// End of the last note, in seconds
    pub fn end_time(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.time + n.duration)
            .fold(0.0, f64::max)
    }
}

/// Tick → seconds conversion honoring tempo changes
struct TempoMap {
    /// (absolute tick, microseconds per beat), sorted by tick
    changes: Vec<(u64, u32)>,
    timing: Timing,
}

impl TempoMap {
    fn new(mut changes: Vec<(u64, u32)>, timing: Timing) -> Self {
        changes.sort_by_key(|(tick, _)| *tick);
        Self { changes, timing }
    }

    fn seconds_per_tick(&self, us_per_beat: u32) -> f64 {
        match self.timing {
            Timing::Metrical(tpq) => {
                let tpq = tpq.as_int().max(1) as f64;
                us_per_beat as f64 / 1_000_000.0 / tpq
            }
            Timing::Timecode(fps, subframe) => 1.0 / (fps.as_f32() as f64 * subframe.max(1) as f64),
        }
    }

    fn seconds(&self, tick: u64) -> f64 {
        let mut seconds = 0.0;
        let mut last_tick = 0u64;
        let mut tempo = DEFAULT_US_PER_BEAT;
        for &(change_tick, us) in &self.changes {
            if change_tick >= tick {
                break;
            }
            seconds += (change_tick - last_tick) as f64 * self.seconds_per_tick(tempo);
            last_tick = change_tick;
            tempo = us;
        }
        seconds + (tick - last_tick) as f64 * self.seconds_per_tick(tempo)
    }

    fn initial_bpm(&self) -> f64 {
        let us = self
            .changes
            .first()
            .filter(|(tick, _)| *tick == 0)
            .map(|(_, us)| *us)
            .unwrap_or(DEFAULT_US_PER_BEAT);
        60_000_000.0 / us as f64
    }
}

/// Notes of every track of a Standard MIDI File, sorted by start time
pub fn note_schedule(bytes: &[u8]) -> Result<Schedule> {
    let smf = Smf::parse(bytes)?;

    let mut changes = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(us)) = event.kind {
                changes.push((tick, us.as_int()));
            }
        }
    }
    let tempo = TempoMap::new(changes, smf.header.timing);

    let mut notes = Vec::new();
    let mut dropped = 0usize;
    for track in &smf.tracks {
        let mut tick = 0u64;
        // (channel, key) → (start tick, velocity)
        let mut sounding: HashMap<(u8, u8), (u64, u8)> = HashMap::new();
        for event in track {
            tick += event.delta.as_int() as u64;
            let TrackEventKind::Midi { channel, message } = event.kind else {
                continue;
            };
            let (key, started) = match message {
                MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                    sounding.insert((channel.as_int(), key.as_int()), (tick, vel.as_int()));
                    continue;
                }
                MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                    (key.as_int(), sounding.remove(&(channel.as_int(), key.as_int())))
                }
                _ => continue,
            };
            let Some((start, vel)) = started else {
                continue;
            };
            let time = tempo.seconds(start);
            let duration = tempo.seconds(tick) - time;
            if duration <= MIN_NOTE_SECONDS {
                dropped += 1;
                continue;
            }
            notes.push(ScheduledNote {
                time,
                midi: key,
                velocity: vel as f64 / 127.0,
                duration,
            });
        }
    }

    notes.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(std::cmp::Ordering::Equal));
    log::info!(
        "playback: {} note(s) from {} track(s), {} too short",
        notes.len(),
        smf.tracks.len(),
        dropped
    );
    Ok(Schedule {
        tempo_bpm: tempo.initial_bpm(),
        notes,
    })
}

/// Scientific pitch name, e.g. 60 → `C4`
pub fn midi_note_name(midi: u8) -> String {
    const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = midi as i32 / 12 - 1;
    format!("{}{}", NAMES[midi as usize % 12], octave)
}
