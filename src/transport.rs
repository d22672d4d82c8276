//! # Transport Timing
//!
//! Tick arithmetic for the looping transport that drives playback.
//!
//! The audio library owns the real clock; this module only converts between
//! milliseconds, ticks and measures, and handles the loop boundary.
//!
//! ## Units
//! - **Tick**: fixed subdivision of a beat (`ppq` ticks per quarter note)
//! - **Measure**: `beats_per_measure` beats; one chord per measure
//! - **Loop**: every measure of the progression, repeated forever
//!
//! ## Loop Wraparound
//! A note that starts near the end of the loop keeps sounding after the
//! transport jumps back to the start. Its interval is split in two:
//!
//! ```text
//! loop = 10 ticks, attack = 8, duration = 5
//!
//! 0   3               8  10
//! |===|...............|==|
//!  seg 2               seg 1
//! ```

use serde::{Deserialize, Serialize};

/// Tempo and meter of the transport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transport {
    /// Beats per minute (beat = quarter note)
    pub bpm: f64,
    /// Ticks per quarter note
    pub ppq: u32,
    #[serde(alias = "beats_per_measure")]
    pub beats_per_measure: u32,
}

impl Default for Transport {
    fn default() -> Self {
        Transport {
            bpm: 120.0,
            ppq: 192,
            beats_per_measure: 4,
        }
    }
}

/// Half-open tick interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSegment {
    pub start: u64,
    pub end: u64,
}

impl TickSegment {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

impl Transport {
    pub fn new(bpm: f64, ppq: u32, beats_per_measure: u32) -> Self {
        Transport {
            bpm,
            ppq,
            beats_per_measure,
        }
    }

    /// Duration of one tick in milliseconds
    pub fn ms_per_tick(&self) -> f64 {
        60_000.0 / (self.bpm * self.ppq as f64)
    }

    pub fn ticks_per_measure(&self) -> u64 {
        self.ppq as u64 * self.beats_per_measure as u64
    }

    /// Convert milliseconds to the nearest tick
    ///
    /// ```
    /// use jam::Transport;
    ///
    /// // 120 BPM, 192 PPQ: one beat is 500 ms
    /// let transport = Transport::default();
    /// assert_eq!(transport.ms_to_ticks(500.0), 192);
    /// assert_eq!(transport.ms_to_ticks(250.0), 96);
    /// ```
    pub fn ms_to_ticks(&self, ms: f64) -> u64 {
        if !ms.is_finite() || ms <= 0.0 {
            return 0;
        }
        (ms / self.ms_per_tick()).round() as u64
    }

    pub fn ticks_to_ms(&self, ticks: u64) -> f64 {
        ticks as f64 * self.ms_per_tick()
    }

    /// Total ticks of a loop of `measures` measures
    pub fn loop_ticks(&self, measures: usize) -> u64 {
        self.ticks_per_measure() * measures as u64
    }

    /// Measure index at `tick`, wrapping over a loop of `measures` measures
    ///
    /// Returns `None` for an empty loop.
    pub fn measure_at(&self, tick: u64, measures: usize) -> Option<usize> {
        let loop_ticks = self.loop_ticks(measures);
        if loop_ticks == 0 {
            return None;
        }
        Some(((tick % loop_ticks) / self.ticks_per_measure()) as usize)
    }
}

/// Sounding length between attack and release positions
///
/// Positions are transport positions inside the loop. A release position
/// behind the attack means the transport wrapped around in between.
///
/// ```
/// use jam::transport::sounding_ticks;
///
/// assert_eq!(sounding_ticks(2, 7, 10), 5);
/// assert_eq!(sounding_ticks(8, 3, 10), 5);
/// ```
pub fn sounding_ticks(attack_tick: u64, release_tick: u64, loop_ticks: u64) -> u64 {
    if release_tick >= attack_tick {
        release_tick - attack_tick
    } else if loop_ticks > 0 {
        (release_tick % loop_ticks) + loop_ticks - (attack_tick % loop_ticks)
    } else {
        0
    }
}

/// Split a sounding interval at the loop boundary
///
/// The attack is normalized into the loop and the duration is capped at one
/// full loop. An interval that fits is returned as one segment; one that
/// crosses the loop end becomes `[attack, loop)` and `[0, rest)`.
///
/// ```
/// use jam::transport::{split_at_loop, TickSegment};
///
/// let segments = split_at_loop(8, 5, 10);
/// assert_eq!(
///     segments,
///     vec![TickSegment { start: 8, end: 10 }, TickSegment { start: 0, end: 3 }]
/// );
/// ```
pub fn split_at_loop(attack_tick: u64, duration_ticks: u64, loop_ticks: u64) -> Vec<TickSegment> {
    if loop_ticks == 0 {
        return Vec::new();
    }
    let start = attack_tick % loop_ticks;
    let duration = duration_ticks.min(loop_ticks);
    let end = start + duration;

    if end <= loop_ticks {
        vec![TickSegment { start, end }]
    } else {
        vec![
            TickSegment {
                start,
                end: loop_ticks,
            },
            TickSegment {
                start: 0,
                end: end - loop_ticks,
            },
        ]
    }
}
