//! Ratio-window edge decoder for fixed-code transmissions.
//!
//! The decoder consumes one edge at a time: the edge direction plus the interval,
//! in timer ticks, since the previous (opposite) edge. All classification windows
//! are open intervals scaled by integer ratios of the two most recently measured
//! half-periods, so the decoder self-calibrates to each transmitter's pulse width
//! and needs no absolute timing thresholds.
//!
//! A word begins when a low gap lands in the synchronization window (30x..32x the
//! preceding short pulse). Bits then classify on each rising edge: a low gap of
//! 2x..4x the preceding high pulse is a zero, a high pulse of 2x..4x the current
//! low gap is a one. Any interval matching neither window aborts the word. The
//! 24th bit slot has no pulse of its own; it is inferred from the closing falling
//! edge (see [`Decoder::on_edge`]).

use crate::code::{Candidate, TERMINAL_INDEX};

// ===== Edge input ===========================================================

/// Direction of a received edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgeKind {
    /// Line went high; `ticks` measured the low gap.
    Rising,
    /// Line went low; `ticks` measured the high pulse.
    Falling,
}

/// One edge of the demodulated envelope.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EdgeEvent {
    pub kind: EdgeKind,
    /// Interval since the previous edge, in timer ticks.
    pub ticks: u16,
    /// Which receiver line is active. Sampled at preamble time into the
    /// reference-timing polarity flag; ignored otherwise.
    pub line_a: bool,
}

// ===== State machine ========================================================

/// Decoder progress through a word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum DecoderState {
    /// No synchronization gap seen.
    #[default]
    Idle,
    /// Synchronization gap matched; reference timing latched, no bits yet.
    PreambleSeen { candidate: Candidate },
    /// Bit slots 0..index captured. Index 23 is a word awaiting its terminal
    /// inference; index 24 is the post-match tail of a still-held key.
    Receiving { index: u8, candidate: Candidate },
}

/// Output of one edge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecoderEvent {
    /// A full 24-slot word, terminal bit included.
    Completed(Candidate),
    /// A falling edge arrived while in the post-match tail; instant modes
    /// redispatch on this.
    TailTick,
}

/// The edge decoder. Feed it edges with [`Self::on_edge`]; reset it from the
/// idle timeout with [`Self::reset`].
#[derive(Debug, Default)]
pub struct Decoder {
    state: DecoderState,
    /// Most recent high-pulse duration, in ticks.
    rise: u16,
    /// Most recent low-gap duration, in ticks.
    fall: u16,
}

/// `value` strictly inside `(lo_mul * base, hi_mul * base)`, widened so slow
/// pulses cannot wrap the comparison.
#[inline]
fn in_open_window(value: u16, base: u16, lo_mul: u32, hi_mul: u32) -> bool {
    let value = u32::from(value);
    let base = u32::from(base);
    value > base.saturating_mul(lo_mul) && value < base.saturating_mul(hi_mul)
}

impl Decoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Idle,
            rise: 0,
            fall: 0,
        }
    }

    /// Current state, exposed for inspection.
    #[must_use]
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Drop any partial word. Timing memory survives, as the next preamble
    /// re-measures against the most recent short pulse anyway.
    pub const fn reset(&mut self) {
        self.state = DecoderState::Idle;
    }

    /// Advance a just-completed word into the post-match tail so a still-held
    /// key cannot re-enter the match path within the same reception.
    pub const fn advance_to_tail(&mut self) {
        if let DecoderState::Receiving { index, .. } = &mut self.state {
            if *index == TERMINAL_INDEX {
                *index = TERMINAL_INDEX + 1;
            }
        }
    }

    /// Feed one edge; returns a completed word or a tail tick when one falls out.
    pub fn on_edge(&mut self, edge: EdgeEvent) -> Option<DecoderEvent> {
        match edge.kind {
            EdgeKind::Rising => {
                self.on_rising(edge.ticks, edge.line_a);
                None
            }
            EdgeKind::Falling => self.on_falling(edge.ticks),
        }
    }

    /// Rising edge: `ticks` is the low gap that just ended.
    fn on_rising(&mut self, ticks: u16, line_a: bool) {
        let short_pulse = self.rise;
        self.fall = ticks;

        // Synchronization gap, checked first so a new preamble resynchronizes
        // even mid-word.
        if in_open_window(ticks, short_pulse, 30, 32) {
            self.state = DecoderState::PreambleSeen {
                candidate: Candidate::from_preamble(short_pulse, line_a),
            };
            return;
        }

        let (mut index, mut candidate) = match self.state {
            DecoderState::Idle => return,
            DecoderState::PreambleSeen { candidate } => (0, candidate),
            DecoderState::Receiving { index, candidate } => (index, candidate),
        };

        if in_open_window(ticks, short_pulse, 2, 4) {
            // Zero bit: long low gap after a short pulse. Slots past the
            // terminal boundary neither advance nor abort.
            if index < TERMINAL_INDEX {
                index += 1;
            }
        } else if in_open_window(short_pulse, ticks, 2, 4) {
            // One bit: long pulse before a short gap.
            if index < TERMINAL_INDEX {
                candidate.word.set_bit(index);
                index += 1;
            }
        } else {
            // Invalid timing: discard the word entirely.
            self.state = DecoderState::Idle;
            return;
        }

        self.state = DecoderState::Receiving { index, candidate };
    }

    /// Falling edge: `ticks` is the high pulse that just ended.
    fn on_falling(&mut self, ticks: u16) -> Option<DecoderEvent> {
        let gap = self.fall;
        self.rise = ticks;

        let DecoderState::Receiving { index, candidate } = &mut self.state else {
            return None;
        };

        if *index == TERMINAL_INDEX {
            // Terminal-slot inference. The two branches are deliberately
            // asymmetric; the duplicate-one window differs from the near-equal
            // window the zero-implied branch uses.
            if candidate.word.terminal_implied_one() {
                if in_open_window(ticks, gap, 2, 4) {
                    candidate.word.set_terminal_bit();
                }
            } else if u32::from(ticks) < 2 * u32::from(gap)
                && u32::from(gap) < 2 * u32::from(ticks)
            {
                candidate.word.set_terminal_bit();
            }
            return Some(DecoderEvent::Completed(*candidate));
        }

        if *index > TERMINAL_INDEX {
            return Some(DecoderEvent::TailTick);
        }

        None
    }
}
