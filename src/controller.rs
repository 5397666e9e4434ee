//! Learn/match policy, run once per completed code word.
//!
//! Given a completed [`Candidate`] and the live learn-key level, either match
//! it against the table and dispatch, store it, or report it as already
//! known - each with its own feedback and its own effect on the decoder.

use crate::channels::ChannelOp;
use crate::code::Candidate;
use crate::nv::NvCells;
use crate::store::{CodeStore, Match};
use crate::Mode;

// ===== Feedback =============================================================

/// User-visible blink feedback, one distinct count per outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Feedback {
    /// New transmitter stored.
    Stored,
    /// Transmitter already present; nothing written.
    AlreadyLearned,
    /// Table full; cursor wrapped for overwrite.
    StoreFull,
    /// Most recent entry removed.
    Removed,
    /// Whole table erased.
    Erased,
}

impl Feedback {
    /// Blink count for this outcome.
    #[must_use]
    pub const fn blinks(self) -> u8 {
        match self {
            Feedback::Stored => 1,
            Feedback::AlreadyLearned | Feedback::Removed => 2,
            Feedback::StoreFull | Feedback::Erased => 3,
        }
    }
}

// ===== Outcome ==============================================================

/// What the decoder should do after a completion is handled.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// Matched: move to the post-match tail so a held key cannot re-enter the
    /// match path within this reception.
    Advance,
    /// Stay at the completed word (a held key during learn re-evaluates and
    /// reports "already learned" on the next closing edge).
    Hold,
    /// Discard and wait for a fresh preamble.
    Reset,
}

/// Effects of one completed word.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Outcome {
    pub channel: Option<ChannelOp>,
    pub feedback: Option<Feedback>,
    pub disposition: Disposition,
}

// ===== Controller ===========================================================

/// The learn/match state machine. Carries the match result and data nibble of
/// the most recent completion for the instant-mode tail path.
#[derive(Debug, Default)]
pub struct Controller {
    last_data: u8,
    last_match: bool,
}

impl Controller {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_data: 0,
            last_match: false,
        }
    }

    /// Handle a completed word against the table and the live learn key.
    pub fn on_completed<NV: NvCells>(
        &mut self,
        store: &mut CodeStore<NV>,
        candidate: &Candidate,
        learn_held: bool,
        mode: Mode,
    ) -> Outcome {
        let found = store.find(candidate);
        self.last_match = found != Match::None;

        if learn_held {
            return match found {
                Match::None => match store.append(candidate) {
                    Ok(()) => Outcome {
                        channel: None,
                        feedback: Some(Feedback::Stored),
                        disposition: Disposition::Hold,
                    },
                    Err(_) => {
                        // Capacity exceeded: the candidate is never stored;
                        // the explicit recovery overwrites from the start on
                        // the next learn.
                        store.reset_cursor();
                        Outcome {
                            channel: None,
                            feedback: Some(Feedback::StoreFull),
                            disposition: Disposition::Hold,
                        }
                    }
                },
                Match::Full | Match::Partial => Outcome {
                    channel: None,
                    feedback: Some(Feedback::AlreadyLearned),
                    disposition: Disposition::Reset,
                },
            };
        }

        match found {
            // Unrecognized transmitter: abort silently so strangers cannot
            // toggle anything.
            Match::None => Outcome {
                channel: None,
                feedback: None,
                disposition: Disposition::Reset,
            },
            Match::Full | Match::Partial => {
                self.last_data = candidate.word.data_nibble();
                let channel = match mode {
                    Mode::Exclusive => ChannelOp::Exclusive(self.last_data),
                    Mode::FlipFlop | Mode::Instant | Mode::InstantFlipFlop => ChannelOp::FlipFlop,
                };
                Outcome {
                    channel: Some(channel),
                    feedback: None,
                    disposition: Disposition::Advance,
                }
            }
        }
    }

    /// The post-match tail: instant modes redispatch from the already-decoded
    /// bits on every tail tick, without another dedup pass.
    #[must_use]
    pub fn on_tail(&self, mode: Mode) -> Option<ChannelOp> {
        match mode {
            Mode::Instant => Some(ChannelOp::Direct(self.last_data)),
            Mode::InstantFlipFlop if self.last_match => Some(ChannelOp::DirectFlip),
            _ => None,
        }
    }
}
