//! The 24-bit fixed-code word and its 5-byte stored form.
//!
//! A transmission carries 23 pulse-coded bit slots plus one terminal slot that is
//! inferred from the final edge timing rather than from a discrete pulse. The word
//! splits into a 20-bit transmitter ID and a 4-bit channel-data nibble.
//!
//! Index-to-field mapping:
//!
//! | pulse index | destination            |
//! |-------------|------------------------|
//! | 0..=7       | `data` bits 0..=7      |
//! | 8..=15      | `id_mid` bits 0..=7    |
//! | 16..=22     | `id_low` bits 0..=6    |
//! | 23          | terminal slot, recorded as `data` bit 7 at the closing edge |
//!
//! The dispatched channel nibble is `data >> 4`; the truncated identity shared by
//! 4-channel transmitters is `id_low & 0x0F`.

/// Positional bit table for pulse-index placement.
pub const SHIFT: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// Set when receiver line A (rather than line B) captured the preamble.
pub const LINE_FLAG: u8 = 0b1000_0000;

/// Number of pulse-coded bit slots; the slot after this one is the terminal slot.
pub const TERMINAL_INDEX: u8 = 23;

// ===== Code word ============================================================

/// The three payload bytes of a received word.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CodeWord {
    /// Bits 16..=22 of the word, plus the shared low nibble used for partial matching.
    pub id_low: u8,
    /// Bits 8..=15 of the word.
    pub id_mid: u8,
    /// Bits 0..=7 of the word; the high nibble is the channel-data nibble and bit 7
    /// doubles as the terminal slot.
    pub data: u8,
}

impl CodeWord {
    /// Record a one bit at the given pulse index. Indexes at or past the terminal
    /// slot are ignored; the terminal bit arrives via [`Self::set_terminal_bit`].
    pub fn set_bit(&mut self, index: u8) {
        match index {
            0..=7 => self.data |= SHIFT[(index & 7) as usize],
            8..=15 => self.id_mid |= SHIFT[(index & 7) as usize],
            16..=22 => self.id_low |= SHIFT[(index & 7) as usize],
            _ => {}
        }
    }

    /// Whether the word received so far implies a one in the terminal slot.
    ///
    /// The closing-edge inference branches on this: a zero-implying word checks the
    /// near-equal window, a one-implying word re-checks the one-bit window for a
    /// duplicated trailing one.
    #[must_use]
    pub const fn terminal_implied_one(self) -> bool {
        self.data >= 64
    }

    /// Record the inferred terminal bit.
    pub const fn set_terminal_bit(&mut self) {
        self.data |= SHIFT[7];
    }

    /// The 4-bit channel selector carried in the word.
    #[must_use]
    pub const fn data_nibble(self) -> u8 {
        self.data >> 4
    }

    /// The truncated identity nibble shared by the four codes of a 4-channel
    /// transmitter.
    #[must_use]
    pub const fn partial_key(self) -> u8 {
        self.id_low & 0x0F
    }
}

// ===== Candidate ============================================================

/// A code word together with the reference preamble timing captured when it was
/// received. The timing rides along so matching can compensate for
/// transmitter-specific oscillator speed.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Candidate {
    pub word: CodeWord,
    /// Low byte of the measured preamble short-pulse duration, in timer ticks.
    pub t_low: u8,
    /// High byte of the same measurement; bit 7 flags which receiver line was active.
    pub t_high: u8,
}

impl Candidate {
    /// Start a fresh candidate at preamble time: cleared word, reference timing
    /// latched from the short pulse that preceded the synchronization gap.
    #[must_use]
    pub fn from_preamble(rise_ticks: u16, line_a: bool) -> Self {
        let line = if line_a { LINE_FLAG } else { 0 };
        Self {
            word: CodeWord::default(),
            t_low: (rise_ticks & 0xFF) as u8,
            t_high: ((rise_ticks >> 8) as u8) | line,
        }
    }

    /// The 5-byte stored form: `[id_low, id_mid, data, t_low, t_high]`.
    #[must_use]
    pub const fn to_entry(self) -> [u8; 5] {
        [
            self.word.id_low,
            self.word.id_mid,
            self.word.data,
            self.t_low,
            self.t_high,
        ]
    }

    /// Rebuild a candidate from its stored form.
    #[must_use]
    pub const fn from_entry(bytes: [u8; 5]) -> Self {
        Self {
            word: CodeWord {
                id_low: bytes[0],
                id_mid: bytes[1],
                data: bytes[2],
            },
            t_low: bytes[3],
            t_high: bytes[4],
        }
    }
}
