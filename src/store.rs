//! The learned-code table.
//!
//! Up to 24 five-byte entries live at cells 0x00..0x78, append-ordered. The
//! write cursor (cell 0x7E) doubles as the count of bytes used; the operating
//! mode persists at cell 0x7F. Entries are only ever written by a learn and
//! removed by the erase flows; there is no in-place edit.

use crate::code::Candidate;
use crate::nv::NvCells;
use crate::shared_constants::{
    CURSOR_ADDR, ENTRY_BYTES, MODE_ADDR, STORE_CAPACITY_BYTES, TIMING_TOLERANCE,
};
use crate::{Error, Mode, Result};

/// Outcome of scanning the table for a candidate.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Match {
    /// No stored entry resembles the candidate.
    None,
    /// Full 24-bit identity match - an individually addressed channel of a
    /// 2-channel transmitter.
    Full,
    /// Truncated 20-bit identity match - a 4-channel transmitter sharing a
    /// code prefix across its keys.
    Partial,
}

/// The code table over a set of nonvolatile cells.
#[derive(Debug)]
pub struct CodeStore<NV> {
    nv: NV,
    cursor: u8,
}

impl<NV: NvCells> CodeStore<NV> {
    /// Load the table state. The cursor cell may hold garbage on first boot;
    /// out-of-range or unaligned values round down to the nearest whole entry
    /// within capacity.
    pub fn new(nv: NV) -> Self {
        let mut cursor = nv.read(CURSOR_ADDR);
        if cursor > STORE_CAPACITY_BYTES {
            cursor = STORE_CAPACITY_BYTES;
        }
        cursor -= cursor % ENTRY_BYTES;
        Self { nv, cursor }
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn capacity() -> u8 {
        STORE_CAPACITY_BYTES / ENTRY_BYTES
    }

    /// Number of stored entries.
    #[must_use]
    pub const fn len(&self) -> u8 {
        self.cursor / ENTRY_BYTES
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Byte offset of the next free slot.
    #[must_use]
    pub const fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Borrow the underlying cells.
    #[must_use]
    pub const fn cells(&self) -> &NV {
        &self.nv
    }

    /// Linear scan from offset 0 to the cursor in 5-byte strides.
    ///
    /// The reference-timing high byte (which carries the line polarity flag)
    /// must match exactly; the low byte may drift by [`TIMING_TOLERANCE`]
    /// ticks, compensating for receiver-clock drift between learn time and
    /// use time. A full identity match always wins over a partial one, even
    /// when the partial entry appears first, so the scan only stops early on
    /// a full match.
    pub fn find(&self, candidate: &Candidate) -> Match {
        let mut found = Match::None;
        let mut offset = 0;
        while offset < self.cursor {
            let stored = Candidate::from_entry([
                self.nv.read(offset),
                self.nv.read(offset.wrapping_add(1)),
                self.nv.read(offset.wrapping_add(2)),
                self.nv.read(offset.wrapping_add(3)),
                self.nv.read(offset.wrapping_add(4)),
            ]);
            offset = offset.wrapping_add(ENTRY_BYTES);

            if stored.t_high != candidate.t_high
                || stored.t_low.abs_diff(candidate.t_low) > TIMING_TOLERANCE
            {
                continue;
            }
            if stored.word.data != candidate.word.data
                || stored.word.id_mid != candidate.word.id_mid
            {
                continue;
            }
            if stored.word.id_low == candidate.word.id_low {
                return Match::Full;
            }
            if stored.word.partial_key() == candidate.word.partial_key() {
                found = Match::Partial;
            }
        }
        found
    }

    /// Append a learned candidate.
    ///
    /// # Errors
    ///
    /// [`Error::StoreFull`] when the table is at capacity; the cursor is not
    /// advanced. Resetting the cursor (the wrap-and-overwrite recovery) is the
    /// caller's explicit decision, not something done silently here.
    pub fn append(&mut self, candidate: &Candidate) -> Result<()> {
        if self.cursor >= STORE_CAPACITY_BYTES {
            return Err(Error::StoreFull);
        }
        for (i, byte) in candidate.to_entry().iter().enumerate() {
            self.nv.write(self.cursor.wrapping_add(i as u8), *byte);
        }
        self.cursor = self.cursor.wrapping_add(ENTRY_BYTES);
        self.nv.write(CURSOR_ADDR, self.cursor);
        Ok(())
    }

    /// Wrap-and-overwrite recovery after a full table: the next learn starts
    /// again at offset 0.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.nv.write(CURSOR_ADDR, 0);
    }

    /// Remove the most recently learned `entries`, zero-filling the vacated
    /// cells and persisting the moved cursor.
    pub fn erase_tail(&mut self, entries: u8) {
        let remove = entries
            .saturating_mul(ENTRY_BYTES)
            .min(self.cursor);
        let end = self.cursor - remove;
        let mut addr = self.cursor;
        while addr > end {
            addr -= 1;
            self.nv.write(addr, 0);
        }
        self.cursor = end;
        self.nv.write(CURSOR_ADDR, end);
    }

    /// Remove every entry.
    pub fn erase_all(&mut self) {
        self.erase_tail(self.cursor / ENTRY_BYTES);
    }

    /// The persisted operating mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::from_bits(self.nv.read(MODE_ADDR))
    }

    /// Persist a new operating mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.nv.write(MODE_ADDR, mode.bits());
    }
}
