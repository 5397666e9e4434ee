//! Host-level tests for the learned-code table.

use remote_kit::{Candidate, CodeStore, CodeWord, Match, Mode, NvCells, RamCells};

fn candidate(id_low: u8, id_mid: u8, data: u8, t_low: u8, t_high: u8) -> Candidate {
    Candidate {
        word: CodeWord {
            id_low,
            id_mid,
            data,
        },
        t_low,
        t_high,
    }
}

#[test]
fn fresh_cells_give_empty_store() {
    let store = CodeStore::new(RamCells::new());
    assert!(store.is_empty());
    assert_eq!(store.cursor(), 0);
    assert_eq!(store.mode(), Mode::Exclusive);
}

#[test]
fn append_advances_cursor_and_persists_it() {
    let mut store = CodeStore::new(RamCells::new());
    store
        .append(&candidate(0x12, 0x34, 0x50, 100, 0x80))
        .expect("append");
    assert_eq!(store.cursor(), 5);
    assert_eq!(store.len(), 1);
    assert_eq!(store.cells().read(0x7E), 5);
    // Entry bytes land in append order.
    assert_eq!(store.cells().read(0), 0x12);
    assert_eq!(store.cells().read(1), 0x34);
    assert_eq!(store.cells().read(2), 0x50);
    assert_eq!(store.cells().read(3), 100);
    assert_eq!(store.cells().read(4), 0x80);
}

#[test]
fn find_requires_exact_high_byte_and_tolerant_low_byte() {
    let mut store = CodeStore::new(RamCells::new());
    let learned = candidate(0x12, 0x34, 0x50, 100, 0x80);
    store.append(&learned).expect("append");

    assert_eq!(store.find(&learned), Match::Full);
    // One tick of receiver-clock drift still matches.
    assert_eq!(store.find(&candidate(0x12, 0x34, 0x50, 99, 0x80)), Match::Full);
    assert_eq!(
        store.find(&candidate(0x12, 0x34, 0x50, 101, 0x80)),
        Match::Full
    );
    // Two ticks is another transmitter.
    assert_eq!(
        store.find(&candidate(0x12, 0x34, 0x50, 102, 0x80)),
        Match::None
    );
    // The high byte carries the polarity flag and must match exactly.
    assert_eq!(
        store.find(&candidate(0x12, 0x34, 0x50, 100, 0x00)),
        Match::None
    );
}

#[test]
fn truncated_identity_gives_partial_match() {
    let mut store = CodeStore::new(RamCells::new());
    store
        .append(&candidate(0xA7, 0x34, 0x50, 100, 0x80))
        .expect("append");

    // Same low nibble of id_low, different high bits: a 4-channel sibling.
    assert_eq!(
        store.find(&candidate(0x17, 0x34, 0x50, 100, 0x80)),
        Match::Partial
    );
    // Different low nibble: no match at all.
    assert_eq!(
        store.find(&candidate(0x18, 0x34, 0x50, 100, 0x80)),
        Match::None
    );
    // Different data nibble byte: no match either.
    assert_eq!(
        store.find(&candidate(0xA7, 0x34, 0x60, 100, 0x80)),
        Match::None
    );
}

#[test]
fn full_match_wins_over_earlier_partial() {
    let mut store = CodeStore::new(RamCells::new());
    // The partial-matching entry is stored first; the exact entry later. The
    // scan must keep going past the partial and report the full match.
    store
        .append(&candidate(0xA7, 0x34, 0x50, 100, 0x80))
        .expect("append");
    store
        .append(&candidate(0x17, 0x34, 0x50, 100, 0x80))
        .expect("append");

    assert_eq!(
        store.find(&candidate(0x17, 0x34, 0x50, 100, 0x80)),
        Match::Full
    );
}

#[test]
fn capacity_boundary_rejects_without_advancing() {
    let mut store = CodeStore::new(RamCells::new());
    for i in 0..24 {
        store
            .append(&candidate(i, 0x34, 0x50, 100, 0x80))
            .expect("append within capacity");
    }
    assert_eq!(store.cursor(), 0x78);

    let overflow = candidate(0xFF, 0x34, 0x50, 100, 0x80);
    assert!(store.append(&overflow).is_err());
    assert_eq!(store.cursor(), 0x78, "failed append must not advance");

    // The explicit wrap recovery.
    store.reset_cursor();
    assert_eq!(store.cursor(), 0);
    assert_eq!(store.cells().read(0x7E), 0);
    assert_eq!(store.find(&overflow), Match::None, "25th code never stored");
}

#[test]
fn erase_tail_removes_one_slot_and_zero_fills() {
    let mut store = CodeStore::new(RamCells::new());
    for i in 0..3 {
        store
            .append(&candidate(i, 0x34, 0x50, 100, 0x80))
            .expect("append");
    }
    assert_eq!(store.cursor(), 15);

    store.erase_tail(1);
    assert_eq!(store.cursor(), 10);
    assert_eq!(store.cells().read(0x7E), 10);
    for addr in 10..15 {
        assert_eq!(store.cells().read(addr), 0, "cell {addr} not vacated");
    }
    // The surviving entries still match.
    assert_eq!(
        store.find(&candidate(1, 0x34, 0x50, 100, 0x80)),
        Match::Full
    );
    assert_eq!(
        store.find(&candidate(2, 0x34, 0x50, 100, 0x80)),
        Match::None
    );
}

#[test]
fn erase_all_clears_every_entry() {
    let mut store = CodeStore::new(RamCells::new());
    for i in 0..3 {
        store
            .append(&candidate(i, 0x34, 0x50, 100, 0x80))
            .expect("append");
    }
    store.erase_all();
    assert_eq!(store.cursor(), 0);
    for addr in 0..15 {
        assert_eq!(store.cells().read(addr), 0);
    }
}

#[test]
fn erase_tail_clamps_at_zero() {
    let mut store = CodeStore::new(RamCells::new());
    store
        .append(&candidate(1, 0x34, 0x50, 100, 0x80))
        .expect("append");
    store.erase_tail(5);
    assert_eq!(store.cursor(), 0);
}

#[test]
fn mode_round_trips_through_the_cells() {
    let mut store = CodeStore::new(RamCells::new());
    store.set_mode(Mode::Instant);
    assert_eq!(store.mode(), Mode::Instant);
    assert_eq!(store.cells().read(0x7F), 2);

    // A corrupt mode cell masks down to its low two bits.
    let mut image = [0u8; 128];
    image[0x7F] = 0xFE;
    let store = CodeStore::new(RamCells::from_image(image));
    assert_eq!(store.mode(), Mode::Instant);
}

#[test]
fn garbage_cursor_rounds_down_to_whole_entries() {
    let mut image = [0u8; 128];
    image[0x7E] = 13; // not entry-aligned
    let store = CodeStore::new(RamCells::from_image(image));
    assert_eq!(store.cursor(), 10);

    let mut image = [0u8; 128];
    image[0x7E] = 0xFF; // out of range
    let store = CodeStore::new(RamCells::from_image(image));
    assert_eq!(store.cursor(), 0x78);
}

#[test]
fn mode_cycle_wraps_modulo_four() {
    assert_eq!(Mode::Exclusive.next(), Mode::FlipFlop);
    assert_eq!(Mode::FlipFlop.next(), Mode::Instant);
    assert_eq!(Mode::Instant.next(), Mode::InstantFlipFlop);
    assert_eq!(Mode::InstantFlipFlop.next(), Mode::Exclusive);
    assert!(!Mode::FlipFlop.is_instant());
    assert!(Mode::Instant.is_instant());
}
