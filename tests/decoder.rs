//! Host-level tests for the edge decoder.
//!
//! Edges are fed as (direction, ticks) pairs. A zero bit is a 100-tick pulse
//! followed by a 300-tick gap; a one bit is the reverse; the synchronization
//! gap is 31x the preceding short pulse.

use remote_kit::{Decoder, DecoderEvent, DecoderState, EdgeEvent, EdgeKind, LINE_FLAG};

fn rising(decoder: &mut Decoder, ticks: u16) -> Option<DecoderEvent> {
    decoder.on_edge(EdgeEvent {
        kind: EdgeKind::Rising,
        ticks,
        line_a: true,
    })
}

fn falling(decoder: &mut Decoder, ticks: u16) -> Option<DecoderEvent> {
    decoder.on_edge(EdgeEvent {
        kind: EdgeKind::Falling,
        ticks,
        line_a: true,
    })
}

/// Short pulse then the synchronization gap.
fn preamble(decoder: &mut Decoder) {
    assert_eq!(falling(decoder, 100), None);
    assert_eq!(rising(decoder, 3100), None);
    assert!(matches!(
        decoder.state(),
        DecoderState::PreambleSeen { .. }
    ));
}

fn zero_bit(decoder: &mut Decoder) -> Option<DecoderEvent> {
    let completed = falling(decoder, 100);
    assert_eq!(rising(decoder, 300), None);
    completed
}

fn one_bit(decoder: &mut Decoder) -> Option<DecoderEvent> {
    let completed = falling(decoder, 300);
    assert_eq!(rising(decoder, 100), None);
    completed
}

/// Feed a full word whose 23 pulse-coded slots come from the low bits of
/// `bits` (slot 0 first), then close it with a short terminal pulse.
fn feed_word(decoder: &mut Decoder, bits: u32) -> DecoderEvent {
    preamble(decoder);
    for slot in 0..23 {
        if bits & (1 << slot) == 0 {
            assert_eq!(zero_bit(decoder), None);
        } else {
            assert_eq!(one_bit(decoder), None);
        }
    }
    falling(decoder, 100).expect("word should complete on the closing edge")
}

#[test]
fn preamble_ratio_window_is_open() {
    for (gap, expect_preamble) in [(3000, false), (3001, true), (3199, true), (3200, false)] {
        let mut decoder = Decoder::new();
        falling(&mut decoder, 100);
        rising(&mut decoder, gap);
        assert_eq!(
            matches!(decoder.state(), DecoderState::PreambleSeen { .. }),
            expect_preamble,
            "gap={gap}"
        );
    }
}

#[test]
fn preamble_latches_reference_timing_and_line() {
    let mut decoder = Decoder::new();
    falling(&mut decoder, 0x123);
    decoder.on_edge(EdgeEvent {
        kind: EdgeKind::Rising,
        ticks: 0x123 * 31,
        line_a: false,
    });
    let DecoderState::PreambleSeen { candidate } = decoder.state() else {
        panic!("expected preamble");
    };
    assert_eq!(candidate.t_low, 0x23);
    assert_eq!(candidate.t_high, 0x01);

    // Line A sets the polarity flag in the timing high byte.
    let mut decoder = Decoder::new();
    falling(&mut decoder, 0x123);
    rising(&mut decoder, 0x123 * 31);
    let DecoderState::PreambleSeen { candidate } = decoder.state() else {
        panic!("expected preamble");
    };
    assert_eq!(candidate.t_high, 0x01 | LINE_FLAG);
}

#[test]
fn eight_zero_bits_leave_data_byte_clear() {
    // The concrete reference scenario: rise=100, fall=3100 (ratio 31), then
    // eight (100, 300) pairs decode eight zero bits in the data field.
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for _ in 0..8 {
        assert_eq!(zero_bit(&mut decoder), None);
    }
    let DecoderState::Receiving { index, candidate } = decoder.state() else {
        panic!("expected receiving");
    };
    assert_eq!(index, 8);
    assert_eq!(candidate.word.data, 0x00);
}

#[test]
fn bits_land_in_their_fields() {
    let mut decoder = Decoder::new();
    // Slots 0 and 7 -> data byte; 8 -> id mid; 16 and 22 -> id low.
    let bits = (1 << 0) | (1 << 7) | (1 << 8) | (1 << 16) | (1 << 22);
    let DecoderEvent::Completed(candidate) = feed_word(&mut decoder, bits) else {
        panic!("expected completion");
    };
    assert_eq!(candidate.word.data, 0b1000_0001);
    assert_eq!(candidate.word.id_mid, 0b0000_0001);
    assert_eq!(candidate.word.id_low, 0b0100_0001);
}

#[test]
fn invalid_interval_aborts_to_idle() {
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    zero_bit(&mut decoder);
    // A gap matching neither bit window nor the sync window.
    falling(&mut decoder, 100);
    rising(&mut decoder, 1000);
    assert_eq!(decoder.state(), DecoderState::Idle);
}

#[test]
fn new_preamble_resynchronizes_mid_word() {
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for _ in 0..5 {
        one_bit(&mut decoder);
    }
    // Another sync gap starts a fresh word; the five captured bits are gone.
    falling(&mut decoder, 100);
    rising(&mut decoder, 3100);
    let DecoderState::PreambleSeen { candidate } = decoder.state() else {
        panic!("expected preamble");
    };
    assert_eq!(candidate.word.id_mid, 0);
    assert_eq!(candidate.word.data, 0);
}

#[test]
fn terminal_bit_inferred_from_near_equal_closing_edge() {
    // Word implies a zero terminal bit (data bit 6 clear). A closing pulse
    // near-equal to the last gap means the terminal bit was actually one.
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for _ in 0..23 {
        zero_bit(&mut decoder);
    }
    // Last gap was 300 ticks; a 300-tick closing pulse is near-equal.
    let Some(DecoderEvent::Completed(candidate)) = falling(&mut decoder, 300) else {
        panic!("expected completion");
    };
    assert_eq!(candidate.word.data, 0b1000_0000);

    // A short closing pulse leaves the terminal bit zero.
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for _ in 0..23 {
        zero_bit(&mut decoder);
    }
    let Some(DecoderEvent::Completed(candidate)) = falling(&mut decoder, 100) else {
        panic!("expected completion");
    };
    assert_eq!(candidate.word.data, 0x00);
}

#[test]
fn duplicated_trailing_one_sets_terminal_bit() {
    // Word implies a one terminal bit (data bit 6 set): slot 6 was a one, and
    // the closing edge re-matches the one-bit window.
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for slot in 0..23 {
        if slot == 6 {
            one_bit(&mut decoder);
        } else {
            zero_bit(&mut decoder);
        }
    }
    // Last gap 300 ticks, closing pulse 700: inside (600, 1200).
    let Some(DecoderEvent::Completed(candidate)) = falling(&mut decoder, 700) else {
        panic!("expected completion");
    };
    assert_eq!(candidate.word.data, 0b1100_0000);

    // Outside the window the word keeps only the pulsed bit.
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    for slot in 0..23 {
        if slot == 6 {
            one_bit(&mut decoder);
        } else {
            zero_bit(&mut decoder);
        }
    }
    let Some(DecoderEvent::Completed(candidate)) = falling(&mut decoder, 300) else {
        panic!("expected completion");
    };
    assert_eq!(candidate.word.data, 0b0100_0000);
}

#[test]
fn completion_repeats_until_dispositioned() {
    // The closing edge re-fires while the word sits at the terminal index,
    // which is what lets a held key report "already learned" right after a
    // successful learn.
    let mut decoder = Decoder::new();
    feed_word(&mut decoder, 0);
    zero_bit(&mut decoder);
    assert!(matches!(
        falling(&mut decoder, 100),
        Some(DecoderEvent::Completed(_))
    ));
}

#[test]
fn tail_ticks_after_advance_do_not_recomplete() {
    let mut decoder = Decoder::new();
    feed_word(&mut decoder, 0b1010);
    decoder.advance_to_tail();

    // Further in-frame pulses tick the tail instead of re-completing.
    assert_eq!(rising(&mut decoder, 300), None);
    assert_eq!(falling(&mut decoder, 100), Some(DecoderEvent::TailTick));
    assert_eq!(rising(&mut decoder, 300), None);
    assert_eq!(falling(&mut decoder, 100), Some(DecoderEvent::TailTick));

    // Invalid timing still silences the tail.
    assert_eq!(rising(&mut decoder, 1000), None);
    assert_eq!(decoder.state(), DecoderState::Idle);
    assert_eq!(falling(&mut decoder, 100), None);
}

#[test]
fn reset_discards_partial_word() {
    let mut decoder = Decoder::new();
    preamble(&mut decoder);
    one_bit(&mut decoder);
    decoder.reset();
    assert_eq!(decoder.state(), DecoderState::Idle);

    // And the next preamble starts clean.
    falling(&mut decoder, 100);
    rising(&mut decoder, 3100);
    assert!(matches!(
        decoder.state(),
        DecoderState::PreambleSeen { .. }
    ));
}
