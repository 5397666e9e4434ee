//! Host-level tests for channel-mask semantics.

use remote_kit::{ChannelOp, ChannelState, Mode};

#[test]
fn exclusive_toggles_without_conflict_from_idle() {
    let mut state = ChannelState::new();
    let op = ChannelOp::Exclusive(0b0001);
    assert!(!state.conflict(&op), "nothing active, nothing to settle");
    state.apply(op);
    assert_eq!(state.mask(), 0b0001);

    // The same channel toggles back off, still without a settle.
    assert!(!state.conflict(&ChannelOp::Exclusive(0b0001)));
    state.apply(ChannelOp::Exclusive(0b0001));
    assert_eq!(state.mask(), 0);
}

#[test]
fn exclusive_switch_requires_all_off_first() {
    let mut state = ChannelState::new();
    state.apply(ChannelOp::Exclusive(0b0001));

    // Requesting a different channel while one is active conflicts; applying
    // drops everything before the toggle, so the channels never overlap.
    let op = ChannelOp::Exclusive(0b0100);
    assert!(state.conflict(&op));
    state.apply(op);
    assert_eq!(state.mask(), 0b0100);
}

#[test]
fn flip_flop_toggles_the_direction_pair() {
    let mut state = ChannelState::new();
    state.apply(ChannelOp::FlipFlop);
    assert_eq!(state.mask(), 0b0010);
    state.apply(ChannelOp::FlipFlop);
    assert_eq!(state.mask(), 0);
}

#[test]
fn direct_ops_overwrite_the_mask() {
    let mut state = ChannelState::new();
    state.apply(ChannelOp::Direct(0b1010));
    assert_eq!(state.mask(), 0b1010);
    state.apply(ChannelOp::DirectFlip);
    assert_eq!(state.mask(), state.direction());
    state.apply(ChannelOp::AllOff);
    assert_eq!(state.mask(), 0);
}

#[test]
fn hold_expiry_clears_and_instant_modes_alternate_direction() {
    let mut state = ChannelState::new();
    assert_eq!(state.direction(), 0b10);

    // Toggle modes just clear.
    state.apply(ChannelOp::FlipFlop);
    state.on_hold_expired(Mode::FlipFlop);
    assert_eq!(state.mask(), 0);
    assert_eq!(state.direction(), 0b10);

    // Instant modes flip the 2-bit direction for the next reception.
    state.apply(ChannelOp::DirectFlip);
    state.on_hold_expired(Mode::InstantFlipFlop);
    assert_eq!(state.mask(), 0);
    assert_eq!(state.direction(), 0b01);
    state.apply(ChannelOp::DirectFlip);
    assert_eq!(state.mask(), 0b01);
    state.on_hold_expired(Mode::InstantFlipFlop);
    assert_eq!(state.direction(), 0b10);
}
