//! The output-channel dispatcher.
//!
//! Owns the four channel pins and the live [`ChannelState`]. Ops arrive from
//! the receiver task over a channel; this task resolves mode-0 conflicts with
//! the all-off settle pause, drives the pins, and runs the idle-loop
//! equivalent of the reference design: a nonzero mask is cleared after
//! 100 ms in the instant modes (alternating the direction flag for the next
//! reception) or held for the 20 s safety window otherwise.

use core::convert::Infallible;

use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel as EmbassyChannel;
use embassy_time::{Duration, Timer};
use portable_atomic::{AtomicU8, Ordering};

use crate::channels::{ChannelOp, ChannelState};
use crate::output_array::OutputArray;
use crate::shared_constants::{
    CHANNEL_COUNT, CHANNEL_HOLD_DELAY, CHANNEL_SETTLE_DELAY, INSTANT_CLEAR_DELAY,
};
use crate::{Mode, Result};

/// Static type for the `Dispatcher` device abstraction.
pub struct DispatcherStatic {
    ops: EmbassyChannel<CriticalSectionRawMutex, (ChannelOp, Mode), 8>,
    mask: AtomicU8,
}

impl DispatcherStatic {
    pub(crate) async fn send(&self, op: ChannelOp, mode: Mode) {
        self.ops.send((op, mode)).await;
    }
}

/// A device abstraction for the output channels.
///
/// See [`crate::Receiver`] for the full wiring example.
pub struct Dispatcher<'a> {
    statics: &'a DispatcherStatic,
}

impl Dispatcher<'_> {
    /// Create static resources for the dispatcher.
    #[must_use]
    pub const fn new_static() -> DispatcherStatic {
        DispatcherStatic {
            ops: EmbassyChannel::new(),
            mask: AtomicU8::new(0),
        }
    }

    /// Take ownership of the channel outputs and start the dispatcher task.
    ///
    /// # Errors
    ///
    /// Returns an error if the background task cannot be spawned.
    pub fn new(
        outputs: OutputArray<'static, CHANNEL_COUNT>,
        statics: &'static DispatcherStatic,
        spawner: Spawner,
    ) -> Result<Self> {
        spawner.spawn(dispatcher_task(outputs, statics))?;
        Ok(Self { statics })
    }

    /// The channel mask as most recently driven onto the pins.
    #[must_use]
    pub fn mask(&self) -> u8 {
        self.statics.mask.load(Ordering::Relaxed)
    }
}

#[embassy_executor::task]
async fn dispatcher_task(
    outputs: OutputArray<'static, CHANNEL_COUNT>,
    statics: &'static DispatcherStatic,
) -> ! {
    // should never return
    let err = inner_dispatcher_loop(outputs, statics).await;
    panic!("{:?}", err);
}

async fn inner_dispatcher_loop(
    mut outputs: OutputArray<'static, CHANNEL_COUNT>,
    statics: &'static DispatcherStatic,
) -> Result<Infallible> {
    let mut state = ChannelState::new();
    let mut hold_mode = Mode::Exclusive;

    info!("Dispatcher task started");
    loop {
        let next = if state.mask() == 0 {
            Some(statics.ops.receive().await)
        } else {
            // A nonzero mask is on a clock: clear it when the hold expires,
            // unless another op arrives first.
            match select(statics.ops.receive(), Timer::after(hold_delay(hold_mode))).await {
                Either::First(message) => Some(message),
                Either::Second(()) => None,
            }
        };

        match next {
            Some((op, mode)) => {
                hold_mode = mode;
                if state.conflict(&op) {
                    state.all_off();
                    outputs.set_from_bits(0)?;
                    Timer::after(CHANNEL_SETTLE_DELAY).await;
                }
                state.apply(op);
                outputs.set_from_bits(state.mask())?;
                info!("Dispatcher: applied op, mask=0b{:04b}", state.mask());
            }
            None => {
                state.on_hold_expired(hold_mode);
                outputs.set_from_bits(state.mask())?;
                info!("Dispatcher: hold expired, channels cleared");
            }
        }
        statics.mask.store(state.mask(), Ordering::Relaxed);
    }
}

const fn hold_delay(mode: Mode) -> Duration {
    if mode.is_instant() {
        INSTANT_CLEAR_DELAY
    } else {
        CHANNEL_HOLD_DELAY
    }
}
