//! A learning receiver for fixed-code RF remote controls.
//!
//! The crate decodes on/off-keyed pulse transmissions edge by edge, matches
//! them against a nonvolatile table of learned transmitters, and drives up to
//! four output channels under a persisted operating mode (per-channel toggle,
//! two-channel flip-flop, or the instant variants of each).
//!
//! The protocol core - [`Decoder`], [`CodeStore`], [`Controller`],
//! [`ChannelState`] - is hardware-free and unit-testable on the host. The
//! hardware layer wraps it in the device-abstraction pattern: construct
//! [`Dispatcher`] and [`Receiver`] with pins, `'static` resources, and a
//! `Spawner`, then await [`Receiver::wait`] for events.
#![no_std]

mod channels;
mod code;
mod controller;
mod decoder;
#[cfg(any(feature = "pico1", feature = "pico2"))]
mod dispatcher;
mod error;
#[cfg(any(feature = "pico1", feature = "pico2"))]
mod indicator;
mod mode;
mod nv;
#[cfg(any(feature = "pico1", feature = "pico2"))]
mod nv_flash;
#[cfg(any(feature = "pico1", feature = "pico2"))]
mod output_array;
#[cfg(any(feature = "pico1", feature = "pico2"))]
mod receiver;
mod shared_constants;
mod store;

// Re-export commonly used items
pub use channels::{ChannelOp, ChannelState};
pub use code::{Candidate, CodeWord, LINE_FLAG, SHIFT, TERMINAL_INDEX};
pub use controller::{Controller, Disposition, Feedback, Outcome};
pub use decoder::{Decoder, DecoderEvent, DecoderState, EdgeEvent, EdgeKind};
pub use error::{Error, Result};
pub use mode::Mode;
pub use nv::{NvCells, RamCells};
pub use shared_constants::*;
pub use store::{CodeStore, Match};

#[cfg(any(feature = "pico1", feature = "pico2"))]
pub use dispatcher::{Dispatcher, DispatcherStatic};
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub use indicator::Indicator;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub use nv_flash::{FlashCells, FlashCellsStatic};
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub use output_array::OutputArray;
#[cfg(any(feature = "pico1", feature = "pico2"))]
pub use receiver::{Receiver, ReceiverPins, ReceiverStatic, RemoteEvent};
