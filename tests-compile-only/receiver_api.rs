//! Compile-only verification for the receiver/dispatcher wiring.
//!
//! Run via: `cargo xtask check-all` (compiles this for thumbv6m-none-eabi)

#![cfg(not(feature = "host"))]
#![no_std]
#![no_main]
#![allow(dead_code, reason = "Compile-time verification only")]

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use panic_probe as _;
use remote_kit::{
    ChannelOp, ChannelState, Decoder, Dispatcher, FlashCells, Mode, OutputArray, Receiver,
    ReceiverPins, RemoteEvent, Result,
};

/// Verify the full device wiring.
async fn verify_receiver_wiring(p: embassy_rp::Peripherals, spawner: Spawner) -> Result<()> {
    static FLASH_STATIC: remote_kit::FlashCellsStatic = FlashCells::new_static();
    static DISPATCHER_STATIC: remote_kit::DispatcherStatic = Dispatcher::new_static();
    static RECEIVER_STATIC: remote_kit::ReceiverStatic = Receiver::new_static();

    let outputs = OutputArray::new([
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ]);
    let dispatcher = Dispatcher::new(outputs, &DISPATCHER_STATIC, spawner)?;

    let pins = ReceiverPins {
        line_a: Input::new(p.PIN_14, Pull::None),
        line_b: Input::new(p.PIN_15, Pull::None),
        learn_key: Input::new(p.PIN_16, Pull::Up),
        mode_key: Input::new(p.PIN_17, Pull::Up),
        indicator: Output::new(p.PIN_25, Level::Low),
    };
    let cells = FlashCells::new(&FLASH_STATIC, p.FLASH)?;
    let receiver = Receiver::new(pins, cells, &DISPATCHER_STATIC, &RECEIVER_STATIC, spawner)?;

    let _mask: u8 = dispatcher.mask();
    let _event: RemoteEvent = receiver.wait().await;
    Ok(())
}

/// Verify the pure core is reachable from firmware builds too.
fn verify_pure_core() {
    let _decoder = Decoder::new();
    let mut channels = ChannelState::new();
    channels.apply(ChannelOp::Direct(0b0101));
    channels.on_hold_expired(Mode::Instant);
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    // This main function exists only to satisfy the compiler.
    // The actual verification happens at compile time via the functions above.
}

#[cfg(not(any(target_arch = "arm", target_arch = "riscv32", target_arch = "riscv64")))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo<'_>) -> ! {
    loop {}
}
