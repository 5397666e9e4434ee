//! Four-channel learning receiver.
//!
//! Wiring: RF envelope on GP14/GP15, learn key on GP16, mode key on GP17
//! (both to ground, pulled up), channel relays on GP2..GP5, feedback LED on
//! GP25 (the Pico's onboard LED).

#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use panic_probe as _;
use remote_kit::{
    Dispatcher, FlashCells, OutputArray, Receiver, ReceiverPins, RemoteEvent,
};

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    info!("rx4 starting...");

    static FLASH_STATIC: remote_kit::FlashCellsStatic = FlashCells::new_static();
    static DISPATCHER_STATIC: remote_kit::DispatcherStatic = Dispatcher::new_static();
    static RECEIVER_STATIC: remote_kit::ReceiverStatic = Receiver::new_static();

    let outputs = OutputArray::new([
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        Output::new(p.PIN_5, Level::Low),
    ]);
    let dispatcher = Dispatcher::new(outputs, &DISPATCHER_STATIC, spawner)
        .expect("Failed to start dispatcher");

    let pins = ReceiverPins {
        line_a: Input::new(p.PIN_14, Pull::None),
        line_b: Input::new(p.PIN_15, Pull::None),
        learn_key: Input::new(p.PIN_16, Pull::Up),
        mode_key: Input::new(p.PIN_17, Pull::Up),
        indicator: Output::new(p.PIN_25, Level::Low),
    };
    let cells = FlashCells::new(&FLASH_STATIC, p.FLASH).expect("Failed to load flash cells");
    let receiver = Receiver::new(pins, cells, &DISPATCHER_STATIC, &RECEIVER_STATIC, spawner)
        .expect("Failed to start receiver");

    info!("rx4 ready");

    loop {
        match receiver.wait().await {
            RemoteEvent::Matched { data } => {
                info!("match: data=0x{:X}, channels=0b{:04b}", data, dispatcher.mask());
            }
            RemoteEvent::Stored => info!("new transmitter stored"),
            RemoteEvent::AlreadyLearned => info!("transmitter already known"),
            RemoteEvent::StoreFull => info!("table full, overwriting from the start"),
            RemoteEvent::ModeChanged(mode) => info!("mode -> {}", mode.bits()),
            RemoteEvent::Removed => info!("last entry removed"),
            RemoteEvent::Erased => info!("all entries erased"),
        }
    }
}
