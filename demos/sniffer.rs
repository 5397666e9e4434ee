//! Code sniffer: runs the bare edge decoder on one RF line and logs every
//! completed word. Handy for checking antenna placement and transmitter
//! timing before wiring up the full receiver.

#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::{Input, Pull};
use embassy_time::{Instant, Timer};
use panic_probe as _;
use remote_kit::{Decoder, DecoderEvent, EdgeEvent, EdgeKind, IDLE_TIMEOUT, TICK_MICROS};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    let p = embassy_rp::init(Default::default());

    info!("sniffer starting on GP14...");

    let mut line = Input::new(p.PIN_14, Pull::None);
    let mut decoder = Decoder::new();
    let mut last_edge = Instant::now();

    loop {
        let selected = select(line.wait_for_any_edge(), Timer::after(IDLE_TIMEOUT)).await;
        let now = Instant::now();
        if let Either::Second(()) = selected {
            decoder.reset();
            last_edge = now;
            continue;
        }

        let ticks = (now.duration_since(last_edge).as_micros() / TICK_MICROS)
            .min(u64::from(u16::MAX)) as u16;
        last_edge = now;

        let kind = if line.is_high() {
            EdgeKind::Rising
        } else {
            EdgeKind::Falling
        };
        let event = decoder.on_edge(EdgeEvent {
            kind,
            ticks,
            line_a: true,
        });
        if let Some(DecoderEvent::Completed(candidate)) = event {
            info!(
                "code: id={:02X}{:02X} data={:02X} t={:02X}{:02X}",
                candidate.word.id_mid,
                candidate.word.id_low,
                candidate.word.data,
                candidate.t_high,
                candidate.t_low
            );
            decoder.reset();
        }
    }
}
