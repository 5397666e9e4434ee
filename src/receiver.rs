//! A device abstraction for the fixed-code RF receiver.
//!
//! One task owns everything the reference design ran in its single interrupt
//! context: the edge decoder, the code table, the learn/match policy, and the
//! mode/erase flow. Radio edges, the mode key, and the idle timeout are
//! multiplexed with `select`, so decode, learn, and erase can never race each
//! other - and feedback blinks complete before the next radio edge is
//! examined, exactly the ordering the learn throttling relies on.

use defmt::info;
use embassy_executor::Spawner;
use embassy_futures::select::{Either3, select, select3};
use embassy_rp::gpio::{Input, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel as EmbassyChannel;
use embassy_time::{Instant, Timer};

use crate::controller::{Controller, Disposition, Feedback};
use crate::decoder::{Decoder, DecoderEvent, EdgeEvent, EdgeKind};
use crate::dispatcher::DispatcherStatic;
use crate::indicator::Indicator;
use crate::nv_flash::FlashCells;
use crate::shared_constants::{ERASE_ARM_DELAY, ERASE_CONFIRM_DELAY, IDLE_TIMEOUT, TICK_MICROS};
use crate::store::CodeStore;
use crate::channels::ChannelOp;
use crate::{Mode, Result};

// ===== Public API ===========================================================

/// Events published by the receiver for the application.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RemoteEvent {
    /// A learned transmitter matched; `data` is its channel nibble.
    Matched { data: u8 },
    /// A new transmitter was stored.
    Stored,
    /// The presented transmitter was already in the table.
    AlreadyLearned,
    /// The table was full; the cursor wrapped for overwrite.
    StoreFull,
    /// A short mode-key press selected a new mode.
    ModeChanged(Mode),
    /// The most recently learned entry was removed.
    Removed,
    /// The whole table was erased.
    Erased,
}

/// Static type for the `Receiver` device abstraction.
pub type ReceiverStatic = EmbassyChannel<CriticalSectionRawMutex, RemoteEvent, 8>;

/// The receiver's inputs and indicator output.
///
/// Both keys are active low; construct them with `Pull::Up`. The two RF lines
/// carry the demodulated envelope from the radio front-end.
pub struct ReceiverPins {
    pub line_a: Input<'static>,
    pub line_b: Input<'static>,
    pub learn_key: Input<'static>,
    pub mode_key: Input<'static>,
    pub indicator: Output<'static>,
}

/// A device abstraction for a learning fixed-code RF receiver.
///
/// # Examples
/// ```no_run
/// # #![no_std]
/// # #![no_main]
/// # use panic_probe as _;
/// # use defmt::info;
/// # use embassy_executor::Spawner;
/// # use embassy_rp::gpio::{Input, Level, Output, Pull};
/// # use remote_kit::{
/// #     Dispatcher, FlashCells, OutputArray, Receiver, ReceiverPins, RemoteEvent,
/// # };
/// # async fn example(p: embassy_rp::Peripherals, spawner: Spawner) -> remote_kit::Result<()> {
/// static FLASH_STATIC: remote_kit::FlashCellsStatic = FlashCells::new_static();
/// static DISPATCHER_STATIC: remote_kit::DispatcherStatic = Dispatcher::new_static();
/// static RECEIVER_STATIC: remote_kit::ReceiverStatic = Receiver::new_static();
///
/// let outputs = OutputArray::new([
///     Output::new(p.PIN_2, Level::Low),
///     Output::new(p.PIN_3, Level::Low),
///     Output::new(p.PIN_4, Level::Low),
///     Output::new(p.PIN_5, Level::Low),
/// ]);
/// let _dispatcher = Dispatcher::new(outputs, &DISPATCHER_STATIC, spawner)?;
///
/// let pins = ReceiverPins {
///     line_a: Input::new(p.PIN_14, Pull::None),
///     line_b: Input::new(p.PIN_15, Pull::None),
///     learn_key: Input::new(p.PIN_16, Pull::Up),
///     mode_key: Input::new(p.PIN_17, Pull::Up),
///     indicator: Output::new(p.PIN_25, Level::Low),
/// };
/// let cells = FlashCells::new(&FLASH_STATIC, p.FLASH)?;
/// let receiver = Receiver::new(pins, cells, &DISPATCHER_STATIC, &RECEIVER_STATIC, spawner)?;
///
/// loop {
///     match receiver.wait().await {
///         RemoteEvent::Matched { data } => info!("matched, data=0x{:X}", data),
///         _ => {}
///     }
/// }
/// # }
/// ```
pub struct Receiver<'a> {
    events: &'a ReceiverStatic,
}

impl Receiver<'_> {
    /// Create static event-channel resources for the receiver.
    #[must_use]
    pub const fn new_static() -> ReceiverStatic {
        EmbassyChannel::new()
    }

    /// Load the code table from the cells and start the receiver task.
    ///
    /// # Errors
    ///
    /// Returns an error if the background task cannot be spawned.
    pub fn new(
        pins: ReceiverPins,
        cells: FlashCells,
        dispatcher: &'static DispatcherStatic,
        events: &'static ReceiverStatic,
        spawner: Spawner,
    ) -> Result<Self> {
        let store = CodeStore::new(cells);
        spawner.spawn(receiver_task(pins, store, dispatcher, events))?;
        Ok(Self { events })
    }

    /// Wait for the next receiver event. Events must be consumed; the
    /// receiver task pauses when the event channel is full.
    pub async fn wait(&self) -> RemoteEvent {
        self.events.receive().await
    }
}

// ===== The task =============================================================

#[embassy_executor::task]
async fn receiver_task(
    mut pins: ReceiverPins,
    mut store: CodeStore<FlashCells>,
    dispatcher: &'static DispatcherStatic,
    events: &'static ReceiverStatic,
) -> ! {
    let mut decoder = Decoder::new();
    let mut controller = Controller::new();
    let mut indicator = Indicator::new(pins.indicator);
    let mut mode = store.mode();
    let mut last_edge = Instant::now();

    info!(
        "Receiver task started: mode={}, {} learned entries",
        mode.bits(),
        store.len()
    );

    loop {
        // Bind the selection result so the pin borrows are released before
        // the arms sample and re-borrow the pins.
        let selected = {
            let radio_edge = select(
                pins.line_a.wait_for_any_edge(),
                pins.line_b.wait_for_any_edge(),
            );
            select3(
                radio_edge,
                pins.mode_key.wait_for_falling_edge(),
                Timer::after(IDLE_TIMEOUT),
            )
            .await
        };
        match selected {
            Either3::First(_) => {
                let now = Instant::now();
                let ticks = ticks_between(last_edge, now);
                last_edge = now;

                let line_a = pins.line_a.is_high();
                let kind = if line_a || pins.line_b.is_high() {
                    EdgeKind::Rising
                } else {
                    EdgeKind::Falling
                };

                match decoder.on_edge(EdgeEvent { kind, ticks, line_a }) {
                    Some(DecoderEvent::Completed(candidate)) => {
                        let learn_held = pins.learn_key.is_low();
                        let outcome =
                            controller.on_completed(&mut store, &candidate, learn_held, mode);

                        match outcome.disposition {
                            Disposition::Advance => decoder.advance_to_tail(),
                            Disposition::Reset => decoder.reset(),
                            Disposition::Hold => {}
                        }

                        if let Some(op) = outcome.channel {
                            info!(
                                "Receiver: match id={:02X}{:02X} data=0x{:X}",
                                candidate.word.id_mid,
                                candidate.word.id_low,
                                candidate.word.data_nibble()
                            );
                            dispatcher.send(op, mode).await;
                            // The instant-mode tail fires on this same closing
                            // edge, right after the match dispatch.
                            if let Some(tail_op) = controller.on_tail(mode) {
                                dispatcher.send(tail_op, mode).await;
                            }
                            events
                                .send(RemoteEvent::Matched {
                                    data: candidate.word.data_nibble(),
                                })
                                .await;
                        }

                        if let Some(feedback) = outcome.feedback {
                            events.send(event_for(feedback)).await;
                            // Blocking feedback; radio edges during the blink
                            // are deliberately not examined.
                            indicator.blink(feedback.blinks()).await;
                            last_edge = Instant::now();
                        }
                    }
                    Some(DecoderEvent::TailTick) => {
                        if let Some(op) = controller.on_tail(mode) {
                            dispatcher.send(op, mode).await;
                        }
                    }
                    None => {}
                }
            }
            Either3::Second(()) => {
                mode = mode_key_flow(
                    &mut pins.mode_key,
                    &mut store,
                    &mut indicator,
                    dispatcher,
                    events,
                    mode,
                )
                .await;
                decoder.reset();
                last_edge = Instant::now();
            }
            Either3::Third(()) => {
                // Stuck line or silence: never sit in a partial word forever.
                decoder.reset();
                last_edge = Instant::now();
            }
        }
    }
}

/// The mode/erase flow. Owns the task for its whole duration, so the radio
/// path is naturally suppressed while it runs.
async fn mode_key_flow(
    mode_key: &mut Input<'static>,
    store: &mut CodeStore<FlashCells>,
    indicator: &mut Indicator,
    dispatcher: &'static DispatcherStatic,
    events: &'static ReceiverStatic,
    mode: Mode,
) -> Mode {
    dispatcher.send(ChannelOp::AllOff, mode).await;
    Timer::after(ERASE_CONFIRM_DELAY).await;

    if mode_key.is_high() {
        // Short press: cycle the operating mode and blink its new value.
        let next_mode = mode.next();
        store.set_mode(next_mode);
        info!("Receiver: mode -> {}", next_mode.bits());
        events.send(RemoteEvent::ModeChanged(next_mode)).await;
        indicator.blink(next_mode.bits()).await;
        return next_mode;
    }

    // Long press: arm the erase and confirm once more.
    indicator.set(true);
    Timer::after(ERASE_ARM_DELAY).await;
    indicator.set(false);

    let feedback = if mode_key.is_low() && !store.is_empty() {
        store.erase_tail(1);
        info!("Receiver: removed last entry, {} remain", store.len());
        Feedback::Removed
    } else {
        store.erase_all();
        info!("Receiver: erased all entries");
        Feedback::Erased
    };
    events.send(event_for(feedback)).await;
    indicator.blink(feedback.blinks()).await;
    mode
}

const fn event_for(feedback: Feedback) -> RemoteEvent {
    match feedback {
        Feedback::Stored => RemoteEvent::Stored,
        Feedback::AlreadyLearned => RemoteEvent::AlreadyLearned,
        Feedback::StoreFull => RemoteEvent::StoreFull,
        Feedback::Removed => RemoteEvent::Removed,
        Feedback::Erased => RemoteEvent::Erased,
    }
}

/// Elapsed timer ticks between two edges, saturating at the counter width.
fn ticks_between(from: Instant, to: Instant) -> u16 {
    let micros = to.duration_since(from).as_micros() / TICK_MICROS;
    micros.min(u64::from(u16::MAX)) as u16
}
