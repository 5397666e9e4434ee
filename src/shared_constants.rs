use embassy_time::Duration;

/// Number of output channels (one bit each in the channel mask).
pub const CHANNEL_COUNT: usize = 4;

/// Bytes per stored code entry: id low, id mid, data nibble, timing low, timing high.
pub const ENTRY_BYTES: u8 = 5;
/// Cells 0x00..0x78 hold up to 24 entries.
pub const STORE_CAPACITY_BYTES: u8 = 0x78;
/// Cell holding the write cursor.
pub const CURSOR_ADDR: u8 = 0x7E;
/// Cell holding the operating mode.
pub const MODE_ADDR: u8 = 0x7F;
/// Total addressable nonvolatile cells.
pub const NV_CELLS: usize = 128;

/// Receiver-clock drift allowance between learn-time and use-time
/// preamble measurements, in timer ticks.
pub const TIMING_TOLERANCE: u8 = 1;

/// Timer ticks are 2 µs (the reference 500 kHz capture clock).
pub const TICK_MICROS: u64 = 2;
/// One 16-bit counter overflow with no edge resets the decoder.
pub const IDLE_TIMEOUT: Duration = Duration::from_micros(65536 * TICK_MICROS);

pub const BLINK_ON_DELAY: Duration = Duration::from_millis(200);
pub const BLINK_OFF_DELAY: Duration = Duration::from_millis(200);

/// All-off settle before switching the active channel in mode 0.
pub const CHANNEL_SETTLE_DELAY: Duration = Duration::from_secs(2);
/// How long a toggled channel is held before the mask auto-clears.
pub const CHANNEL_HOLD_DELAY: Duration = Duration::from_secs(20);
/// Instant modes clear the mask (and flip direction) after this.
pub const INSTANT_CLEAR_DELAY: Duration = Duration::from_millis(100);

/// Mode-key press shorter than this cycles the mode; longer arms erase.
pub const ERASE_CONFIRM_DELAY: Duration = Duration::from_millis(2500);
/// Second confirmation window while the erase arm signal is shown.
pub const ERASE_ARM_DELAY: Duration = Duration::from_millis(2500);
