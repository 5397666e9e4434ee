//! Flash-backed nonvolatile cells.
//!
//! The Pico has no EEPROM, so the 128-cell byte store lives as an image inside
//! the last 4 KB flash sector, cached in RAM and rewritten on every cell
//! write. The sector layout follows the usual block format:
//!
//! - Magic number (4 bytes): `0x524B_4E56` ('RKNV')
//! - Payload length (2 bytes)
//! - Payload: postcard-serialized cell image
//! - CRC32 (4 bytes) of everything before it
//!
//! A missing or corrupt image loads as all-zero cells, the same as a factory
//! part; writes are assumed to succeed (a power loss mid-write can lose the
//! sector, which the next load treats as empty).

use crc32fast::Hasher;
use defmt::{error, info};
use embassy_rp::Peri;
use embassy_rp::flash::{Blocking, ERASE_SIZE, Flash as EmbassyFlash};
use embassy_rp::peripherals::FLASH;
use heapless::Vec;
use serde::{Deserialize, Serialize};
use static_cell::StaticCell;

use crate::nv::NvCells;
use crate::shared_constants::NV_CELLS;
use crate::{Error, Result};

/// Internal flash size for Raspberry Pi Pico 2 (4 MB).
#[cfg(feature = "pico2")]
const INTERNAL_FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Internal flash size for Raspberry Pi Pico 1 (2 MB).
#[cfg(not(feature = "pico2"))]
const INTERNAL_FLASH_SIZE: usize = 2 * 1024 * 1024;

const MAGIC: u32 = 0x524B_4E56; // 'RKNV'
const HEADER_SIZE: usize = 4 + 2; // Magic + PayloadLen
const CRC_SIZE: usize = 4;
const MAX_PAYLOAD_SIZE: usize = ERASE_SIZE - HEADER_SIZE - CRC_SIZE;

/// The cell image as persisted.
#[derive(Serialize, Deserialize)]
struct Image {
    cells: Vec<u8, NV_CELLS>,
}

/// Static type for the flash-backed cell store.
pub struct FlashCellsStatic {
    flash_cell: StaticCell<EmbassyFlash<'static, FLASH, Blocking, INTERNAL_FLASH_SIZE>>,
}

/// Byte-addressable cells persisted in the last internal flash sector.
pub struct FlashCells {
    flash: &'static mut EmbassyFlash<'static, FLASH, Blocking, INTERNAL_FLASH_SIZE>,
    image: [u8; NV_CELLS],
}

impl FlashCells {
    /// Create static resources for the flash cells.
    #[must_use]
    pub const fn new_static() -> FlashCellsStatic {
        FlashCellsStatic {
            flash_cell: StaticCell::new(),
        }
    }

    /// Take the FLASH peripheral and load the persisted image.
    ///
    /// # Errors
    ///
    /// Returns `Error::Flash` if the sector cannot be read. A readable but
    /// invalid image is not an error; it loads as all-zero cells.
    pub fn new(
        statics: &'static FlashCellsStatic,
        peripheral: Peri<'static, FLASH>,
    ) -> Result<Self> {
        let flash = statics
            .flash_cell
            .init(EmbassyFlash::new_blocking(peripheral));
        let image = load_image(flash)?;
        Ok(Self { flash, image })
    }

    fn persist(&mut self) -> Result<()> {
        let image = Image {
            cells: Vec::from_slice(&self.image).map_err(|()| Error::FormatError)?,
        };
        let mut payload_buffer = [0u8; MAX_PAYLOAD_SIZE];
        let payload_len = postcard::to_slice(&image, &mut payload_buffer)
            .map_err(|_| Error::FormatError)?
            .len();

        let mut buffer = [0xFFu8; ERASE_SIZE];
        buffer[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        buffer[4..HEADER_SIZE].copy_from_slice(&(payload_len as u16).to_le_bytes());
        buffer[HEADER_SIZE..HEADER_SIZE + payload_len]
            .copy_from_slice(&payload_buffer[..payload_len]);

        let crc_offset = HEADER_SIZE + payload_len;
        let crc = compute_crc(&buffer[0..crc_offset]);
        buffer[crc_offset..crc_offset + CRC_SIZE].copy_from_slice(&crc.to_le_bytes());

        let offset = sector_offset();
        self.flash
            .blocking_erase(offset, offset + ERASE_SIZE as u32)
            .map_err(Error::Flash)?;
        self.flash
            .blocking_write(offset, &buffer)
            .map_err(Error::Flash)?;
        Ok(())
    }
}

impl NvCells for FlashCells {
    fn read(&self, addr: u8) -> u8 {
        self.image.get(addr as usize).copied().unwrap_or(0)
    }

    fn write(&mut self, addr: u8, value: u8) {
        let Some(cell) = self.image.get_mut(addr as usize) else {
            return;
        };
        if *cell == value {
            // Unchanged cells skip the sector rewrite.
            return;
        }
        *cell = value;
        if self.persist().is_err() {
            // There is no recovery path for a failed persist; the live image
            // stays usable and the next successful write rewrites everything.
            error!("FlashCells: persist failed, cell 0x{:02X} not durable", addr);
        }
    }
}

fn load_image(
    flash: &mut EmbassyFlash<'static, FLASH, Blocking, INTERNAL_FLASH_SIZE>,
) -> Result<[u8; NV_CELLS]> {
    let mut buffer = [0u8; ERASE_SIZE];
    flash
        .blocking_read(sector_offset(), &mut buffer)
        .map_err(Error::Flash)?;

    let magic = u32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
    if magic != MAGIC {
        info!("FlashCells: no image, starting from zeroed cells");
        return Ok([0; NV_CELLS]);
    }

    let payload_len = u16::from_le_bytes([buffer[4], buffer[5]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE {
        error!("FlashCells: invalid payload length {}", payload_len);
        return Ok([0; NV_CELLS]);
    }

    let crc_offset = HEADER_SIZE + payload_len;
    let stored_crc = u32::from_le_bytes([
        buffer[crc_offset],
        buffer[crc_offset + 1],
        buffer[crc_offset + 2],
        buffer[crc_offset + 3],
    ]);
    if stored_crc != compute_crc(&buffer[0..crc_offset]) {
        error!("FlashCells: CRC mismatch, starting from zeroed cells");
        return Ok([0; NV_CELLS]);
    }

    let payload = &buffer[HEADER_SIZE..crc_offset];
    let Ok(image) = postcard::from_bytes::<Image>(payload) else {
        error!("FlashCells: deserialization failed, starting from zeroed cells");
        return Ok([0; NV_CELLS]);
    };

    let mut cells = [0; NV_CELLS];
    let len = image.cells.len().min(NV_CELLS);
    cells[..len].copy_from_slice(&image.cells[..len]);
    info!("FlashCells: loaded persisted image");
    Ok(cells)
}

/// The image lives in the last erase sector of internal flash.
fn sector_offset() -> u32 {
    INTERNAL_FLASH_SIZE as u32 - ERASE_SIZE as u32
}

/// Compute CRC32 checksum.
fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
