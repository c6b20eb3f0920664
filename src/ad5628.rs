//! Driver for the AD5628 octal 12-bit DAC.
//!
//! Every operation is a single 4 byte write of a 32 bit command word; the
//! device has no readback path.
use bitfield_struct::bitfield;
use embedded_hal::spi::SpiDevice;

use crate::Error;

/// Number of DAC channels
pub const MAX_CHANNELS: u8 = 8;
/// Channel address targeting every DAC channel at once
pub const ALL_CHANNELS: u8 = 0x0F;

/// DAC channel A
pub const CHANNEL_A: u8 = 0x00;
/// DAC channel B
pub const CHANNEL_B: u8 = 0x01;
/// DAC channel C
pub const CHANNEL_C: u8 = 0x02;
/// DAC channel D
pub const CHANNEL_D: u8 = 0x03;
/// DAC channel E
pub const CHANNEL_E: u8 = 0x04;
/// DAC channel F
pub const CHANNEL_F: u8 = 0x05;
/// DAC channel G
pub const CHANNEL_G: u8 = 0x06;
/// DAC channel H
pub const CHANNEL_H: u8 = 0x07;

/// Clear code selecting zero scale output
pub const CLEAR_ZERO: u32 = 0x00000;
/// Clear code selecting midscale output
pub const CLEAR_MIDSCALE: u32 = 0x80000;
/// Clear code selecting full scale output
pub const CLEAR_FULLSCALE: u32 = 0xFFFFF;

const DATA_FIELD_MASK: u32 = 0xF_FFFF;

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
enum Command {
    WriteInputRegister = 0x00,
    UpdateDacRegister = 0x01,
    WriteInputUpdateAll = 0x02,
    WriteUpdateDacChannel = 0x03,
    PowerDown = 0x04,
    LoadClearCode = 0x05,
    LoadLdac = 0x06,
    Reset = 0x07,
    InternalReference = 0x08,
}

/// Output impedance of a channel while it is powered down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// Normal operation
    Normal = 0b00,
    /// Powered down, output pulled to GND through 1k
    PowerDown1k = 0b01,
    /// Powered down, output pulled to GND through 100k
    PowerDown100k = 0b10,
    /// Powered down, output in three-state
    ThreeState = 0b11,
}

#[bitfield(u32)]
struct CommandWord {
    #[bits(20)]
    data: u32,
    #[bits(4)]
    address: u8,
    #[bits(4)]
    command: u8,
    #[bits(4)]
    _unused: u8,
}

/// AD5628 octal DAC SPI device
pub struct Ad5628<DEV> {
    spi: DEV,
}

impl<DEV, E> Ad5628<DEV>
where
    DEV: SpiDevice<Error = E>,
{
    /// Create a new AD5628 driver from a SPI device
    pub fn new(spi: DEV) -> Self {
        Self { spi }
    }

    /// Release the contained SPI device
    pub fn destroy(self) -> DEV {
        self.spi
    }

    fn send(&mut self, word: CommandWord) -> Result<(), Error<E>> {
        self.spi
            .write(&u32::from(word).to_be_bytes())
            .map_err(Error::Spi)
    }

    fn check_channel(channel: u8) -> Result<(), Error<E>> {
        if channel < MAX_CHANNELS || channel == ALL_CHANNELS {
            Ok(())
        } else {
            Err(Error::InvalidChannel)
        }
    }

    /// Write `data` to the input register of `channel` without updating the
    /// output.
    ///
    /// The full 20 bit data field is sent as supplied (masked to 20 bits);
    /// the 12 bit AD5628 expects the value left-aligned at bit 8.
    pub fn write_input_register(&mut self, channel: u8, data: u32) -> Result<(), Error<E>> {
        Self::check_channel(channel)?;
        self.send(
            CommandWord::new()
                .with_command(Command::WriteInputRegister as u8)
                .with_address(channel)
                .with_data(data & DATA_FIELD_MASK),
        )
    }

    /// Update the DAC register of `channel` with a 12 bit value.
    ///
    /// The value is shifted into the upper bits of the 20 bit data field;
    /// anything wider than 12 bits is silently truncated.
    pub fn update_dac(&mut self, channel: u8, value: u16) -> Result<(), Error<E>> {
        Self::check_channel(channel)?;
        self.send(
            CommandWord::new()
                .with_command(Command::UpdateDacRegister as u8)
                .with_address(channel)
                .with_data(Self::align(value)),
        )
    }

    /// Write a 12 bit value to the input register of `channel` and update all
    /// DAC registers (software LDAC).
    pub fn write_input_update_all(&mut self, channel: u8, value: u16) -> Result<(), Error<E>> {
        Self::check_channel(channel)?;
        self.send(
            CommandWord::new()
                .with_command(Command::WriteInputUpdateAll as u8)
                .with_address(channel)
                .with_data(Self::align(value)),
        )
    }

    /// Write a 12 bit value to `channel` and update its output in one
    /// operation.
    pub fn write_and_update_dac(&mut self, channel: u8, value: u16) -> Result<(), Error<E>> {
        Self::check_channel(channel)?;
        self.send(
            CommandWord::new()
                .with_command(Command::WriteUpdateDacChannel as u8)
                .with_address(channel)
                .with_data(Self::align(value)),
        )
    }

    /// Power the channels selected in the `channels` bitmask (bit 0 is
    /// channel A) down into `mode`, or back up with [`PowerMode::Normal`].
    pub fn power_down(&mut self, mode: PowerMode, channels: u8) -> Result<(), Error<E>> {
        self.send(
            CommandWord::new()
                .with_command(Command::PowerDown as u8)
                .with_data(((mode as u32) << 8) | channels as u32),
        )
    }

    /// Load the clear code register.
    ///
    /// `code` must be [`CLEAR_ZERO`], [`CLEAR_MIDSCALE`] or
    /// [`CLEAR_FULLSCALE`].
    pub fn load_clear_code(&mut self, code: u32) -> Result<(), Error<E>> {
        match code {
            CLEAR_ZERO | CLEAR_MIDSCALE | CLEAR_FULLSCALE => {}
            _ => return Err(Error::InvalidClearCode),
        }
        self.send(
            CommandWord::new()
                .with_command(Command::LoadClearCode as u8)
                .with_data(code),
        )
    }

    /// Load the LDAC register with the mask bit for `channel`.
    pub fn load_ldac(&mut self, channel: u8) -> Result<(), Error<E>> {
        Self::check_channel(channel)?;
        let mask = (1u32 << channel) & 0xFF;
        self.send(
            CommandWord::new()
                .with_command(Command::LoadLdac as u8)
                .with_data(mask << 8),
        )
    }

    /// Reset the DAC to its power-on defaults.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.send(CommandWord::new().with_command(Command::Reset as u8))
    }

    /// Switch the internal reference on or off.
    pub fn set_internal_reference(&mut self, on: bool) -> Result<(), Error<E>> {
        self.send(
            CommandWord::new()
                .with_command(Command::InternalReference as u8)
                .with_data((on as u32) << 8),
        )
    }

    fn align(value: u16) -> u32 {
        ((value as u32) << 8) & DATA_FIELD_MASK
    }
}
