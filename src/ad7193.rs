//! Driver for the AD7193 4-channel sigma-delta ADC.
//!
//! Register access goes through an 8 bit communications byte followed by a
//! 1 or 3 byte payload, all inside a single chip select assertion. The
//! device is left in continuous conversion mode; callers poll the status
//! register for finished conversions.
use bitfield_struct::bitfield;
use embedded_hal::delay::DelayNs;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::Error;

/// Mode register value written by [`Ad7193::initialize`]: continuous
/// conversion with the internal clock and default filter word.
const MODE_DEFAULT: u32 = 0x08_0060;
/// Configuration register value written by [`Ad7193::initialize`]: gain 1,
/// bipolar, channel 0.
const CONFIG_DEFAULT: u32 = 0x00_0117;
/// Settle time after a software reset
const RESET_SETTLE_MS: u32 = 10;
/// Interval between status polls in [`Ad7193::wait_for_data_ready`]
const POLL_INTERVAL_MS: u32 = 1;

/// On-chip register map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Status register when read, communications register when written (8 bit)
    Status = 0x00,
    /// Mode register (24 bit)
    Mode = 0x01,
    /// Configuration register (24 bit)
    Configuration = 0x02,
    /// Data register (24 bit)
    Data = 0x03,
    /// ID register (8 bit)
    Id = 0x04,
    /// GPOCON register (8 bit)
    Gpocon = 0x05,
    /// Offset register (24 bit)
    Offset = 0x06,
    /// Full-scale register (24 bit)
    FullScale = 0x07,
}

/// Pairing of the analog inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum InputMode {
    /// Each input measured against the common AINCOM pin, channels 1-8
    PseudoDifferential,
    /// Inputs measured in pairs, channels 1-4
    Differential,
}

/// Coding of the analog inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Polarity {
    /// Straight binary, 0 to +FS
    Unipolar,
    /// Offset binary, -FS to +FS
    Bipolar,
}

/// Settings of the programmable gain amplifier.
/// The discriminants are the 3 bit gain codes of the configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    /// Gain of 1
    X1 = 0b000,
    /// Gain of 8
    X8 = 0b011,
    /// Gain of 16
    X16 = 0b100,
    /// Gain of 32
    X32 = 0b101,
    /// Gain of 64
    X64 = 0b110,
    /// Gain of 128
    X128 = 0b111,
}

impl Gain {
    /// Look up the gain code for an amplifier multiplier, `None` if the
    /// hardware does not offer it.
    pub fn from_multiplier(multiplier: u16) -> Option<Self> {
        match multiplier {
            1 => Some(Self::X1),
            8 => Some(Self::X8),
            16 => Some(Self::X16),
            32 => Some(Self::X32),
            64 => Some(Self::X64),
            128 => Some(Self::X128),
            _ => None,
        }
    }

    /// The amplifier multiplier selected by this code
    pub fn multiplier(self) -> u16 {
        match self {
            Self::X1 => 1,
            Self::X8 => 8,
            Self::X16 => 16,
            Self::X32 => 32,
            Self::X64 => 64,
            Self::X128 => 128,
        }
    }
}

#[bitfield(u8)]
struct CommsByte {
    #[bits(2)]
    _zero: u8,
    #[bits(1)]
    _cread: bool,
    #[bits(3)]
    reg: u8,
    #[bits(1)]
    read: bool,
    #[bits(1)]
    _wen: bool,
}

#[bitfield(u8)]
struct StatusByte {
    #[bits(4)]
    channel: u8,
    #[bits(1)]
    _parity: bool,
    #[bits(1)]
    _noref: bool,
    #[bits(1)]
    _err: bool,
    #[bits(1)]
    not_ready: bool,
}

#[bitfield(u32)]
struct ConfigWord {
    #[bits(8)]
    channels: u8,
    #[bits(3)]
    gain: u8,
    #[bits(1)]
    _reserved: bool,
    #[bits(1)]
    unipolar: bool,
    #[bits(19)]
    _unused: u32,
}

/// AD7193 sigma-delta ADC SPI device
pub struct Ad7193<DEV, D> {
    spi: DEV,
    delay: D,
}

impl<DEV, D, E> Ad7193<DEV, D>
where
    DEV: SpiDevice<Error = E>,
    D: DelayNs,
{
    /// Create a new AD7193 driver from a SPI device and a delay provider
    pub fn new(spi: DEV, delay: D) -> Self {
        Self { spi, delay }
    }

    /// Release the contained SPI device and delay provider
    pub fn destroy(self) -> (DEV, D) {
        (self.spi, self.delay)
    }

    /// Reset the chip by clocking out 40 set bits, then wait for it to
    /// settle.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.spi.write(&[0xFF; 5]).map_err(Error::Spi)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        Ok(())
    }

    /// Write `payload` to `reg`, most significant byte first.
    pub fn write_register(&mut self, reg: Register, payload: &[u8]) -> Result<(), Error<E>> {
        let cmd = u8::from(CommsByte::new().with_reg(reg as u8));
        self.spi
            .transaction(&mut [Operation::Write(&[cmd]), Operation::Write(payload)])
            .map_err(Error::Spi)
    }

    /// Read `buf.len()` bytes from `reg` into `buf`, most significant byte
    /// first.
    pub fn read_register(&mut self, reg: Register, buf: &mut [u8]) -> Result<(), Error<E>> {
        let cmd = u8::from(CommsByte::new().with_read(true).with_reg(reg as u8));
        self.spi
            .transaction(&mut [Operation::Write(&[cmd]), Operation::Read(buf)])
            .map_err(Error::Spi)
    }

    /// Read the ID register to verify communication.
    pub fn read_device_id(&mut self) -> Result<u8, Error<E>> {
        let mut id = [0u8; 1];
        self.read_register(Register::Id, &mut id)?;
        Ok(id[0])
    }

    /// Put the chip into continuous conversion with the default gain,
    /// polarity and channel selection.
    pub fn initialize(&mut self) -> Result<(), Error<E>> {
        self.write_register(Register::Mode, &MODE_DEFAULT.to_be_bytes()[1..])?;
        self.write_register(Register::Configuration, &CONFIG_DEFAULT.to_be_bytes()[1..])
    }

    /// Program input pairing, polarity, active channels and gain in one go.
    ///
    /// Channels are numbered 1-8 in pseudo-differential mode and 1-4 in
    /// differential mode; any channel outside the active range fails with
    /// [`Error::InvalidChannel`] before anything is written.
    pub fn configure(
        &mut self,
        mode: InputMode,
        polarity: Polarity,
        channels: &[u8],
        gain: Gain,
    ) -> Result<(), Error<E>> {
        let max = match mode {
            InputMode::PseudoDifferential => 8,
            InputMode::Differential => 4,
        };
        let mut mask = 0u8;
        for &ch in channels {
            if !(1..=max).contains(&ch) {
                return Err(Error::InvalidChannel);
            }
            mask |= 1 << (ch - 1);
        }
        let cfg = ConfigWord::new()
            .with_channels(mask)
            .with_gain(gain as u8)
            .with_unipolar(polarity == Polarity::Unipolar);
        self.write_register(Register::Configuration, &u32::from(cfg).to_be_bytes()[1..])
    }

    /// Check the status register for a finished conversion.
    pub fn data_ready(&mut self) -> Result<bool, Error<E>> {
        Ok(!self.status()?.not_ready())
    }

    /// Poll the status register every millisecond until a conversion
    /// finishes or `timeout_ms` has elapsed.
    pub fn wait_for_data_ready(&mut self, timeout_ms: u32) -> Result<(), Error<E>> {
        let mut waited = 0;
        loop {
            if self.data_ready()? {
                return Ok(());
            }
            if waited >= timeout_ms {
                return Err(Error::Timeout);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS);
            waited += POLL_INTERVAL_MS;
        }
    }

    /// Channel of the conversion currently held in the data register.
    pub fn get_active_channel(&mut self) -> Result<u8, Error<E>> {
        Ok(self.status()?.channel())
    }

    /// Which channel bits are set in the configuration register, lowest
    /// channel first.
    pub fn get_active_channels(&mut self) -> Result<[bool; 8], Error<E>> {
        let cfg = self.read_configuration()?;
        let mut active = [false; 8];
        for (i, slot) in active.iter_mut().enumerate() {
            *slot = cfg.channels() & (1 << i) != 0;
        }
        Ok(active)
    }

    /// Input pairing decoded from the configuration register.
    pub fn get_mode(&mut self) -> Result<InputMode, Error<E>> {
        let cfg = self.read_configuration()?;
        // Bit 12 doubles as the pseudo-differential indicator in this
        // register image.
        if cfg.unipolar() {
            Ok(InputMode::PseudoDifferential)
        } else {
            Ok(InputMode::Differential)
        }
    }

    /// Read the most recent conversion result as a 24 bit big-endian value.
    pub fn read_data(&mut self) -> Result<u32, Error<E>> {
        let mut buf = [0u8; 3];
        self.read_register(Register::Data, &mut buf)?;
        Ok(u32::from_be_bytes([0, buf[0], buf[1], buf[2]]))
    }

    fn status(&mut self) -> Result<StatusByte, Error<E>> {
        let mut status = [0u8; 1];
        self.read_register(Register::Status, &mut status)?;
        Ok(StatusByte::from(status[0]))
    }

    fn read_configuration(&mut self) -> Result<ConfigWord, Error<E>> {
        let mut buf = [0u8; 3];
        self.read_register(Register::Configuration, &mut buf)?;
        Ok(ConfigWord::from(u32::from_be_bytes([
            0, buf[0], buf[1], buf[2],
        ])))
    }
}
