//! Drivers for two SPI attached Analog Devices converters: the AD5628 octal
//! 12-bit DAC and the AD7193 4-channel sigma-delta ADC.
//!
//! Both drivers are built on the `embedded-hal` 1.0 [`SpiDevice`] trait, so
//! chip select handling and bus sharing belong to the device handed in by the
//! caller. The AD7193 additionally takes a [`DelayNs`] implementation for its
//! reset settle time and conversion polling.
//!
//! [`SpiDevice`]: embedded_hal::spi::SpiDevice
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![deny(unsafe_code, missing_docs)]
#![no_std]

pub mod ad5628;
pub mod ad7193;

pub use ad5628::Ad5628;
pub use ad7193::Ad7193;

/// Errors for this crate
#[derive(Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// SPI communication error
    Spi(E),
    /// Channel number outside the legal range of the device or input mode
    InvalidChannel,
    /// Clear code other than zero scale, midscale or full scale
    InvalidClearCode,
    /// Timed out waiting for a conversion to complete
    Timeout,
}
