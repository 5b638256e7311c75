#![no_std]
#![deny(missing_docs)]
//! # onewire-core
//! A no-std implementation of the 1-Wire protocol layer.
//!
//! This crate provides a trait-based interface for 1-Wire communication, allowing you to implement the protocol on various platforms.
//! The [OneWire] trait defines the operations a bus master has to provide (reset, bit read and write) and builds
//! byte transfers, ROM addressing and powered writes on top of them.
//!
//! The crate also provides the search algorithm for discovering devices on the 1-Wire bus in [OneWireSearch],
//! the 64-bit [RomId] and the CRC-8 / CRC-16 checksums used on the bus ([OneWireCrc], [OneWireCrc16]).

pub mod consts;
mod crc;
mod error;
mod rom;
mod search;
mod traits;
pub use crc::{OneWireCrc, OneWireCrc16, crc8_bitwise};
pub use error::OneWireError;
pub use rom::RomId;
pub use search::{OneWireDevices, OneWireSearch, OneWireSearchKind, SearchState};
pub use traits::{OneWire, OneWireStatus, PowerMode, PresenceResult};

/// Error type for 1-Wire operations.
pub type OneWireResult<T, E> = Result<T, OneWireError<E>>;
