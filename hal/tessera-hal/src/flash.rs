//! Persistent storage abstractions
//!
//! Provides a key-value contract for calibration data that can be
//! implemented by chip-specific HALs using their flash memory. The storage
//! engine itself (wear leveling, sector management) is outside this crate;
//! consumers only see `load`/`save` on fixed keys.

/// Storage keys for calibration data
///
/// These keys identify the different blobs the control core persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Bed distortion grid (binary postcard format)
    DistortionGrid = 0,
    /// Heater PID gains and limits
    HeaterGains = 1,
    /// Leveling method state (plane coefficients, enabled flag)
    LevelingState = 2,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::DistortionGrid),
            1 => Some(StorageKey::HeaterGains),
            2 => Some(StorageKey::LevelingState),
            _ => None,
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
    /// Storage is full
    Full,
}

/// Key-value storage trait
///
/// Synchronous by design: persistence only ever runs from the cooperative
/// command context, never from the timer interrupt. Implementations should
/// handle wear leveling and data integrity below this interface.
pub trait KvStore {
    /// Read a value by key into the provided buffer
    ///
    /// Returns the number of bytes read.
    fn load(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError>;

    /// Write a value by key
    fn save(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool;
}
