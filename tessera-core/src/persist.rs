//! Persistence helpers
//!
//! Calibration data (distortion grid, PID gains, leveling state) is stored
//! through the [`KvStore`] contract as postcard-serialized snapshots. Each
//! snapshot type carries a magic number, a format version, and a CRC32 so
//! stale or corrupted flash contents are rejected on load instead of
//! silently mis-calibrating the machine.

use serde::{de::DeserializeOwned, Serialize};
use tessera_hal::{FlashError, KvStore, StorageKey};

/// Snapshot validation contract
///
/// Implemented by every persisted type. `verify` must check magic, version
/// and checksum; `seal` recomputes the checksum before writing.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// Recompute integrity fields before serialization
    fn seal(&mut self);

    /// Validate magic, version and checksum after deserialization
    fn verify(&self) -> bool;
}

/// Serialize a snapshot and write it under `key`
pub fn save_snapshot<T: Snapshot, K: KvStore>(
    store: &mut K,
    key: StorageKey,
    value: &mut T,
    buffer: &mut [u8],
) -> Result<(), FlashError> {
    value.seal();
    let used = postcard::to_slice(value, buffer)
        .map_err(|_| FlashError::BufferTooSmall)?
        .len();
    store.save(key, &buffer[..used])
}

/// Load and validate a snapshot from `key`
///
/// Returns `Corrupted` when the bytes deserialize but fail verification.
pub fn load_snapshot<T: Snapshot, K: KvStore>(
    store: &mut K,
    key: StorageKey,
    buffer: &mut [u8],
) -> Result<T, FlashError> {
    let len = store.load(key, buffer)?;
    let value: T = postcard::from_bytes(&buffer[..len]).map_err(|_| FlashError::Corrupted)?;
    if !value.verify() {
        return Err(FlashError::Corrupted);
    }
    Ok(value)
}

/// Incremental CRC32 (IEEE 802.3 polynomial)
#[derive(Debug, Clone)]
pub struct Crc32(u32);

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32 {
    const POLY: u32 = 0xEDB88320;

    /// Start a new checksum
    pub const fn new() -> Self {
        Self(0xFFFFFFFF)
    }

    /// Feed bytes into the checksum
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.0 ^= byte as u32;
            for _ in 0..8 {
                if self.0 & 1 != 0 {
                    self.0 = (self.0 >> 1) ^ Self::POLY;
                } else {
                    self.0 >>= 1;
                }
            }
        }
    }

    /// Feed an `f32` in little-endian byte order
    pub fn update_f32(&mut self, value: f32) {
        self.update(&value.to_le_bytes());
    }

    /// Finish and return the checksum
    pub fn finalize(self) -> u32 {
        !self.0
    }
}

/// In-memory key-value store for tests and host-side tooling
#[cfg(any(test, feature = "mock-store"))]
pub mod mock {
    use super::*;
    use heapless::Vec;

    const SLOT_SIZE: usize = 512;

    /// KvStore backed by fixed-size RAM slots, one per key
    #[derive(Default)]
    pub struct MemStore {
        slots: [Option<Vec<u8, SLOT_SIZE>>; 3],
    }

    impl MemStore {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl KvStore for MemStore {
        fn load(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            let slot = self.slots[key.as_u8() as usize]
                .as_ref()
                .ok_or(FlashError::NotFound)?;
            if buffer.len() < slot.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..slot.len()].copy_from_slice(slot);
            Ok(slot.len())
        }

        fn save(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            let mut slot = Vec::new();
            slot.extend_from_slice(data).map_err(|_| FlashError::Full)?;
            self.slots[key.as_u8() as usize] = Some(slot);
            Ok(())
        }

        fn exists(&mut self, key: StorageKey) -> bool {
            self.slots[key.as_u8() as usize].is_some()
        }
    }
}
