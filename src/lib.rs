#![doc = include_str ! ("../README.md")]
#![cfg_attr(not(target_arch = "x86_64"), no_std)]

pub mod error;
pub mod platform;
mod raw;

use crate::error::Error;
use crate::platform::Eeprom;
use crate::raw::{FILL_BYTE, FILL_CHUNK, Marker};
use core::fmt::Debug;
#[cfg(feature = "defmt")]
use defmt::{trace, warn};

/// Logical identifier of a record type.
///
/// Callers define a closed enum and register each variant once at startup:
///
/// ```
/// #[derive(Copy, Clone, PartialEq, Eq, Debug)]
/// enum Record {
///     BootFlags,
///     Calibration,
/// }
/// ```
///
/// The registry capacity is the store's const generic `N`, so "too many record types" is caught
/// at the registration call site instead of through a reserved sentinel variant.
pub trait RecordId: Copy + Eq + Debug {}

impl<T: Copy + Eq + Debug> RecordId for T {}

/// One registered record type. Lives in RAM only and is rebuilt from the registration sequence
/// at every startup; addresses are positional, not persisted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct SlotDescriptor<I> {
    id: I,
    /// Payload capacity in bytes, excluding the marker byte. Immutable after registration.
    max_size: u16,
    /// Address of the marker byte.
    start_addr: u32,
    /// Last byte of the slot (`start_addr + max_size`), inclusive.
    end_addr: u32,
    /// Length of the most recent payload, 0 if never written or erased.
    data_len: u16,
    enabled: bool,
    modified: bool,
}

/// Read-only snapshot of one slot, returned by [`SlotStore::slot_info`] and
/// [`SlotStore::slots`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotInfo {
    pub start_addr: u32,
    pub end_addr: u32,
    pub max_size: u16,
    pub data_len: u16,
    pub enabled: bool,
    pub modified: bool,
}

impl<I> From<&SlotDescriptor<I>> for SlotInfo {
    fn from(slot: &SlotDescriptor<I>) -> Self {
        Self {
            start_addr: slot.start_addr,
            end_addr: slot.end_addr,
            max_size: slot.max_size,
            data_len: slot.data_len,
            enabled: slot.enabled,
            modified: slot.modified,
        }
    }
}

/// Store-wide counters, returned by [`SlotStore::status`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StoreStatus {
    pub enabled: bool,
    /// Total driver capacity in bytes.
    pub capacity: u32,
    /// Bytes reserved by registrations, markers included.
    pub used: u32,
    pub registered: usize,
}

/// Outcome of a successful [`SlotStore::read`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadInfo {
    /// Number of bytes copied into the caller's buffer.
    pub len: u16,
    /// Set when the buffer length differed from the stored payload length. Non-fatal: the
    /// shorter of the two lengths was read, which keeps records readable across firmware
    /// versions that grew or shrank a payload.
    pub mismatch: bool,
}

/// Slot registry and record store over a byte-addressable EEPROM driver.
///
/// `N` is the registry capacity. The table is append-only for the store's lifetime: slots are
/// registered once, never move and never shrink. All failures are synchronous and local to the
/// slot they target; there are no retries and no automatic repair.
pub struct SlotStore<E, I, const N: usize> {
    eeprom: E,
    capacity: u32,
    enabled: bool,
    slots: [Option<SlotDescriptor<I>>; N],
    len: usize,
}

impl<E: Eeprom, I: RecordId, const N: usize> SlotStore<E, I, N> {
    /// Takes ownership of the EEPROM driver, captures its capacity and starts the store
    /// enabled.
    ///
    /// Callers must repeat the identical registration sequence at every startup, since slot
    /// addresses derive from registration order alone.
    pub fn new(eeprom: E) -> Self {
        let capacity = eeprom.capacity().min(u32::MAX as usize) as u32;

        #[cfg(feature = "defmt")]
        trace!("new: capacity {} bytes, {} slots max", capacity, N);
        #[cfg(feature = "debug-logs")]
        println!("store: new: capacity {capacity} bytes, {} slots max", N);

        Self {
            eeprom,
            capacity,
            enabled: true,
            slots: [const { None }; N],
            len: 0,
        }
    }

    /// Consumes the store and hands the driver back.
    pub fn into_inner(self) -> E {
        self.eeprom
    }

    /// Direct access to the driver, e.g. for a bulk diagnostic dump. Writes made here bypass
    /// the store's bookkeeping; pair them with [`set_valid`](Self::set_valid) when they replace
    /// a record wholesale.
    pub fn eeprom_mut(&mut self) -> &mut E {
        &mut self.eeprom
    }

    /// Re-enables all persistence-affecting operations. Stored data is unaffected.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disables all persistence-affecting operations. Registration and metadata queries keep
    /// working; `write`, `read` and `erase` fail with [`Error::Disabled`] without touching the
    /// driver.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Reserves the next free address range for `id`: one marker byte plus `max_size` payload
    /// bytes, directly after the previously registered slot (address 0 for the first).
    ///
    /// Registration is RAM-only; no marker is written, so a fresh slot reads as invalid until
    /// its first [`write`](Self::write).
    pub fn register(&mut self, id: I, max_size: u16) -> Result<(), Error> {
        if self.len == N {
            return Err(Error::CapacityExceeded);
        }
        if self.find(id).is_some() {
            return Err(Error::DuplicateId);
        }

        let start_addr = self.next_addr();
        // +1 for the marker byte preceding the payload
        let reserved = max_size as u32 + 1;
        match start_addr.checked_add(reserved) {
            Some(end) if end <= self.capacity => {}
            _ => return Err(Error::OutOfSpace),
        }
        let end_addr = start_addr + max_size as u32;

        #[cfg(feature = "defmt")]
        trace!(
            "register: {:#06x}..={:#06x} ({}+1 bytes)",
            start_addr, end_addr, max_size
        );
        #[cfg(feature = "debug-logs")]
        println!("store: register: {id:?} {start_addr:#06x}..={end_addr:#06x} ({max_size}+1 bytes)");

        self.slots[self.len] = Some(SlotDescriptor {
            id,
            max_size,
            start_addr,
            end_addr,
            data_len: 0,
            enabled: true,
            modified: false,
        });
        self.len += 1;
        Ok(())
    }

    /// Writes a record: marker byte first, then the payload, then fill bytes up to the slot's
    /// capacity. Sets the slot's data length and modified flag.
    ///
    /// The byte sequence is not atomic as a group. A power loss mid-write can leave a valid
    /// marker over a partial or stale payload; with no checksum, that only surfaces to the
    /// caller as wrong payload content.
    pub fn write(&mut self, id: I, data: &[u8]) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::Disabled);
        }
        let slot = *self.find(id).ok_or(Error::NotFound)?;
        if !slot.enabled {
            return Err(Error::SlotDisabled);
        }
        if data.len() > slot.max_size as usize {
            return Err(Error::PayloadTooLarge);
        }

        self.write_bytes(slot.start_addr, &[Marker::Valid as u8])?;
        self.write_bytes(slot.start_addr + 1, data)?;
        self.fill(
            slot.start_addr + 1 + data.len() as u32,
            slot.max_size as usize - data.len(),
        )?;

        if let Some(slot) = self.find_mut(id) {
            slot.data_len = data.len() as u16;
            slot.modified = true;
        }

        #[cfg(feature = "defmt")]
        trace!("write: {} bytes at {:#06x}", data.len(), slot.start_addr);
        #[cfg(feature = "debug-logs")]
        println!(
            "store: write: {id:?} {} bytes at {:#06x}",
            data.len(),
            slot.start_addr
        );

        Ok(())
    }

    /// Reads a record into `buf` after checking the marker byte.
    ///
    /// A buffer length differing from the stored payload length is not an error: the shorter of
    /// the two is read and the mismatch is reported through [`ReadInfo`].
    pub fn read(&mut self, id: I, buf: &mut [u8]) -> Result<ReadInfo, Error> {
        if !self.enabled {
            return Err(Error::Disabled);
        }
        let slot = *self.find(id).ok_or(Error::NotFound)?;
        if !slot.enabled {
            return Err(Error::SlotDisabled);
        }

        let mut marker = [0u8; 1];
        self.read_bytes(slot.start_addr, &mut marker)?;
        if !Marker::is_valid(marker[0]) {
            return Err(Error::Invalid);
        }

        let mismatch = buf.len() != slot.data_len as usize;
        if mismatch {
            #[cfg(feature = "defmt")]
            warn!(
                "read: length mismatch at {:#06x}: stored {}, requested {}",
                slot.start_addr,
                slot.data_len,
                buf.len()
            );
            #[cfg(feature = "debug-logs")]
            println!(
                "store: read: {id:?} length mismatch: stored {}, requested {}",
                slot.data_len,
                buf.len()
            );
        }

        let len = buf.len().min(slot.data_len as usize);
        self.read_bytes(slot.start_addr + 1, &mut buf[..len])?;

        #[cfg(feature = "defmt")]
        trace!("read: {} bytes at {:#06x}", len, slot.start_addr);

        Ok(ReadInfo {
            len: len as u16,
            mismatch,
        })
    }

    /// Erases a record by overwriting its marker byte alone. Payload bytes stay behind for
    /// diagnostics and are overwritten by the next write. Resets the slot's data length and
    /// modified flag. Idempotent.
    ///
    /// Erase is not gated by the per-slot enable flag, only by the store-wide one.
    pub fn erase(&mut self, id: I) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::Disabled);
        }
        let slot = *self.find(id).ok_or(Error::NotFound)?;

        self.write_bytes(slot.start_addr, &[Marker::Erased as u8])?;
        if let Some(slot) = self.find_mut(id) {
            slot.data_len = 0;
            slot.modified = false;
        }

        #[cfg(feature = "defmt")]
        trace!("erase: marker at {:#06x}", slot.start_addr);
        #[cfg(feature = "debug-logs")]
        println!("store: erase: {id:?} marker at {:#06x}", slot.start_addr);

        Ok(())
    }

    /// Reads the marker byte straight from the driver, independent of the read/write payload
    /// path and of the store-wide enable gate. `Ok(false)` for unknown identifiers.
    pub fn is_valid(&mut self, id: I) -> Result<bool, Error> {
        let Some(slot) = self.find(id) else {
            return Ok(false);
        };
        let addr = slot.start_addr;

        let mut marker = [0u8; 1];
        self.read_bytes(addr, &mut marker)?;
        Ok(Marker::is_valid(marker[0]))
    }

    /// Writes the marker byte directly, leaving the payload untouched. Lets a caller invalidate
    /// a record while keeping its last payload readable via [`eeprom_mut`](Self::eeprom_mut)
    /// for diagnostics, or declare a record written by other means valid.
    pub fn set_valid(&mut self, id: I, valid: bool) -> Result<(), Error> {
        let slot = *self.find(id).ok_or(Error::NotFound)?;
        let marker = if valid { Marker::Valid } else { Marker::Erased };
        self.write_bytes(slot.start_addr, &[marker as u8])
    }

    /// Per-slot gate for `write` and `read`. No-op on unknown identifiers.
    pub fn set_slot_enabled(&mut self, id: I, enabled: bool) {
        if let Some(slot) = self.find_mut(id) {
            slot.enabled = enabled;
        }
    }

    /// False for unknown identifiers.
    pub fn is_slot_enabled(&self, id: I) -> bool {
        self.find(id).is_some_and(|slot| slot.enabled)
    }

    /// Length of the most recently written payload; 0 for erased, never written or unknown
    /// slots.
    pub fn data_len(&self, id: I) -> u16 {
        self.find(id).map_or(0, |slot| slot.data_len)
    }

    /// Dirty-since-clear flag: set by `write`, cleared by `erase` and
    /// [`clear_modified`](Self::clear_modified).
    pub fn is_modified(&self, id: I) -> bool {
        self.find(id).is_some_and(|slot| slot.modified)
    }

    /// No-op on unknown identifiers.
    pub fn clear_modified(&mut self, id: I) {
        if let Some(slot) = self.find_mut(id) {
            slot.modified = false;
        }
    }

    /// Address of the slot's marker byte. Diagnostic only; layout is an internal detail.
    pub fn addr(&self, id: I) -> Option<u32> {
        self.find(id).map(|slot| slot.start_addr)
    }

    /// Total driver capacity in bytes.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Bytes reserved by registrations so far, markers included. The next registration starts
    /// here.
    pub fn used(&self) -> u32 {
        self.next_addr()
    }

    pub fn slot_count(&self) -> usize {
        self.len
    }

    /// Store-wide counters. Touches no state and no media.
    pub fn status(&self) -> StoreStatus {
        StoreStatus {
            enabled: self.enabled,
            capacity: self.capacity,
            used: self.used(),
            registered: self.len,
        }
    }

    /// Snapshot of one slot's descriptor.
    pub fn slot_info(&self, id: I) -> Option<SlotInfo> {
        self.find(id).map(SlotInfo::from)
    }

    /// Snapshots of all registered slots, in registration (== address) order.
    pub fn slots(&self) -> impl Iterator<Item = SlotInfo> + '_ {
        self.slots[..self.len].iter().flatten().map(SlotInfo::from)
    }

    fn find(&self, id: I) -> Option<&SlotDescriptor<I>> {
        self.slots[..self.len].iter().flatten().find(|slot| slot.id == id)
    }

    fn find_mut(&mut self, id: I) -> Option<&mut SlotDescriptor<I>> {
        self.slots[..self.len]
            .iter_mut()
            .flatten()
            .find(|slot| slot.id == id)
    }

    /// First address past the last registered slot; 0 on an empty registry.
    fn next_addr(&self) -> u32 {
        self.slots[..self.len]
            .iter()
            .flatten()
            .last()
            .map_or(0, |slot| slot.end_addr + 1)
    }

    fn read_bytes(&mut self, addr: u32, bytes: &mut [u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.eeprom.read(addr, bytes).map_err(|_| Error::Storage)
    }

    fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<(), Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.eeprom.write(addr, bytes).map_err(|_| Error::Storage)
    }

    fn fill(&mut self, mut addr: u32, mut remaining: usize) -> Result<(), Error> {
        const CHUNK: [u8; FILL_CHUNK] = [FILL_BYTE; FILL_CHUNK];
        while remaining > 0 {
            let n = remaining.min(CHUNK.len());
            self.write_bytes(addr, &CHUNK[..n])?;
            addr += n as u32;
            remaining -= n;
        }
        Ok(())
    }
}
