use thiserror::Error;

/// Errors that can occur during slot store operations. The list is likely to stay as is but
/// marked as non-exhaustive to allow for future additions without breaking the API. Registration
/// errors are static programming mistakes; a caller would typically only handle `Invalid` (record
/// never written or erased) and `Storage`.
#[derive(Error, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The whole store is disabled. Re-enable it with [`enable`](crate::SlotStore::enable).
    #[error("store disabled")]
    Disabled,

    /// The slot exists but was disabled with
    /// [`set_slot_enabled`](crate::SlotStore::set_slot_enabled).
    #[error("slot disabled")]
    SlotDisabled,

    /// No slot has been registered under this identifier.
    #[error("slot not registered")]
    NotFound,

    /// The registry already holds its compile-time maximum of `N` slots.
    #[error("slot registry full")]
    CapacityExceeded,

    /// The identifier was registered before. Slot layout is append-only; a record type can only
    /// be registered once per store lifetime.
    #[error("identifier already registered")]
    DuplicateId,

    /// The remaining EEPROM space is smaller than the requested payload size plus its marker
    /// byte.
    #[error("not enough space left")]
    OutOfSpace,

    /// The payload handed to [`write`](crate::SlotStore::write) exceeds the slot's registered
    /// capacity.
    #[error("payload exceeds slot capacity")]
    PayloadTooLarge,

    /// The slot's marker byte does not read back as valid. The record was never written, was
    /// erased, or the marker byte got corrupted. Never auto-repaired.
    #[error("record invalid")]
    Invalid,

    /// The internal error value returned from the EEPROM driver.
    #[error("eeprom driver error")]
    Storage,
}
