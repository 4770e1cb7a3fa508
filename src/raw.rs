//! On-media layout. A slot is one marker byte at `start_addr` followed by `max_size` payload
//! bytes; short payloads are padded with the fill byte up to the slot's capacity. Nothing else
//! is persisted, in particular no descriptor metadata and no checksums.

/// Pad value for unused payload bytes, matching the erased-cell state of most EEPROM parts.
pub(crate) const FILL_BYTE: u8 = 0xFF;

/// Longest run of fill bytes handed to the driver per write call.
pub(crate) const FILL_CHUNK: usize = 16;

/// Validity marker stored in a slot's first byte.
///
/// Any byte that decodes to neither variant, including the erased-cell value `0xFF` of a never
/// written EEPROM, counts as invalid.
#[derive(strum::FromRepr, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub(crate) enum Marker {
    Erased = 0x00,
    Valid = 0x01,
}

impl Marker {
    pub(crate) fn is_valid(byte: u8) -> bool {
        Marker::from_repr(byte) == Some(Marker::Valid)
    }
}
