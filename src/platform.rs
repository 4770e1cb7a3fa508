use embedded_storage::Storage;

/// Byte-addressable persistent memory the store runs on.
///
/// Any [`embedded_storage::Storage`] implementation qualifies: a real I2C/SPI EEPROM driver, a
/// flash-emulated EEPROM layer with its own wear-leveling and commit semantics, or an in-RAM
/// mock for tests. The store only issues plain reads and writes inside `[0, capacity)` and never
/// erases sectors itself.
pub trait Eeprom: Storage {}

impl<T: Storage> Eeprom for T {}
