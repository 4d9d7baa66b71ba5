use crate::Result;

/// Per-user registry path holding Explorer's advanced view settings.
pub const KEY_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced";

/// Name of the integer value controlling hidden file visibility.
pub const VALUE_NAME: &str = "Hidden";

/// An open handle to the backing key.
///
/// The handle is released when the value is dropped.
pub trait StoreKey: Send {
    /// Reads the raw `Hidden` value.
    fn read_value(&self) -> Result<u32>;

    /// Writes the raw `Hidden` value.
    fn write_value(&self, value: u32) -> Result<()>;
}

/// The per-user key-value store behind the visibility flag.
pub trait BackingStore: Send + Sync {
    /// Opens the key with read and write access.
    ///
    /// Fails with [`Error::BackingStoreUnavailable`](crate::Error) when
    /// the key cannot be opened.
    fn open(&self) -> Result<Box<dyn StoreKey>>;
}
