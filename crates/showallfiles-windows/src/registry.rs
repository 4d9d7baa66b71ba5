//! Reads and writes `HKCU\Software\Microsoft\Windows\CurrentVersion\Explorer\Advanced\Hidden`.

use showallfiles_core::store::{KEY_PATH, VALUE_NAME};
use showallfiles_core::{BackingStore, Error, Result, StoreKey};
use windows::Win32::Foundation::WIN32_ERROR;
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, KEY_NOTIFY, KEY_QUERY_VALUE, KEY_SET_VALUE, REG_DWORD, REG_SAM_FLAGS,
    REG_VALUE_TYPE, RegCloseKey, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW,
};
use windows::core::HSTRING;

/// The per-user Explorer settings key.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryStore;

impl BackingStore for RegistryStore {
    fn open(&self) -> Result<Box<dyn StoreKey>> {
        Ok(Box::new(RegistryKey::open(KEY_QUERY_VALUE | KEY_SET_VALUE)?))
    }
}

/// An open handle to the settings key, closed on drop.
pub struct RegistryKey {
    key: HKEY,
}

// SAFETY: registry handles are process-wide and may be used and closed
// from any thread.
unsafe impl Send for RegistryKey {}

impl RegistryKey {
    /// Opens the settings key with the given access rights.
    pub fn open(access: REG_SAM_FLAGS) -> Result<Self> {
        let path = HSTRING::from(KEY_PATH);
        let mut key = HKEY::default();
        // SAFETY: `path` outlives the call and `key` is a valid out pointer.
        let status = unsafe { RegOpenKeyExW(HKEY_CURRENT_USER, &path, None, access, &mut key) };
        if status.is_err() {
            return Err(Error::BackingStoreUnavailable {
                path: format!(r"HKCU\{KEY_PATH}"),
                reason: describe(status),
            });
        }
        Ok(Self { key })
    }

    /// Opens the key for change notification only.
    pub fn open_for_notify() -> Result<Self> {
        Self::open(KEY_NOTIFY)
    }

    pub(crate) fn raw(&self) -> HKEY {
        self.key
    }
}

impl StoreKey for RegistryKey {
    fn read_value(&self) -> Result<u32> {
        let name = HSTRING::from(VALUE_NAME);
        let mut kind = REG_VALUE_TYPE::default();
        let mut data = 0u32;
        let mut size = size_of::<u32>() as u32;
        // SAFETY: `data` provides exactly `size` writable bytes.
        let status = unsafe {
            RegQueryValueExW(
                self.key,
                &name,
                None,
                Some(&mut kind),
                Some((&raw mut data).cast()),
                Some(&mut size),
            )
        };
        if status.is_err() {
            return Err(Error::ValueReadFailure {
                name: VALUE_NAME.into(),
                reason: describe(status),
            });
        }
        if kind != REG_DWORD || size != size_of::<u32>() as u32 {
            return Err(Error::ValueReadFailure {
                name: VALUE_NAME.into(),
                reason: format!("expected REG_DWORD, found type {} ({size} bytes)", kind.0),
            });
        }
        Ok(data)
    }

    fn write_value(&self, value: u32) -> Result<()> {
        let name = HSTRING::from(VALUE_NAME);
        let bytes = value.to_le_bytes();
        // SAFETY: `bytes` is a valid 4-byte DWORD buffer.
        let status = unsafe { RegSetValueExW(self.key, &name, None, REG_DWORD, Some(&bytes)) };
        if status.is_err() {
            return Err(Error::ValueWriteFailure {
                name: VALUE_NAME.into(),
                reason: describe(status),
            });
        }
        Ok(())
    }
}

impl Drop for RegistryKey {
    fn drop(&mut self) {
        // SAFETY: the key was opened by `open` and is closed exactly once.
        let _ = unsafe { RegCloseKey(self.key) };
    }
}

fn describe(status: WIN32_ERROR) -> String {
    windows::core::Error::from(status.to_hresult()).message()
}
