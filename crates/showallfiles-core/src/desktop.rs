//! Top-level window queries and the File Explorer identity test.

use crate::Result;

/// Window class shared by every File Explorer browser window.
pub const EXPLORER_CLASS: &str = "CabinetWClass";

/// `WM_COMMAND` identifier that makes an Explorer window refresh its view.
pub const REFRESH_COMMAND: usize = 41504;

/// An opaque top-level window handle.
///
/// Never retained beyond the operation that discovered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// The OS window system, as far as refreshing Explorer needs it.
pub trait Desktop: Send + Sync {
    /// Lists every top-level window.
    ///
    /// Fails with [`Error::EnumerationFailure`](crate::Error) only when
    /// the listing primitive itself fails.
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>>;

    /// Returns the window class name, or `None` if it cannot be queried.
    fn class_name(&self, window: WindowHandle) -> Option<String>;

    /// Returns the full executable path of the window's owning process,
    /// or `None` if the process cannot be queried.
    fn process_image(&self, window: WindowHandle) -> Option<String>;

    /// Posts the refresh command to the window.
    fn post_refresh(&self, window: WindowHandle) -> Result<()>;
}

/// Recognises File Explorer browser windows.
///
/// A window matches when its class is [`EXPLORER_CLASS`] and its owning
/// process image is `<SystemRoot>\explorer.exe`, both compared
/// case-insensitively after normalising the path.
#[derive(Debug, Clone)]
pub struct ExplorerIdentity {
    expected_image: String,
}

impl ExplorerIdentity {
    /// Builds the identity test for a Windows directory such as `C:\Windows`.
    pub fn new(system_root: &str) -> Self {
        let image = format!("{}\\explorer.exe", system_root.trim_end_matches(['\\', '/']));
        Self {
            expected_image: normalize_path(&image).to_lowercase(),
        }
    }

    /// Builds the identity test from the `SystemRoot` environment variable.
    pub fn from_env() -> Option<Self> {
        std::env::var("SystemRoot")
            .ok()
            .filter(|root| !root.is_empty())
            .map(|root| Self::new(&root))
    }

    /// The normalised, lowercase executable path a match must have.
    pub fn expected_image(&self) -> &str {
        &self.expected_image
    }

    /// Applies the identity test to already-queried window properties.
    pub fn matches(&self, class: &str, image: &str) -> bool {
        class.to_lowercase() == EXPLORER_CLASS.to_lowercase()
            && normalize_path(image).to_lowercase() == self.expected_image
    }

    /// Queries `window` and applies the identity test.
    ///
    /// Any query failure counts as "not a match".
    pub fn is_explorer(&self, desktop: &dyn Desktop, window: WindowHandle) -> bool {
        let Some(class) = desktop.class_name(window) else {
            return false;
        };
        if class.to_lowercase() != EXPLORER_CLASS.to_lowercase() {
            return false;
        }
        log::debug!("Window 0x{:X} has class {EXPLORER_CLASS:?}", window.0);

        let Some(image) = desktop.process_image(window) else {
            return false;
        };
        let found = self.matches(&class, &image);
        if found {
            log::debug!("Window 0x{:X} belongs to explorer.exe", window.0);
        }
        found
    }
}

/// Lexically cleans a Windows path.
///
/// Accepts both separators, collapses repeated separators, drops `.`
/// components and resolves `..` against preceding components. A drive
/// prefix (`C:`) or UNC prefix (`\\`) is kept as is.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('/', "\\");

    let (prefix, rest) = if let Some(rest) = path.strip_prefix(r"\\") {
        (r"\\", rest)
    } else if path.len() >= 2 && path.as_bytes()[1] == b':' && path.is_char_boundary(2) {
        path.split_at(2)
    } else {
        ("", path.as_str())
    };
    let rooted = prefix == r"\\" || rest.starts_with('\\');

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split('\\') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if rooted => {}
                _ => parts.push(".."),
            },
            p => parts.push(p),
        }
    }

    let mut out = String::from(prefix);
    if rooted && prefix != r"\\" {
        out.push('\\');
    }
    out.push_str(&parts.join("\\"));
    if out.is_empty() {
        out.push('.');
    }
    out
}
