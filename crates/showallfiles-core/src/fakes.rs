//! In-memory stand-ins for the OS capabilities, used by unit tests.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::desktop::{Desktop, EXPLORER_CLASS, WindowHandle};
use crate::hotkey::{Hotkey, HotkeyBackend};
use crate::registry_watch::{KeyWatch, Wake};
use crate::state::HookRegistration;
use crate::store::{BackingStore, StoreKey, VALUE_NAME};
use crate::task::Cancel;
use crate::{Error, Result};

pub const ROOT: &str = r"C:\Windows";
pub const EXPLORER_IMAGE: &str = r"C:\Windows\explorer.exe";

/// Polls `cond` until it holds or five seconds pass.
pub fn wait_until(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    cond()
}

// -- Backing store --

#[derive(Default)]
struct StoreInner {
    value: AtomicU32,
    open: AtomicUsize,
    fail_open: AtomicBool,
    fail_read: AtomicBool,
    fail_write: AtomicBool,
}

pub struct FakeStore {
    inner: Arc<StoreInner>,
}

impl FakeStore {
    pub fn new(value: u32) -> Self {
        let inner = StoreInner::default();
        inner.value.store(value, Ordering::SeqCst);
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn value(&self) -> u32 {
        self.inner.value.load(Ordering::SeqCst)
    }

    pub fn set_value(&self, value: u32) {
        self.inner.value.store(value, Ordering::SeqCst);
    }

    pub fn open_handles(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    pub fn fail_open(&self, fail: bool) {
        self.inner.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_read(&self, fail: bool) {
        self.inner.fail_read.store(fail, Ordering::SeqCst);
    }

    pub fn fail_write(&self, fail: bool) {
        self.inner.fail_write.store(fail, Ordering::SeqCst);
    }
}

impl BackingStore for FakeStore {
    fn open(&self) -> Result<Box<dyn StoreKey>> {
        if self.inner.fail_open.load(Ordering::SeqCst) {
            return Err(Error::BackingStoreUnavailable {
                path: crate::store::KEY_PATH.into(),
                reason: "access denied".into(),
            });
        }
        self.inner.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeKey {
            inner: self.inner.clone(),
        }))
    }
}

struct FakeKey {
    inner: Arc<StoreInner>,
}

impl StoreKey for FakeKey {
    fn read_value(&self) -> Result<u32> {
        if self.inner.fail_read.load(Ordering::SeqCst) {
            return Err(Error::ValueReadFailure {
                name: VALUE_NAME.into(),
                reason: "value missing".into(),
            });
        }
        Ok(self.inner.value.load(Ordering::SeqCst))
    }

    fn write_value(&self, value: u32) -> Result<()> {
        if self.inner.fail_write.load(Ordering::SeqCst) {
            return Err(Error::ValueWriteFailure {
                name: VALUE_NAME.into(),
                reason: "access denied".into(),
            });
        }
        self.inner.value.store(value, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for FakeKey {
    fn drop(&mut self) {
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
    }
}

// -- Desktop --

struct FakeWindow {
    handle: WindowHandle,
    class: Option<String>,
    image: Option<String>,
}

#[derive(Default)]
pub struct FakeDesktop {
    windows: Mutex<Vec<FakeWindow>>,
    refreshed: Mutex<Vec<WindowHandle>>,
    next: AtomicUsize,
    fail_enumeration: AtomicBool,
    fail_post: AtomicBool,
}

impl FakeDesktop {
    pub fn new() -> Self {
        Self {
            next: AtomicUsize::new(0x100),
            ..Default::default()
        }
    }

    pub fn add_window(&self, class: Option<&str>, image: Option<&str>) -> WindowHandle {
        let handle = WindowHandle(self.next.fetch_add(1, Ordering::SeqCst));
        self.windows.lock().unwrap().push(FakeWindow {
            handle,
            class: class.map(String::from),
            image: image.map(String::from),
        });
        handle
    }

    pub fn add_explorer(&self) -> WindowHandle {
        self.add_window(Some(EXPLORER_CLASS), Some(EXPLORER_IMAGE))
    }

    /// Closes every window and forgets past refreshes.
    pub fn clear(&self) {
        self.windows.lock().unwrap().clear();
        self.refreshed.lock().unwrap().clear();
    }

    pub fn refreshed(&self) -> Vec<WindowHandle> {
        self.refreshed.lock().unwrap().clone()
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    pub fn fail_post(&self, fail: bool) {
        self.fail_post.store(fail, Ordering::SeqCst);
    }
}

impl Desktop for FakeDesktop {
    fn top_level_windows(&self) -> Result<Vec<WindowHandle>> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(Error::EnumerationFailure("listing failed".into()));
        }
        Ok(self.windows.lock().unwrap().iter().map(|w| w.handle).collect())
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        let windows = self.windows.lock().unwrap();
        windows
            .iter()
            .find(|w| w.handle == window)
            .and_then(|w| w.class.clone())
    }

    fn process_image(&self, window: WindowHandle) -> Option<String> {
        let windows = self.windows.lock().unwrap();
        windows
            .iter()
            .find(|w| w.handle == window)
            .and_then(|w| w.image.clone())
    }

    fn post_refresh(&self, window: WindowHandle) -> Result<()> {
        if self.fail_post.load(Ordering::SeqCst) {
            return Err(Error::RefreshPostFailure {
                window: window.0,
                reason: "window closed".into(),
            });
        }
        self.refreshed.lock().unwrap().push(window);
        Ok(())
    }
}

// -- Foreground hook --

#[derive(Default)]
pub struct FakeHook {
    sender: Mutex<Option<Sender<WindowHandle>>>,
    quit: Mutex<bool>,
    quit_signal: Condvar,
    installs: AtomicUsize,
    uninstalls: AtomicUsize,
    fail_install: AtomicBool,
    fail_pump: AtomicBool,
    panic_pump: AtomicBool,
}

impl FakeHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn installs(&self) -> usize {
        self.installs.load(Ordering::SeqCst)
    }

    pub fn uninstalls(&self) -> usize {
        self.uninstalls.load(Ordering::SeqCst)
    }

    pub fn fail_install(&self, fail: bool) {
        self.fail_install.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pump(&self, fail: bool) {
        self.fail_pump.store(fail, Ordering::SeqCst);
    }

    /// Makes the next pump panic right after the hook is recorded.
    pub fn panic_next_pump(&self) {
        self.panic_pump.store(true, Ordering::SeqCst);
    }

    /// Simulates `window` taking the foreground.
    pub fn fire(&self, window: WindowHandle) {
        if let Some(tx) = self.sender.lock().unwrap().as_ref() {
            let _ = tx.send(window);
        }
    }
}

impl crate::focus::ForegroundHook for FakeHook {
    fn install(&self, events: Sender<WindowHandle>) -> Result<HookRegistration> {
        if self.fail_install.load(Ordering::SeqCst) {
            return Err(Error::HookInstallFailure("hook rejected".into()));
        }
        let n = self.installs.fetch_add(1, Ordering::SeqCst) + 1;
        *self.sender.lock().unwrap() = Some(events);
        *self.quit.lock().unwrap() = false;
        Ok(HookRegistration {
            hook: 0xB000 + n,
            thread_id: n as u32,
        })
    }

    fn pump(&self) -> Result<()> {
        if self.panic_pump.swap(false, Ordering::SeqCst) {
            panic!("message pump crashed");
        }
        if self.fail_pump.load(Ordering::SeqCst) {
            return Err(Error::MessageLoopFailure("invalid handle".into()));
        }
        let mut quit = self.quit.lock().unwrap();
        while !*quit {
            quit = self.quit_signal.wait(quit).unwrap();
        }
        Ok(())
    }

    fn uninstall(&self, _registration: HookRegistration) {
        self.uninstalls.fetch_add(1, Ordering::SeqCst);
        self.sender.lock().unwrap().take();
    }

    fn post_quit(&self, _thread_id: u32) -> Result<()> {
        *self.quit.lock().unwrap() = true;
        self.quit_signal.notify_all();
        Ok(())
    }
}

// -- Registry change notification --

pub struct FakeKeyWatch {
    wakes: Receiver<Result<Wake>>,
    arms: Arc<AtomicUsize>,
    fail_arm: Arc<AtomicBool>,
}

pub struct FakeKeyWatchControl {
    wakes: Sender<Result<Wake>>,
    arms: Arc<AtomicUsize>,
    fail_arm: Arc<AtomicBool>,
}

pub struct FakeCancel(Mutex<Sender<Result<Wake>>>);

impl FakeKeyWatch {
    pub fn new() -> (Self, FakeKeyWatchControl) {
        let (tx, rx) = mpsc::channel();
        let arms = Arc::new(AtomicUsize::new(0));
        let fail_arm = Arc::new(AtomicBool::new(false));
        (
            Self {
                wakes: rx,
                arms: arms.clone(),
                fail_arm: fail_arm.clone(),
            },
            FakeKeyWatchControl {
                wakes: tx,
                arms,
                fail_arm,
            },
        )
    }
}

impl FakeKeyWatchControl {
    pub fn change(&self) {
        let _ = self.wakes.send(Ok(Wake::Changed));
    }

    /// Makes the pending wait fail as an abandoned OS wait would.
    pub fn fail_wait(&self) {
        let _ = self
            .wakes
            .send(Err(Error::NotificationWaitFailure("wait abandoned".into())));
    }

    pub fn canceller(&self) -> FakeCancel {
        FakeCancel(Mutex::new(self.wakes.clone()))
    }

    pub fn arms(&self) -> usize {
        self.arms.load(Ordering::SeqCst)
    }

    pub fn fail_arm(&self, fail: bool) {
        self.fail_arm.store(fail, Ordering::SeqCst);
    }
}

impl Cancel for FakeCancel {
    fn cancel(&self) {
        let _ = self.0.lock().unwrap().send(Ok(Wake::Cancelled));
    }
}

impl KeyWatch for FakeKeyWatch {
    fn arm(&mut self) -> Result<()> {
        if self.fail_arm.load(Ordering::SeqCst) {
            return Err(Error::NotificationSetupFailure("key deleted".into()));
        }
        self.arms.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&mut self) -> Result<Wake> {
        self.wakes.recv().unwrap_or(Ok(Wake::Cancelled))
    }
}

// -- Hotkeys --

#[derive(Default)]
struct HotkeyQueue {
    presses: Vec<bool>,
}

#[derive(Default)]
pub struct FakeHotkeys {
    queue: Arc<(Mutex<HotkeyQueue>, Condvar)>,
    fail_register: AtomicBool,
    unregistered: AtomicBool,
}

struct FakeHotkeyCancel(Arc<(Mutex<HotkeyQueue>, Condvar)>);

impl Cancel for FakeHotkeyCancel {
    fn cancel(&self) {
        let (queue, signal) = &*self.0;
        queue.lock().unwrap().presses.push(false);
        signal.notify_all();
    }
}

impl FakeHotkeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        let (queue, signal) = &*self.queue;
        queue.lock().unwrap().presses.push(true);
        signal.notify_all();
    }

    /// Presses not yet picked up by the listener.
    pub fn pending(&self) -> usize {
        self.queue.0.lock().unwrap().presses.len()
    }

    pub fn fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::SeqCst);
    }

    pub fn unregistered(&self) -> bool {
        self.unregistered.load(Ordering::SeqCst)
    }
}

impl HotkeyBackend for FakeHotkeys {
    fn register(&self, hotkey: &Hotkey) -> Result<Box<dyn Cancel>> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(Error::HotkeyRegistrationFailure {
                hotkey: hotkey.to_string(),
                reason: "already registered by another application".into(),
            });
        }
        Ok(Box::new(FakeHotkeyCancel(self.queue.clone())))
    }

    fn wait_press(&self) -> bool {
        let (queue, signal) = &*self.queue;
        let mut queue = queue.lock().unwrap();
        while queue.presses.is_empty() {
            queue = signal.wait(queue).unwrap();
        }
        queue.presses.remove(0)
    }

    fn unregister(&self, _hotkey: &Hotkey) {
        self.unregistered.store(true, Ordering::SeqCst);
    }
}
