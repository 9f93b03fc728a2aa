//! Process-wide restore registry.
//!
//! One slot records the terminal state to put back when the process dies
//! while an editor is in raw mode. Normal bookkeeping (refcount, handler
//! install state) sits behind a mutex; the pieces a signal handler touches —
//! the saved termios, the raw-active flag, the resize flag — are lock-free
//! statics written only while the handlers are not installed, so the handler
//! path is limited to async-signal-safe calls (`tcsetattr`, `signal`,
//! `raise`).

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);
static RAW_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Flag a pending window-size change; observed between keystrokes.
pub fn note_resize() {
    RESIZE_PENDING.store(true, Ordering::Release);
}

/// Consume the pending-resize flag.
pub fn take_resize() -> bool {
    RESIZE_PENDING.swap(false, Ordering::AcqRel)
}

struct Registry {
    depth: usize,
    hooks_installed: bool,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    depth: 0,
    hooks_installed: false,
});

pub(crate) fn enter_raw(install_hooks: bool) -> io::Result<()> {
    let mut reg = REGISTRY.lock().unwrap_or_else(|p| p.into_inner());
    if reg.depth == 0 {
        #[cfg(unix)]
        unix::save_termios()?;
        crossterm::terminal::enable_raw_mode()?;
        RAW_ACTIVE.store(true, Ordering::Release);
        if install_hooks {
            #[cfg(unix)]
            {
                unix::install_handlers();
                reg.hooks_installed = true;
            }
        }
    }
    reg.depth += 1;
    Ok(())
}

pub(crate) fn leave_raw() -> io::Result<()> {
    let mut reg = REGISTRY.lock().unwrap_or_else(|p| p.into_inner());
    if reg.depth == 0 {
        return Ok(());
    }
    reg.depth -= 1;
    if reg.depth == 0 {
        #[cfg(unix)]
        if reg.hooks_installed {
            unix::uninstall_handlers();
            reg.hooks_installed = false;
        }
        RAW_ACTIVE.store(false, Ordering::Release);
        crossterm::terminal::disable_raw_mode()?;
    }
    Ok(())
}

#[cfg(unix)]
mod unix {
    use super::{RAW_ACTIVE, RESIZE_PENDING};
    use std::cell::UnsafeCell;
    use std::io;
    use std::mem::MaybeUninit;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Signals owning a slot in the previous-disposition table.
    const HOOKED: [libc::c_int; 8] = [
        libc::SIGTERM,
        libc::SIGQUIT,
        libc::SIGHUP,
        libc::SIGSEGV,
        libc::SIGABRT,
        libc::SIGBUS,
        libc::SIGFPE,
        libc::SIGWINCH,
    ];

    fn is_crash(sig: libc::c_int) -> bool {
        matches!(
            sig,
            libc::SIGSEGV | libc::SIGABRT | libc::SIGBUS | libc::SIGFPE
        )
    }

    /// Handler-visible storage, written only while the matching handler is
    /// uninstalled.
    struct HandlerCell<T>(UnsafeCell<MaybeUninit<T>>);

    // Writes happen under the registry mutex before handler install; reads
    // happen in handlers after install.
    unsafe impl<T> Sync for HandlerCell<T> {}

    impl<T> HandlerCell<T> {
        const fn new() -> Self {
            Self(UnsafeCell::new(MaybeUninit::uninit()))
        }
    }

    static SAVED_TERMIOS: HandlerCell<libc::termios> = HandlerCell::new();
    static TERMIOS_SAVED: AtomicBool = AtomicBool::new(false);
    static PREV: [HandlerCell<libc::sigaction>; 8] = [
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
        HandlerCell::new(),
    ];
    static ATEXIT_REGISTERED: AtomicBool = AtomicBool::new(false);

    /// Snapshot the termios before crossterm switches to raw.
    pub(super) fn save_termios() -> io::Result<()> {
        unsafe {
            let mut t = MaybeUninit::<libc::termios>::uninit();
            if libc::tcgetattr(libc::STDIN_FILENO, t.as_mut_ptr()) != 0 {
                return Err(io::Error::last_os_error());
            }
            *SAVED_TERMIOS.0.get() = t;
        }
        TERMIOS_SAVED.store(true, Ordering::Release);
        Ok(())
    }

    /// Idempotent, async-signal-safe terminal restore.
    fn restore_terminal() {
        if !RAW_ACTIVE.swap(false, Ordering::AcqRel) {
            return;
        }
        if !TERMIOS_SAVED.load(Ordering::Acquire) {
            return;
        }
        unsafe {
            libc::tcsetattr(
                libc::STDIN_FILENO,
                libc::TCSAFLUSH,
                (*SAVED_TERMIOS.0.get()).as_ptr(),
            );
        }
    }

    extern "C" fn restore_at_exit() {
        restore_terminal();
    }

    /// Previously installed plain handler for `sig`, when one can be chained.
    /// `SA_SIGINFO` handlers take three arguments and cannot be invoked from
    /// here; they fall back to the default-disposition path.
    unsafe fn plain_prev_handler(sig: libc::c_int) -> Option<extern "C" fn(libc::c_int)> {
        let i = HOOKED.iter().position(|&s| s == sig)?;
        let prev = unsafe { &*(*PREV[i].0.get()).as_ptr() };
        let h = prev.sa_sigaction;
        if h == libc::SIG_DFL || h == libc::SIG_IGN || prev.sa_flags & libc::SA_SIGINFO != 0 {
            return None;
        }
        Some(unsafe { std::mem::transmute::<libc::sighandler_t, extern "C" fn(libc::c_int)>(h) })
    }

    unsafe fn was_ignored(sig: libc::c_int) -> bool {
        HOOKED.iter().position(|&s| s == sig).is_some_and(|i| {
            let prev = unsafe { &*(*PREV[i].0.get()).as_ptr() };
            prev.sa_sigaction == libc::SIG_IGN
        })
    }

    extern "C" fn on_graceful(sig: libc::c_int) {
        restore_terminal();
        unsafe {
            if let Some(f) = plain_prev_handler(sig) {
                f(sig);
                return;
            }
            if was_ignored(sig) {
                return;
            }
            libc::signal(sig, libc::SIG_DFL);
            libc::raise(sig);
        }
    }

    extern "C" fn on_crash(sig: libc::c_int) {
        restore_terminal();
        unsafe {
            libc::signal(sig, libc::SIG_DFL);
            libc::raise(sig);
        }
    }

    extern "C" fn on_winch(sig: libc::c_int) {
        RESIZE_PENDING.store(true, Ordering::Release);
        unsafe {
            if let Some(f) = plain_prev_handler(sig) {
                f(sig);
            }
        }
    }

    pub(super) fn install_handlers() {
        if !ATEXIT_REGISTERED.swap(true, Ordering::AcqRel) {
            unsafe {
                libc::atexit(restore_at_exit);
            }
        }
        for (i, &sig) in HOOKED.iter().enumerate() {
            let handler: extern "C" fn(libc::c_int) = if sig == libc::SIGWINCH {
                on_winch
            } else if is_crash(sig) {
                on_crash
            } else {
                on_graceful
            };
            unsafe {
                let mut act: libc::sigaction = std::mem::zeroed();
                act.sa_sigaction = handler as libc::sighandler_t;
                libc::sigemptyset(&mut act.sa_mask);
                // no SA_RESTART: the blocking read must surface EINTR so a
                // resize is observed before the next render
                act.sa_flags = 0;
                libc::sigaction(sig, &act, (*PREV[i].0.get()).as_mut_ptr());
            }
        }
    }

    pub(super) fn uninstall_handlers() {
        for (i, &sig) in HOOKED.iter().enumerate() {
            unsafe {
                libc::sigaction(sig, (*PREV[i].0.get()).as_ptr(), std::ptr::null_mut());
            }
        }
    }
}
