//! Panic capture with location and stack frames.
//!
//! # Design Decisions
//! - A process-wide hook records the panic site into a thread-local slot
//! - Only panics raised inside [`catch_panic`] are recorded; all others go
//!   to the previously installed hook (stderr by default)
//! - `catch_unwind` returns on the panicking thread, so the slot is read back
//!   on the same thread that wrote it

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use futures_util::FutureExt;

use crate::observability::diagnostics::Failure;

tokio::task_local! {
    /// Set while a future runs under [`catch_panic`].
    static CAPTURING: ();
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

struct PanicSite {
    location: Option<String>,
    backtrace: Backtrace,
}

static INSTALL: Once = Once::new();

/// Install the recording panic hook. Safe to call more than once.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.try_with(|_| ()).is_err() {
                previous(info);
                return;
            }
            let site = PanicSite {
                location: info.location().map(ToString::to_string),
                backtrace: Backtrace::force_capture(),
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(site));
        }));
    });
}

/// Run `future`, turning a panic into a [`Failure`] that carries the panic
/// location and frames when the hook is installed.
pub async fn catch_panic<F: Future>(future: F) -> Result<F::Output, Failure> {
    let outcome = CAPTURING
        .scope((), AssertUnwindSafe(future).catch_unwind())
        .await;

    outcome.map_err(|payload| {
        let failure = Failure::from_panic(payload.as_ref());
        match LAST_PANIC.with(|slot| slot.borrow_mut().take()) {
            Some(site) => {
                let failure = failure.with_backtrace(&site.backtrace);
                match site.location {
                    Some(location) => failure.with_location(location),
                    None => failure,
                }
            }
            None => failure,
        }
    })
}
