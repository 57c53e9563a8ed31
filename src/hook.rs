//! Reports panics through a [`TelegramNotifier`].
//!
//! The hook is chained: whatever hook was installed before (usually the
//! default one that prints the panic message) still runs first.

use crate::core::ErrorEvent;
use crate::notifier::TelegramNotifier;
use std::backtrace::Backtrace;
use std::panic;
use std::thread;
use tracing::error;

/// Installs a panic hook that sends every panic to Telegram.
pub fn install_panic_hook(notifier: TelegramNotifier) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        previous(info);

        let event = ErrorEvent::from_panic(info.payload(), info.location(), &Backtrace::capture());
        report_detached(&notifier, event);
    }));
}

/// Sends from a fresh thread so the blocking client never runs on an async worker.
fn report_detached(notifier: &TelegramNotifier, event: ErrorEvent) {
    let notifier = notifier.clone();
    let handle = thread::Builder::new()
        .name("telegramable-panic".to_string())
        .spawn(move || {
            notifier.report(&event);
        });

    match handle {
        Ok(handle) => {
            if handle.join().is_err() {
                error!("Panic notification thread panicked");
            }
        }
        Err(e) => error!(error = %e, "Failed to spawn panic notification thread"),
    }
}
