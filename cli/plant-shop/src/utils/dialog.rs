use std::time::{Duration, Instant};

use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};

use super::TERMINAL_STDERR;

/// Work to run while a spinner is shown.
pub struct Spinner<F>(F);
impl<F: FnOnce() -> T + Send, T: Send> Spinner<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

impl<F: FnOnce() -> T + Send, T: Send> Dialog<'_, Spinner<F>> {
    /// Run the spinner's work on a separate thread,
    /// showing the spinner once the work takes longer than `start_spinning_after`.
    pub fn spin_with_delay(self, start_spinning_after: Duration) -> T {
        let handle = tokio::runtime::Handle::current();
        std::thread::scope(|s| {
            let y = s.spawn(move || {
                // the work may need to block on futures
                let _guard = handle.enter();
                (self.typed.0)()
            });
            let mut dialog: Option<ProgressBar> = None;
            let started = Instant::now();
            loop {
                if y.is_finished() {
                    break;
                }

                if Instant::now() - started < start_spinning_after {
                    std::thread::sleep(Duration::from_millis(50));
                    continue;
                }

                if !Dialog::stderr_is_tty() {
                    break;
                }

                let spinner = ProgressBar::new_spinner();
                spinner.set_style(
                    ProgressStyle::with_template("{spinner} {wide_msg} {prefix:>}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                spinner.set_message(self.message.to_string());
                if let Some(help_message) = self.help_message {
                    spinner.set_prefix(help_message.to_string())
                }
                spinner.enable_steady_tick(Duration::from_millis(100));
                dialog = Some(spinner);

                break;
            }
            let res = y.join().expect("spinner work panicked");

            if let Some(dialog) = dialog {
                let _stderr_lock = TERMINAL_STDERR.lock();
                dialog.finish_and_clear();
            }

            res
        })
    }
}

impl Dialog<'_, ()> {
    /// True if stderr is a terminal, a spinner is pointless otherwise.
    pub fn stderr_is_tty() -> bool {
        if std::env::var("_PLANT_SHOP_NO_SPINNER").is_ok_and(|v| v == "1") {
            return false;
        }
        std::io::stderr().is_tty()
    }
}
