//! Console notifier used by the `obridge` binary.
//!
//! Info messages go to stdout; warnings and errors go to stderr with a level
//! prefix. Every notification is also emitted as a tracing event.

use crate::models::NotifyLevel;
use crate::traits::Notifier;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn format(message: &str, level: NotifyLevel) -> String {
        match level {
            NotifyLevel::Info => message.to_string(),
            NotifyLevel::Warning | NotifyLevel::Error => format!("{}: {}", level, message),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, level: NotifyLevel) {
        tracing::debug!(%level, "{}", message);
        match level {
            NotifyLevel::Info => println!("{}", Self::format(message, level)),
            NotifyLevel::Warning | NotifyLevel::Error => {
                eprintln!("{}", Self::format(message, level))
            }
        }
    }
}
