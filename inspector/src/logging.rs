//! Integration with the `log` facade. This crate never prints on its own;
//! the host installs a concrete logger and this module only applies the
//! build-time level override and serializes multi-line dumps.

use alloc::string::String;

use lazy_static::lazy_static;
use log::LevelFilter;
use spin::Mutex;

lazy_static! {
    /// Build-time log level override, read once.
    pub static ref LOG_LEVEL: String = option_env!("IOAPIC_LOG_LEVEL")
        .unwrap_or("info")
        .to_lowercase();
    /// Lock held while a report dump is emitted so that two dumps cannot
    /// interleave their rows.
    pub(crate) static ref LOG_LOCK: Mutex<()> = Mutex::new(());
}

/// Applies `IOAPIC_LOG_LEVEL` to the `log` facade's maximum level.
///
/// Registering a concrete logger is left to the host environment; until one
/// is installed all records are discarded by `log` itself.
pub fn apply_env_log_level() {
    let max_level = match LOG_LEVEL.as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Off,
    };

    log::set_max_level(max_level);
}

/// Prints the name of the function that invokes this macro.
#[macro_export]
macro_rules! function {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        &name[..name.len() - 3]
    }};
}

#[macro_export]
macro_rules! kinfo {
    ($($arg:tt)*) => {{
        log::info!("[{}@L{}] {}", $crate::function!(), line!(), format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kerror {
    ($($arg:tt)*) => {{
        log::error!("[{}@L{}] {}", $crate::function!(), line!(), format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! kdebug {
    ($($arg:tt)*) => {{
        log::debug!("[{}@L{}] {}", $crate::function!(), line!(), format_args!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_override_is_lowercased() {
        assert!(LOG_LEVEL.chars().all(|c| !c.is_uppercase()));
    }

    #[test]
    fn env_level_reaches_the_facade() {
        apply_env_log_level();
        assert_eq!(log::max_level(), LevelFilter::Info);
    }
}
