//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`defmt` feature): routed through defmt
//! - Host tests: `println!`
//! - Host non-test without `defmt`: no-op
//!
//! The no-op arm still touches every argument so that call sites never trip
//! unused-variable lints when logging is compiled out.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($fmt $(, $arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[INFO] {}", format!($fmt $(, $arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($fmt $(, $arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[WARN] {}", format!($fmt $(, $arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($fmt $(, $arg)*);

        #[cfg(all(not(feature = "defmt"), test))]
        println!("[DEBUG] {}", format!($fmt $(, $arg)*));

        #[cfg(all(not(feature = "defmt"), not(test)))]
        {
            $( let _ = &$arg; )*
        }
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_log_macros_accept_format_args() {
        log_info!("capture ready on pin {}", 4);
        log_warn!("half-cycle estimate drifted by {}us", 120);
        log_debug!("sample[{}] = {}", 0, 9_800);
        log_info!("trailing comma form",);
    }
}
