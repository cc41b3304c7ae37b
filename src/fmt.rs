//! Logging macros for the library modules.
//!
//! With the `defmt` feature these forward to `defmt`; without it (host
//! tests) the arguments are evaluated by reference and discarded so the
//! call sites stay warning-free.

#![allow(unused_macros)]

macro_rules! log_forward {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            #[cfg(feature = "defmt")]
            ::defmt::$level!($s $(, $x)*);
            #[cfg(not(feature = "defmt"))]
            let _ = ($( & $x ),*);
        }
    };
}

macro_rules! trace {
    ($($t:tt)*) => { log_forward!(trace, $($t)*) };
}

macro_rules! debug {
    ($($t:tt)*) => { log_forward!(debug, $($t)*) };
}

macro_rules! info {
    ($($t:tt)*) => { log_forward!(info, $($t)*) };
}

macro_rules! warn {
    ($($t:tt)*) => { log_forward!(warn, $($t)*) };
}

macro_rules! error {
    ($($t:tt)*) => { log_forward!(error, $($t)*) };
}
