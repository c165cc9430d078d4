//! Shorter error context for `anyhow`.
//!
//! `.map_err(ctx!("reading results file {path:?}"))` instead of
//! `.with_context(|| anyhow!("reading results file {path:?}"))`.

#[macro_export]
macro_rules! ctx {
    ($fmt:tt) => {
        |e| anyhow::Error::new(e).context(format!($fmt))
    };
    ($fmt:tt, $($arg:tt)*) => {
        |e| anyhow::Error::new(e).context(format!($fmt, $($arg)*))
    };
}
