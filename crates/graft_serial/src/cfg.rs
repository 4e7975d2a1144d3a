//! Macros used for compilation control.
//!
//! Each macro takes either a plain block, kept only when the condition
//! holds, or an `if { .. } else { .. }` pair.
//!
//! ```ignore
//! crate::cfg::debug! {
//!     PATH_STACK.with_borrow_mut(|stack| stack.clear());
//! }
//!
//! let found = crate::cfg::auto_register! {
//!     if { true } else { false }
//! };
//! ```

#[cfg(all(debug_assertions, feature = "debug"))]
macro_rules! debug {
    (if { $($p:tt)* } else { $($n:tt)* }) => { { $($p)* } };
    ($($p:tt)*) => { $($p)* };
}

#[cfg(not(all(debug_assertions, feature = "debug")))]
macro_rules! debug {
    (if { $($p:tt)* } else { $($n:tt)* }) => { { $($n)* } };
    ($($p:tt)*) => {};
}

#[cfg(feature = "auto_register")]
macro_rules! auto_register {
    (if { $($p:tt)* } else { $($n:tt)* }) => { { $($p)* } };
    ($($p:tt)*) => { $($p)* };
}

#[cfg(not(feature = "auto_register"))]
macro_rules! auto_register {
    (if { $($p:tt)* } else { $($n:tt)* }) => { { $($n)* } };
    ($($p:tt)*) => {};
}

pub(crate) use auto_register;
pub(crate) use debug;
