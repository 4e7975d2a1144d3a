use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::error::SerialError;

crate::cfg::debug! {
    std::thread_local! {
        static PATH_STACK: core::cell::RefCell<PathStack> =
            const { core::cell::RefCell::new(PathStack::new()) };
    }
}

/// One step from a container to a child.
#[cfg_attr(not(all(debug_assertions, feature = "debug")), allow(dead_code))]
#[derive(Debug, Clone)]
enum Segment {
    Field(String),
    Index(usize),
}

/// The field path from the root to the value being processed.
///
/// Printed as `$.next.items[2]`.
#[cfg_attr(not(all(debug_assertions, feature = "debug")), allow(dead_code))]
#[derive(Debug, Default, Clone)]
struct PathStack {
    stack: Vec<Segment>,
}

#[cfg_attr(not(all(debug_assertions, feature = "debug")), allow(dead_code))]
impl PathStack {
    const fn new() -> Self {
        Self { stack: Vec::new() }
    }

    fn push(&mut self, segment: Segment) {
        self.stack.push(segment);
    }

    fn pop(&mut self) {
        self.stack.pop();
    }

    fn clear(&mut self) {
        self.stack.clear();
    }
}

impl fmt::Display for PathStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.stack {
            match segment {
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[inline(always)]
pub(crate) fn push_field(name: &str) {
    crate::cfg::debug! {
        if {
            PATH_STACK.with_borrow_mut(|stack| stack.push(Segment::Field(name.into())));
        } else {
            let _ = name;
        }
    }
}

#[inline(always)]
pub(crate) fn push_index(index: usize) {
    crate::cfg::debug! {
        if {
            PATH_STACK.with_borrow_mut(|stack| stack.push(Segment::Index(index)));
        } else {
            let _ = index;
        }
    }
}

#[inline(always)]
pub(crate) fn pop() {
    crate::cfg::debug! {
        PATH_STACK.with_borrow_mut(|stack| stack.pop());
    }
}

#[inline(always)]
pub(crate) fn clear() {
    crate::cfg::debug! {
        PATH_STACK.with_borrow_mut(|stack| stack.clear());
    }
}

/// Logs `err` with the current path. The stack is left untouched.
#[inline]
pub(crate) fn report(action: &str, err: &SerialError) {
    crate::cfg::debug! {
        if {
            PATH_STACK.with_borrow(|stack| log::error!("{action} failed at `{stack}`: {err}"));
        } else {
            let _ = (action, err);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{PathStack, Segment};

    #[test]
    fn display() {
        let mut stack = PathStack::new();
        assert_eq!(alloc::format!("{stack}"), "$");
        stack.push(Segment::Field("next".into()));
        stack.push(Segment::Field("items".into()));
        stack.push(Segment::Index(2));
        assert_eq!(alloc::format!("{stack}"), "$.next.items[2]");
        stack.pop();
        stack.clear();
        assert_eq!(alloc::format!("{stack}"), "$");
    }
}
