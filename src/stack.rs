//! Stack safety for the recursive parser and evaluator.
//!
//! Deeply nested source (long `-` chains, many nested parentheses) recurses
//! once per level; the stack is grown on demand instead of overflowing.

const RED_ZONE: usize = 100 * 1024; // 100KB
const STACK_PER_RECURSION: usize = 1024 * 1024; // 1MB

/// Ensure sufficient stack space for recursive operations.
#[inline]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
