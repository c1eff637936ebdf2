//! Native stack management for the recursive parser, builder and evaluator.
//!
//! The tree walker recurses once per nested expression, statement and call,
//! and unoptimized frames are large. Recursive entry points wrap themselves in
//! [`ensure_sufficient_stack`] so nesting allowed by `max_depth` and
//! `max_call_depth` never exhausts the thread's own stack.
//!
//! WASM targets call straight through; the runtime manages its own stack.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 256 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Stack for the pest parse on top of the per-level allowance.
const PARSE_STACK_BASE: usize = 1024 * 1024;

/// Stack reserved for each nesting level reported by the pre-parse scan.
/// Generated pest rules use well over 100KB per level in debug builds.
const PARSE_STACK_PER_LEVEL: usize = 512 * 1024;

/// Runs `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Runs a pest parse of input nested `depth` levels deep on a stack large
/// enough for it.
///
/// Generated rules recurse without calling back into this crate, so the whole
/// parse gets one segment sized up front rather than growing on demand.
#[cfg(not(target_arch = "wasm32"))]
pub fn with_parse_stack<R>(depth: usize, f: impl FnOnce() -> R) -> R {
    let size = PARSE_STACK_BASE.saturating_add(depth.saturating_mul(PARSE_STACK_PER_LEVEL));
    stacker::maybe_grow(size, size, f)
}

#[cfg(target_arch = "wasm32")]
pub fn with_parse_stack<R>(_depth: usize, f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn test_parse_stack_returns_result() {
        let result: Result<u32, &str> = with_parse_stack(4, || Ok(7));
        assert_eq!(result, Ok(7));
    }
}
