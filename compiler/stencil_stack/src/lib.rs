//! Stack growth for recursive descent.
//!
//! Template expressions nest arbitrarily (`((((x))))`, long pipe chains,
//! nested lambdas), and both the parser and the interpreter recurse once per
//! nesting level. [`ensure_sufficient_stack`] grows the native stack on demand
//! so pathological templates fail with a normal error instead of aborting the
//! process.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 96 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nesting_depth(n: u32) -> u32 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { nesting_depth(n - 1) + 1 })
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        assert_eq!(nesting_depth(50_000), 50_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("bad"));
        assert_eq!(result, Err("bad"));
    }
}
