//! Three ways to sum the integers 1..=n.
//!
//! Every variant returns 0 for `n <= 0` and `n * (n + 1) / 2` otherwise. Results
//! past the range of `i64` are not handled.

/// Iterative accumulation. O(n) time, O(1) space.
pub fn sum_to_n_a(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    let mut sum = 0;
    for i in 1..=n {
        sum += i;
    }
    sum
}

/// Closed-form formula. O(1) time and space.
pub fn sum_to_n_b(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    n * (n + 1) / 2
}

/// Recursive decomposition. O(n) time and O(n) call depth; very large `n` can
/// exhaust the stack.
pub fn sum_to_n_c(n: i64) -> i64 {
    if n <= 0 {
        return 0;
    }
    if n == 1 {
        return 1;
    }
    n + sum_to_n_c(n - 1)
}
