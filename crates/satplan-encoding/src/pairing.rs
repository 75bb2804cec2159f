//! Szudzik's pairing function over `u64`.
//!
//! Bijective between `N x N` and `N`, so `(entity, step)` keys never collide
//! regardless of how large either component grows. Inputs whose key would not
//! fit in a `u64` are rejected instead of wrapping.

/// Combines `(x, y)` into one key, `None` on overflow.
pub fn pair(x: u64, y: u64) -> Option<u64> {
    if x < y {
        y.checked_mul(y)?.checked_add(x)
    } else {
        x.checked_mul(x)?.checked_add(x)?.checked_add(y)
    }
}

/// Exact inverse of [`pair`].
pub fn unpair(z: u64) -> (u64, u64) {
    let s = z.isqrt();
    let r = z - s * s;
    if r < s {
        (r, s)
    } else {
        (s, r - s)
    }
}
