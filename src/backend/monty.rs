//! Montgomery multiplication and reduction.
//!
//! For a modulus `p` over `N` limbs, `R = 2^(64*N)`. Montgomery
//! multiplication of `a` and `b` yields `a*b/R mod p`; the constant
//! `inp = -1/p mod 2^64` drives the reduction (one quotient word
//! `u = w0*inp mod 2^64` per limb).

use super::{addcarry_u64, subborrow_u64, umull_add, umull_add2};
use super::limbs;

/// Return -1/x mod 2^64. It is assumed that x is odd.
pub const fn ninv64(x: u64) -> u64 {
    let y = 2u64.wrapping_sub(x);
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    let y = y.wrapping_mul(2u64.wrapping_sub(y.wrapping_mul(x)));
    y.wrapping_neg()
}

/// Montgomery multiplication: return `a*b/R mod p`.
///
/// Multiplication and reduction are interleaved (CIOS): for each limb
/// of `b`, the partial product is accumulated and one reduction word is
/// folded in immediately, so that the accumulator fits in `N` limbs
/// plus one carry bit. The result is correct and fully reduced provided
/// that `a*b < p*R`; this holds in particular when one operand is lower
/// than `p` and the other fits on `N` limbs.
pub fn mont_mul<const N: usize>(a: &[u64; N], b: &[u64; N],
    p: &[u64; N], inp: u64) -> [u64; N]
{
    let mut t = [0u64; N];

    // combined muls + reduction
    let mut cch = 0;
    for i in 0..N {
        let f = b[i];
        let (lo, mut cc1) = umull_add(f, a[0], t[0]);
        let g = lo.wrapping_mul(inp);
        let (_, mut cc2) = umull_add(g, p[0], lo);
        for j in 1..N {
            let (d, hi1) = umull_add2(f, a[j], t[j], cc1);
            cc1 = hi1;
            let (d, hi2) = umull_add2(g, p[j], d, cc2);
            cc2 = hi2;
            t[j - 1] = d;
        }
        let (d, ee) = addcarry_u64(cc1, cc2, cch);
        t[N - 1] = d;
        cch = ee;
    }

    // final reduction: subtract modulus if necessary
    let mut cc = 0;
    for i in 0..N {
        (t[i], cc) = subborrow_u64(t[i], p[i], cc);
    }
    let mm = (cch as u64).wrapping_sub(cc as u64);
    cc = 0;
    for i in 0..N {
        (t[i], cc) = addcarry_u64(t[i], mm & p[i], cc);
    }
    t
}

/// Montgomery squaring: return `a*a/R mod p`.
#[inline(always)]
pub fn mont_square<const N: usize>(a: &[u64; N],
    p: &[u64; N], inp: u64) -> [u64; N]
{
    mont_mul(a, a, p, inp)
}

/// Montgomery reduction: set `a` to `a/R mod p`. The input may be any
/// `N`-limb value; the output is at most `p` (it may be equal to `p`
/// only if the input was not lower than `p`).
pub fn mont_reduce<const N: usize>(a: &mut [u64; N], p: &[u64; N], inp: u64) {
    for _ in 0..N {
        let f = a[0].wrapping_mul(inp);
        let (_, mut cc) = umull_add(f, p[0], a[0]);
        for i in 1..N {
            let (d, hi) = umull_add2(f, p[i], a[i], cc);
            a[i - 1] = d;
            cc = hi;
        }
        a[N - 1] = cc;
    }
}

/// Compute `2^k mod p` by repeated modular doubling.
pub fn pow2mod<const N: usize>(k: usize, p: &[u64; N]) -> [u64; N] {
    let mut d = [0u64; N];
    d[0] = 1;
    for _ in 0..k {
        limbs::mod_double(&mut d, p);
    }
    d
}
