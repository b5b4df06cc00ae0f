//! Limb-vector primitives.
//!
//! These functions operate on `[u64; N]` arrays representing unsigned
//! integers in base 2^64 (least significant limb first). Raw operations
//! (`add_in_place()`, `sub_in_place()`, `shl1()`, `shr1()`) work over
//! plain integers and report the outgoing carry or borrow; modular
//! operations (`mod_add()`, `mod_sub()`, `mod_double()`, `mod_neg()`,
//! `mod_half()`) receive the modulus explicitly and expect operands in
//! the 0 to p-1 range, which they maintain. Modular operations are
//! constant-time. `compare()`, `is_zero()`, `is_one()` and `bit_length()`
//! are not, and are meant for the binary GCD and other vartime code.

use core::cmp::Ordering;

use super::{addcarry_u64, subborrow_u64};

/// Add `b` to `a` (in place); the outgoing carry (0 or 1) is returned.
#[inline]
pub fn add_in_place<const N: usize>(a: &mut [u64; N], b: &[u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = addcarry_u64(a[i], b[i], cc);
    }
    cc
}

/// Subtract `b` from `a` (in place); the outgoing borrow (0 or 1) is
/// returned.
#[inline]
pub fn sub_in_place<const N: usize>(a: &mut [u64; N], b: &[u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        (a[i], cc) = subborrow_u64(a[i], b[i], cc);
    }
    cc
}

/// Left-shift `a` by one bit (in place); the dropped top bit is returned.
#[inline]
pub fn shl1<const N: usize>(a: &mut [u64; N]) -> u8 {
    let mut cc = 0;
    for i in 0..N {
        let w = a[i];
        a[i] = (w << 1) | cc;
        cc = w >> 63;
    }
    cc as u8
}

/// Right-shift `a` by one bit (in place); `hi` (0 or 1) is inserted
/// as the new top bit.
#[inline]
pub fn shr1<const N: usize>(a: &mut [u64; N], hi: u8) {
    for i in 0..(N - 1) {
        a[i] = (a[i] >> 1) | (a[i + 1] << 63);
    }
    a[N - 1] = (a[N - 1] >> 1) | ((hi as u64) << 63);
}

#[inline(always)]
pub fn is_even<const N: usize>(a: &[u64; N]) -> bool {
    (a[0] & 1) == 0
}

pub fn is_zero<const N: usize>(a: &[u64; N]) -> bool {
    a.iter().all(|&w| w == 0)
}

pub fn is_one<const N: usize>(a: &[u64; N]) -> bool {
    a[0] == 1 && a[1..].iter().all(|&w| w == 0)
}

/// Compare two integers, most significant limbs first.
pub fn compare<const N: usize>(a: &[u64; N], b: &[u64; N]) -> Ordering {
    for i in (0..N).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Get the bit length of an integer (0 for zero).
pub fn bit_length<const N: usize>(a: &[u64; N]) -> u32 {
    for i in (0..N).rev() {
        if a[i] != 0 {
            return ((i as u32) << 6) + 64 - a[i].leading_zeros();
        }
    }
    0
}

/// Return 0xFFFFFFFF if `a` and `b` are equal, 0x00000000 otherwise
/// (constant-time).
#[inline]
pub fn equals<const N: usize>(a: &[u64; N], b: &[u64; N]) -> u32 {
    let mut r = 0;
    for i in 0..N {
        r |= a[i] ^ b[i];
    }
    ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
}

/// Return 0xFFFFFFFF if `a` is zero, 0x00000000 otherwise
/// (constant-time).
#[inline]
pub fn iszero<const N: usize>(a: &[u64; N]) -> u32 {
    let mut r = 0;
    for i in 0..N {
        r |= a[i];
    }
    ((r | r.wrapping_neg()) >> 63).wrapping_sub(1) as u32
}

/// Set `d` to `a` if `ctl` is 0xFFFFFFFF; leave it unchanged if `ctl`
/// is 0x00000000.
#[inline]
pub fn cond_copy<const N: usize>(d: &mut [u64; N], a: &[u64; N], ctl: u32) {
    let cw = ((ctl as i32) as i64) as u64;
    for i in 0..N {
        d[i] ^= cw & (d[i] ^ a[i]);
    }
}

/// Return 0xFFFFFFFF if `a < p`, 0x00000000 otherwise (constant-time).
#[inline]
pub fn lt<const N: usize>(a: &[u64; N], p: &[u64; N]) -> u32 {
    let mut cc = 0;
    for i in 0..N {
        (_, cc) = subborrow_u64(a[i], p[i], cc);
    }
    (cc as u32).wrapping_neg()
}

/// Modular addition: `d <- d + b mod p`.
///
/// The raw sum is computed with its carry, then the modulus is
/// subtracted into a scratch value; the scratch value is kept unless
/// the subtraction borrowed without a carry from the addition. This
/// also tolerates `d + b` up to `2*p - 1` with one operand equal to `p`.
#[inline]
pub fn mod_add<const N: usize>(d: &mut [u64; N], b: &[u64; N], p: &[u64; N]) {
    let cc1 = add_in_place(d, b);
    let mut t = *d;
    let cc2 = sub_in_place(&mut t, p);
    let keep = (cc2 as u32).wrapping_neg() & !(cc1 as u32).wrapping_neg();
    cond_copy(d, &t, !keep);
}

/// Modular subtraction: `d <- d - b mod p`.
#[inline]
pub fn mod_sub<const N: usize>(d: &mut [u64; N], b: &[u64; N], p: &[u64; N]) {
    let cc1 = sub_in_place(d, b);
    let m = (cc1 as u64).wrapping_neg();
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = addcarry_u64(d[i], m & p[i], cc2);
    }
}

/// Modular doubling: `d <- 2*d mod p`.
#[inline]
pub fn mod_double<const N: usize>(d: &mut [u64; N], p: &[u64; N]) {
    let t = *d;
    mod_add(d, &t, p);
}

/// Modular negation: `d <- -d mod p` (zero stays zero).
#[inline]
pub fn mod_neg<const N: usize>(d: &mut [u64; N], p: &[u64; N]) {
    let mut cc1 = 0;
    for i in 0..N {
        (d[i], cc1) = subborrow_u64(0, d[i], cc1);
    }
    let m = (cc1 as u64).wrapping_neg();
    let mut cc2 = 0;
    for i in 0..N {
        (d[i], cc2) = addcarry_u64(d[i], m & p[i], cc2);
    }
}

/// Modular halving: `d <- d/2 mod p`. If `d` is odd, then the modulus
/// is added first, and the carry of that addition becomes the top bit
/// of the shifted value.
#[inline]
pub fn mod_half<const N: usize>(d: &mut [u64; N], p: &[u64; N]) {
    let m = (d[0] & 1).wrapping_neg();
    let mut cc = 0;
    for i in 0..N {
        (d[i], cc) = addcarry_u64(d[i], m & p[i], cc);
    }
    shr1(d, cc);
}

#[cfg(test)]
mod tests {

    use super::*;
    use core::cmp::Ordering;

    const P: [u64; 4] = [
        0xFFFFFFFFFFFFFFED, 0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
    ];
    const PM1: [u64; 4] = [
        0xFFFFFFFFFFFFFFEC, 0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
    ];

    #[test]
    fn raw_ops() {
        let mut a = [0xFFFFFFFFFFFFFFFFu64; 4];
        assert!(add_in_place(&mut a, &[1, 0, 0, 0]) == 1);
        assert!(is_zero(&a));
        assert!(sub_in_place(&mut a, &[1, 0, 0, 0]) == 1);
        assert!(a == [0xFFFFFFFFFFFFFFFF; 4]);

        let mut b = [0x8000000000000001u64, 0, 0, 0x8000000000000000];
        assert!(shl1(&mut b) == 1);
        assert!(b == [2, 1, 0, 0]);
        shr1(&mut b, 1);
        assert!(b == [0x8000000000000001, 0, 0, 0x8000000000000000]);

        assert!(is_even(&[2u64, 1, 1, 1]));
        assert!(!is_even(&[3u64, 0, 0, 0]));
        assert!(is_one(&[1u64, 0, 0, 0]));
        assert!(!is_one(&[1u64, 0, 1, 0]));
        assert!(compare(&P, &PM1) == Ordering::Greater);
        assert!(compare(&PM1, &P) == Ordering::Less);
        assert!(compare(&P, &P) == Ordering::Equal);
        assert!(bit_length(&P) == 255);
        assert!(bit_length(&[0u64; 4]) == 0);
        assert!(bit_length(&[1u64, 0, 0, 0]) == 1);
        assert!(lt(&PM1, &P) == 0xFFFFFFFF);
        assert!(lt(&P, &P) == 0);
        assert!(equals(&P, &P) == 0xFFFFFFFF);
        assert!(equals(&P, &PM1) == 0);
        assert!(iszero(&[0u64; 4]) == 0xFFFFFFFF);
        assert!(iszero(&P) == 0);
    }

    #[test]
    fn modular_ops() {
        // (p-1) + (p-1) = p-2
        let mut d = PM1;
        mod_add(&mut d, &PM1, &P);
        let mut e = PM1;
        sub_in_place(&mut e, &[1, 0, 0, 0]);
        assert!(d == e);

        // 0 - 1 = p-1
        let mut d = [0u64; 4];
        mod_sub(&mut d, &[1, 0, 0, 0], &P);
        assert!(d == PM1);

        // -0 = 0, -1 = p-1
        let mut d = [0u64; 4];
        mod_neg(&mut d, &P);
        assert!(is_zero(&d));
        let mut d = [1u64, 0, 0, 0];
        mod_neg(&mut d, &P);
        assert!(d == PM1);

        // 2*(p-1) = p-2, and half of it is p-1 again
        let mut d = PM1;
        mod_double(&mut d, &P);
        assert!(d == e);
        mod_half(&mut d, &P);
        assert!(d == PM1);

        // 1/2 = (p+1)/2
        let mut d = [1u64, 0, 0, 0];
        mod_half(&mut d, &P);
        assert!(d == [0xFFFFFFFFFFFFFFF7, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0x3FFFFFFFFFFFFFFF]);

        // A modulus with the top bit set exercises the carry path.
        let q = [0xFFFFFFFFFFFFFF43u64, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF];
        let mut qm1 = q;
        sub_in_place(&mut qm1, &[1, 0, 0, 0]);
        let mut d = qm1;
        mod_add(&mut d, &qm1, &q);
        let mut qm2 = qm1;
        sub_in_place(&mut qm2, &[1, 0, 0, 0]);
        assert!(d == qm2);
        let mut d = qm1;
        mod_half(&mut d, &q);
        mod_double(&mut d, &q);
        assert!(d == qm1);
    }
}
