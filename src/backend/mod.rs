//! Montgomery arithmetic engine for prime fields.
//!
//! This module provides the field context `ModField<N>` and the element
//! type `Fe<N>`, for a modulus over `N` limbs of 64 bits (little-endian
//! limb order). The limb count is a compile-time parameter; the
//! runtime-dispatch layer in `crate::field` wraps the supported limb
//! counts (4 to 16) into a single type.
//!
//! The layers are, from the bottom up:
//!
//!  - Word primitives (this file): add-with-carry, subtract-with-borrow,
//!    and 64x64->128 multiplications with additions.
//!
//!  - `limbs`: limb-vector primitives over `[u64; N]`: raw carry/borrow
//!    propagating additions and subtractions, single-bit shifts,
//!    comparisons, and modular addition/subtraction/doubling/negation
//!    against an explicitly provided modulus.
//!
//!  - `monty`: Montgomery multiplication (CIOS), Montgomery reduction,
//!    squaring, and the computation of the Montgomery constants.
//!
//!  - `modfield`: the field context (modulus and derived constants) and
//!    all element operations, encodings and exponentiation.
//!
//!  - `inv`: modular inversion through the binary GCD (Kaliski's almost
//!    Montgomery inverse, and an extended binary GCD used as reference),
//!    and batch inversion.
//!
//! In general, the following properties apply to field contexts and
//! elements:
//!
//!  - An `Fe<N>` instance encapsulates a field element in Montgomery
//!    representation, always fully reduced (in the 0 to p-1 range). It
//!    does not know its modulus; it must be used with the context that
//!    created it.
//!
//!  - Plain (non-Montgomery) values are exchanged as `[u64; N]` arrays
//!    (`to_montgomery()` and `from_montgomery()` convert between the two
//!    representations).
//!
//!  - Function `set_cond(&self, x: &mut Fe<N>, a: &Fe<N>, ctl: u32)` sets
//!    `x` to the value of `a` if `ctl` is equal to 0xFFFFFFFF, or leaves
//!    it unmodified if `ctl` is equal to 0x00000000.
//!
//!  - Functions `equals()`, `iszero()` and `isone()` return 0xFFFFFFFF
//!    or 0x00000000.
//!
//!  - Function `encode(&self, x: &Fe<N>)` encodes an element as exactly
//!    `8*N` bytes, with unsigned big-endian convention. Encoding is
//!    always canonical.
//!
//!  - Function `decode(&self, buf: &[u8])` decodes exactly `8*N` bytes
//!    (big-endian). Values which are not lower than the modulus are
//!    rejected. Function `decode_ct()` does the same with a constant-time
//!    status, and `decode_reduce()` accepts any length and reduces the
//!    value modulo p.

pub mod limbs;
pub mod monty;
pub mod modfield;
pub mod inv;

pub use modfield::{Fe, ModField};

// Carrying addition and subtraction should use u64::carrying_add()
// and u64::borrowing_sub(), but these functions are currently only
// experimental.

// Add with carry; carry is 0 or 1.
// (x, y, c_in) -> x + y + c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[allow(unused_unsafe)]
pub(crate) fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_addcarry_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _addcarry_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

// Subtract with borrow; borrow is 0 or 1.
// (x, y, c_in) -> x - y - c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
#[allow(unused_unsafe)]
pub(crate) fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_subborrow_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _subborrow_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// Compute x*y+z over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add(x: u64, y: u64, z: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128)).wrapping_add(z as u128);
    (t as u64, (t >> 64) as u64)
}

// Compute x*y+z1+z2 over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull_add2(x: u64, y: u64, z1: u64, z2: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128))
        .wrapping_add(z1 as u128).wrapping_add(z2 as u128);
    (t as u64, (t >> 64) as u64)
}

#[cfg(test)]
mod tests {

    use super::{addcarry_u64, subborrow_u64, umull_add, umull_add2};

    #[test]
    fn word_ops() {
        assert!(addcarry_u64(0xFFFFFFFFFFFFFFFF, 1, 0) == (0, 1));
        assert!(addcarry_u64(0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF, 1)
            == (0xFFFFFFFFFFFFFFFF, 1));
        assert!(addcarry_u64(5, 7, 1) == (13, 0));
        assert!(subborrow_u64(0, 1, 0) == (0xFFFFFFFFFFFFFFFF, 1));
        assert!(subborrow_u64(0, 0, 1) == (0xFFFFFFFFFFFFFFFF, 1));
        assert!(subborrow_u64(13, 7, 1) == (5, 0));
        assert!(umull_add(0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF, 0)
            == (1, 0xFFFFFFFFFFFFFFFE));
        assert!(umull_add(0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF) == (0, 0xFFFFFFFFFFFFFFFF));
        assert!(umull_add2(0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF)
            == (0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF));
    }
}
