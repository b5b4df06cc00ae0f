//! Modular inversion through the binary GCD.
//!
//! `invert_vartime()` and `invert_down_vartime()` use Kaliski's almost
//! Montgomery inverse. Its first phase runs a binary GCD on `u = p` and
//! `v = x` (the internal value of the element) and yields `x^-1 * 2^k`
//! for an iteration count `k` with `n <= k <= 2*n` (`n` being the bit
//! length of the modulus). The second phase removes or adjusts the
//! `2^k` factor with modular doublings or halvings:
//!
//!  - "up" doubles until the factor is `2^(2*W)` (with `R = 2^W`), which
//!    gives `a^-1 * R` for an element `x = a*R`, i.e. the inverse in
//!    Montgomery representation;
//!
//!  - "down" brings the factor to `2^W`, which gives the plain integer
//!    `a^-1 mod p`.
//!
//! `invert_gcd_vartime()` uses the textbook extended binary GCD on plain
//! values; it is slower and serves as a cross-check.
//!
//! None of these functions is constant-time. They MUST NOT be applied
//! on secret values when side channels matter; for secret values, use
//! exponentiation by `p - 2` (Fermat's little theorem), which is
//! constant-time when the modulus is prime.

use core::cmp::Ordering;

use log::{debug, warn};

use super::limbs;
use super::modfield::{Fe, ModField};
use crate::{FieldError, Vec};

impl<const N: usize> ModField<N> {

    // First phase of Kaliski's algorithm. Returned values are
    // x^-1 * 2^k mod p (in the 1 to p-1 range) and k.
    fn almost_inverse(&self, x: &[u64; N]) -> Result<([u64; N], u32), FieldError> {
        let p = self.modulus();
        let mut u = *p;
        let mut v = *x;
        let mut s = [0u64; N];
        s[0] = 1;
        let mut r = [0u64; N];
        let mut k = 0u32;

        // Invariant: p = u*s + v*r. Since u >= 1 and v >= 1 for as long
        // as the loop runs, both r and s stay below p, except on the very
        // last iteration, where r is doubled while v reaches zero; that
        // final value of r is lower than 2*p and may spill out of N limbs.
        // Spilled bits are counted in z.
        let mut z = 0u32;
        let max = self.bit_length() << 1;
        while k < max {
            if limbs::is_zero(&v) {
                break;
            }
            if limbs::is_even(&u) {
                limbs::shr1(&mut u, 0);
                limbs::shl1(&mut s);
            } else if limbs::is_even(&v) {
                limbs::shr1(&mut v, 0);
                z += limbs::shl1(&mut r) as u32;
            } else if limbs::compare(&u, &v) == Ordering::Greater {
                limbs::sub_in_place(&mut u, &v);
                limbs::shr1(&mut u, 0);
                let cc = limbs::add_in_place(&mut r, &s);
                debug_assert!(cc == 0);
                limbs::shl1(&mut s);
            } else {
                limbs::sub_in_place(&mut v, &u);
                limbs::shr1(&mut v, 0);
                let cc = limbs::add_in_place(&mut s, &r);
                debug_assert!(cc == 0);
                z += limbs::shl1(&mut r) as u32;
            }
            k += 1;
        }

        if !limbs::is_zero(&v) {
            debug!("binary GCD did not converge in {} iterations", k);
            return Err(FieldError::NotInvertible);
        }
        if !limbs::is_one(&u) {
            // gcd(x, p) != 1 (this includes x = 0, for which u = p).
            debug!("value is not invertible (k = {})", k);
            return Err(FieldError::NotInvertible);
        }
        if k < self.bit_length() {
            warn!("binary GCD ended after {} iterations, below the {}-bit \
                modulus length", k, self.bit_length());
            return Err(FieldError::InversionFailure);
        }

        if z > 0 || limbs::compare(&r, p) != Ordering::Less {
            limbs::sub_in_place(&mut r, p);
        }
        let mut u = *p;
        limbs::sub_in_place(&mut u, &r);
        Ok((u, k))
    }

    /// Invert an element ("up" variant of the almost inverse): the result
    /// is the inverse, in Montgomery representation. If the element is
    /// not invertible (in particular if it is zero), then an error is
    /// returned and `x` is unmodified.
    ///
    /// This function is not constant-time.
    pub fn set_invert_vartime(&self, x: &mut Fe<N>) -> Result<(), FieldError> {
        let (mut u, k) = self.almost_inverse(&x.0)?;

        // u = x^-1 * 2^k; k <= 2*n <= 2*W.
        for _ in k..(Self::WIDTH << 1) {
            limbs::mod_double(&mut u, self.modulus());
        }
        x.0 = u;
        Ok(())
    }

    /// Invert an element; see `set_invert_vartime()`.
    #[inline]
    pub fn invert_vartime(&self, x: &Fe<N>) -> Result<Fe<N>, FieldError> {
        let mut r = *x;
        self.set_invert_vartime(&mut r)?;
        Ok(r)
    }

    /// Invert an element ("down" variant of the almost inverse): the
    /// result is the canonical integer value of the inverse (not in
    /// Montgomery representation).
    ///
    /// This function is not constant-time.
    pub fn invert_down_vartime(&self, x: &Fe<N>) -> Result<[u64; N], FieldError> {
        let (mut u, k) = self.almost_inverse(&x.0)?;

        // u = x^-1 * 2^k and we want x^-1 * 2^W. If the modulus is
        // shorter than W bits, then k may be lower than W.
        if k >= Self::WIDTH {
            for _ in Self::WIDTH..k {
                limbs::mod_half(&mut u, self.modulus());
            }
        } else {
            for _ in k..Self::WIDTH {
                limbs::mod_double(&mut u, self.modulus());
            }
        }
        Ok(u)
    }

    // Extended binary GCD on a plain value. Invariants:
    //    a*x1 = u mod p
    //    a*x2 = v mod p
    fn inverse_gcd_plain(&self, a: &[u64; N]) -> Result<[u64; N], FieldError> {
        let p = self.modulus();
        let mut u = *a;
        let mut v = *p;
        let mut x1 = [0u64; N];
        x1[0] = 1;
        let mut x2 = [0u64; N];
        while !limbs::is_one(&u) && !limbs::is_one(&v) {
            if limbs::is_zero(&u) || limbs::is_zero(&v) {
                debug!("value is not invertible");
                return Err(FieldError::NotInvertible);
            }
            while limbs::is_even(&u) {
                limbs::shr1(&mut u, 0);
                limbs::mod_half(&mut x1, p);
            }
            while limbs::is_even(&v) {
                limbs::shr1(&mut v, 0);
                limbs::mod_half(&mut x2, p);
            }
            if limbs::compare(&u, &v) != Ordering::Less {
                limbs::sub_in_place(&mut u, &v);
                limbs::mod_sub(&mut x1, &x2, p);
            } else {
                limbs::sub_in_place(&mut v, &u);
                limbs::mod_sub(&mut x2, &x1, p);
            }
        }
        if limbs::is_one(&u) {
            Ok(x1)
        } else {
            Ok(x2)
        }
    }

    /// Invert an element with the extended binary GCD (reference
    /// implementation). The element is converted out of Montgomery
    /// representation, inverted, and converted back.
    ///
    /// This function is not constant-time.
    pub fn invert_gcd_vartime(&self, x: &Fe<N>) -> Result<Fe<N>, FieldError> {
        let a = self.from_montgomery(x);
        let y = self.inverse_gcd_plain(&a)?;
        Ok(self.to_montgomery(&y))
    }

    /// Invert all elements of the slice (in place). Montgomery's trick is
    /// used: a single inversion is computed, and three multiplications
    /// per element. Elements of value zero are left unchanged. On error,
    /// the slice is unmodified.
    ///
    /// This function is not constant-time (in particular, it leaks which
    /// elements are zero).
    pub fn batch_invert_vartime(&self, xx: &mut [Fe<N>]) -> Result<(), FieldError> {
        // prefix[i] = product of all non-zero xx[j] for j < i
        let mut prefix = Vec::with_capacity(xx.len());
        let mut acc = self.one();
        for x in xx.iter() {
            prefix.push(acc);
            if self.iszero(x) == 0 {
                self.set_mul(&mut acc, x);
            }
        }
        self.set_invert_vartime(&mut acc)?;
        for i in (0..xx.len()).rev() {
            if self.iszero(&xx[i]) != 0 {
                continue;
            }
            let t = self.mul(&acc, &prefix[i]);
            self.set_mul(&mut acc, &xx[i]);
            xx[i] = t;
        }
        Ok(())
    }
}

// ========================================================================

#[cfg(test)]
macro_rules! define_inv_tests { ($n:expr, $modhex:expr, $bits:expr, $submod:ident) => {

    mod $submod {

    use super::super::super::ModField;
    use super::super::super::modfield::test_util::DRNG;
    use crate::FieldError;
    use num_bigint::BigUint;

    const N: usize = $n;

    fn mkfield() -> (ModField<N>, BigUint) {
        let zp = BigUint::parse_bytes($modhex.as_bytes(), 16).unwrap();
        let mut w = [0u64; N];
        let dd = zp.to_u64_digits();
        w[..dd.len()].copy_from_slice(&dd);
        let f = ModField::<N>::new(w).unwrap();
        assert!(f.bit_length() == $bits);
        (f, zp)
    }

    #[test]
    fn inversion() {
        let (f, zp) = mkfield();
        let pm2 = (&zp - 2u32).to_u64_digits();
        let mut rng = DRNG::from_seed(&(N as u64 + 1000).to_le_bytes());
        for _ in 0..50 {
            let a = f.random(&mut rng);
            if f.iszero(&a) != 0 {
                continue;
            }
            let ref_inv = f.exp(&a, &pm2);

            let b = f.invert_vartime(&a).unwrap();
            assert!(f.isone(&f.mul(&a, &b)) == 0xFFFFFFFF);
            assert!(f.equals(&b, &ref_inv) == 0xFFFFFFFF);

            let c = f.invert_down_vartime(&a).unwrap();
            assert!(c == f.from_montgomery(&ref_inv));

            let d = f.invert_gcd_vartime(&a).unwrap();
            assert!(f.equals(&d, &ref_inv) == 0xFFFFFFFF);

            let mut e = a;
            f.set_invert_vartime(&mut e).unwrap();
            f.set_invert_vartime(&mut e).unwrap();
            assert!(f.equals(&e, &a) == 0xFFFFFFFF);
        }
    }

    #[test]
    fn inversion_edge_cases() {
        let (f, zp) = mkfield();

        // Zero is not invertible.
        let z = f.zero();
        assert!(f.invert_vartime(&z).err() == Some(FieldError::NotInvertible));
        assert!(f.invert_down_vartime(&z).err()
            == Some(FieldError::NotInvertible));
        assert!(f.invert_gcd_vartime(&z).err()
            == Some(FieldError::NotInvertible));

        // 1 and -1 are their own inverses.
        let one = f.one();
        assert!(f.isone(&f.invert_vartime(&one).unwrap()) == 0xFFFFFFFF);
        assert!(f.isone(&f.invert_gcd_vartime(&one).unwrap()) == 0xFFFFFFFF);
        let mut o = [0u64; N];
        o[0] = 1;
        assert!(f.invert_down_vartime(&one).unwrap() == o);
        let m1 = f.neg(&one);
        assert!(f.equals(&f.invert_vartime(&m1).unwrap(), &m1) == 0xFFFFFFFF);

        // Small values, including elements whose internal value is 1
        // or 2 (these yield the shortest GCD runs).
        let mut small = [0u64; N];
        for i in 1..20u64 {
            let a = f.from_u64(i);
            let b = f.invert_vartime(&a).unwrap();
            assert!(f.isone(&f.mul(&a, &b)) == 0xFFFFFFFF);
            small[0] = i;
            let x = super::super::super::Fe(small);
            let y = f.invert_down_vartime(&x).unwrap();
            // x has value a = i/R; y is the plain integer a^-1 mod p.
            let zy = f.to_biguint(&f.to_montgomery(&y));
            let zx = f.to_biguint(&x);
            assert!((zx * zy) % &zp == BigUint::from(1u32));
            let y = f.invert_vartime(&x).unwrap();
            assert!(f.isone(&f.mul(&x, &y)) == 0xFFFFFFFF);
        }
    }

    #[test]
    fn batch_inversion() {
        let (f, _) = mkfield();
        let mut rng = DRNG::from_seed(b"batch");
        let mut xx = [f.zero(); 40];
        for i in 0..40 {
            xx[i] = f.random(&mut rng);
        }
        xx[7] = f.zero();
        let mut yy = xx;
        f.batch_invert_vartime(&mut yy[..]).unwrap();
        for i in 0..40 {
            if f.iszero(&xx[i]) != 0 {
                assert!(f.iszero(&yy[i]) == 0xFFFFFFFF);
            } else {
                assert!(f.isone(&f.mul(&xx[i], &yy[i])) == 0xFFFFFFFF);
            }
        }
        let mut empty: [super::super::super::Fe<N>; 0] = [];
        assert!(f.batch_invert_vartime(&mut empty[..]).is_ok());
    }

    } // end of module

} } // End of macro: define_inv_tests

#[cfg(test)]
mod tests {

    use super::super::modfield::ModField;
    use crate::FieldError;

    define_inv_tests!(4,
        "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed",
        255, gf25519);
    define_inv_tests!(4,
        "ffffffff00000001000000000000000000000000ffffffffffffffffffffffff",
        256, gfp256);
    define_inv_tests!(5,
        "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed",
        255, gf25519_l5);
    define_inv_tests!(6,
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffff0000000000000000ffffffff",
        384, gfp384);
    define_inv_tests!(7,
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffeffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        448, gf448);
    define_inv_tests!(8,
        "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffdc7",
        512, gf512);
    define_inv_tests!(16,
        "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff97",
        1024, gf1024);

    #[test]
    fn composite_modulus() {
        // p = 3 * (2^255 - 19): odd, but not prime.
        let q = [0xFFFFFFFFFFFFFFC7u64, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF, 1, 0];
        let f = ModField::<6>::new(q).unwrap();
        let three = f.from_u64(3);
        assert!(f.invert_vartime(&three).err()
            == Some(FieldError::NotInvertible));
        assert!(f.invert_down_vartime(&three).err()
            == Some(FieldError::NotInvertible));
        assert!(f.invert_gcd_vartime(&three).err()
            == Some(FieldError::NotInvertible));
        let mut xx = [f.from_u64(2), f.from_u64(6)];
        assert!(f.batch_invert_vartime(&mut xx).err()
            == Some(FieldError::NotInvertible));

        let two = f.from_u64(2);
        let h = f.invert_vartime(&two).unwrap();
        assert!(f.isone(&f.mul(&h, &two)) == 0xFFFFFFFF);
        let h = f.invert_gcd_vartime(&two).unwrap();
        assert!(f.isone(&f.mul(&h, &two)) == 0xFFFFFFFF);
    }

    #[test]
    fn small_modulus() {
        // With p = 7 (padded to 4 limbs) the loop count may equal the
        // modulus bit length exactly: the internal value 1 gives k = 3.
        let f = ModField::<4>::new([7, 0, 0, 0]).unwrap();
        let x = super::super::Fe([1u64, 0, 0, 0]);
        let y = f.invert_down_vartime(&x).unwrap();
        // x = 1 is the element a = 1/R; its inverse is R mod 7 = 2.
        assert!(y == [2, 0, 0, 0]);
        for i in 1..7u64 {
            let a = f.from_u64(i);
            let b = f.invert_vartime(&a).unwrap();
            assert!(f.isone(&f.mul(&a, &b)) == 0xFFFFFFFF);
        }
    }
}
