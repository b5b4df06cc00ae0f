//! Prime fields with a runtime-selected limb count.
//!
//! The `Field` type wraps a `ModField<N>` for any supported limb count
//! (4 to 16); the limb count is selected from the length of the modulus
//! encoding when the field is created. Elements are `FieldElement`
//! values. As with the backend types, an element does not know its
//! field; it must only be used with the `Field` instance that produced
//! it. Using an element with a field of a different limb count is a
//! contract violation and triggers a panic.
//!
//! For widths known at compile time, the aliases `Field256`, `Field320`,
//! `Field384`, `Field448` and `Field512` (with element types `Fe256`...)
//! avoid the dispatch.
//!
//! Predicates in this module return `bool` values; they are still
//! computed in constant-time, but the conversion to `bool` may allow the
//! compiler to branch on the result.

use num_bigint::BigUint;

use crate::backend::modfield::encode_raw;
use crate::backend::modfield::{MAX_LIMBS, MIN_LIMBS};
use crate::backend::{Fe, ModField};
use crate::{CryptoRng, FieldError, RngCore, String, Vec};

/// Field context for moduli of up to 256 bits.
pub type Field256 = ModField<4>;
/// Field context for moduli of up to 320 bits.
pub type Field320 = ModField<5>;
/// Field context for moduli of up to 384 bits.
pub type Field384 = ModField<6>;
/// Field context for moduli of up to 448 bits.
pub type Field448 = ModField<7>;
/// Field context for moduli of up to 512 bits.
pub type Field512 = ModField<8>;

pub type Fe256 = Fe<4>;
pub type Fe320 = Fe<5>;
pub type Fe384 = Fe<6>;
pub type Fe448 = Fe<7>;
pub type Fe512 = Fe<8>;

#[cold]
#[inline(never)]
fn width_mismatch() -> ! {
    panic!("field element limb count does not match the field");
}

macro_rules! define_field_dispatch { ($($v:ident => $n:literal),* $(,)?) => {

    /// A prime field whose limb count is selected at runtime.
    #[derive(Clone, Debug)]
    pub enum Field {
        $($v(ModField<$n>),)*
    }

    /// An element of a `Field` (in Montgomery representation). The
    /// variant matches the limb count of the field that created it.
    #[derive(Clone, Copy, Debug)]
    pub enum FieldElement {
        $($v(Fe<$n>),)*
    }

    impl FieldElement {

        /// Get the number of 64-bit limbs of this element.
        pub fn limb_count(&self) -> usize {
            match self {
                $(FieldElement::$v(_) => $n,)*
            }
        }
    }

    impl Field {

        /// Create a field from the modulus, in unsigned big-endian
        /// encoding. The encoding length must be a multiple of 8 and
        /// selects the limb count, which must be in the 4 to 16 range.
        /// The modulus must be odd (and greater than 1).
        pub fn new(modulus: &[u8]) -> Result<Self, FieldError> {
            if (modulus.len() & 7) != 0 {
                return Err(FieldError::InvalidModulusLength(modulus.len()));
            }
            match modulus.len() >> 3 {
                $($n => Ok(Field::$v(ModField::<$n>::from_bytes_be(modulus)?)),)*
                n => Err(FieldError::UnsupportedLimbCount(n)),
            }
        }

        /// Get the number of 64-bit limbs used for the modulus and the
        /// field elements.
        pub fn limb_count(&self) -> usize {
            match self {
                $(Field::$v(_) => $n,)*
            }
        }

        /// Get the modulus as a big integer.
        pub fn modulus(&self) -> &BigUint {
            match self {
                $(Field::$v(f) => f.modulus_biguint(),)*
            }
        }

        /// Get the bit length of the modulus.
        pub fn bit_length(&self) -> u32 {
            match self {
                $(Field::$v(f) => f.bit_length(),)*
            }
        }

        pub fn zero(&self) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.zero()),)*
            }
        }

        pub fn one(&self) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.one()),)*
            }
        }

        /// Get the element whose value is `R mod p`.
        pub fn montgomery_r(&self) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.montgomery_r()),)*
            }
        }

        pub fn from_u64(&self, x: u64) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.from_u64(x)),)*
            }
        }

        pub fn from_i64(&self, x: i64) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.from_i64(x)),)*
            }
        }

        /// Decode an element from exactly `byte_len()` bytes (unsigned
        /// big-endian). The value must be lower than the modulus.
        pub fn from_bytes(&self, buf: &[u8]) -> Result<FieldElement, FieldError> {
            match self {
                $(Field::$v(f) => Ok(FieldElement::$v(f.decode(buf)?)),)*
            }
        }

        /// Decode bytes of any length (unsigned big-endian) into an
        /// element, with reduction modulo p.
        pub fn from_bytes_reduce(&self, buf: &[u8]) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.decode_reduce(buf)),)*
            }
        }

        /// Convert a big integer (lower than the modulus) into an element.
        pub fn element_from_biguint(&self, x: &BigUint)
            -> Result<FieldElement, FieldError>
        {
            match self {
                $(Field::$v(f) => Ok(FieldElement::$v(f.from_biguint(x)?)),)*
            }
        }

        /// Parse an element from a hexadecimal string (optional "0x"
        /// prefix).
        pub fn from_hex(&self, s: &str) -> Result<FieldElement, FieldError> {
            match self {
                $(Field::$v(f) => Ok(FieldElement::$v(f.from_hex(s)?)),)*
            }
        }

        /// Parse an element from a decimal string, or hexadecimal with a
        /// "0x" prefix.
        pub fn from_str(&self, s: &str) -> Result<FieldElement, FieldError> {
            match self {
                $(Field::$v(f) => Ok(FieldElement::$v(f.from_str(s)?)),)*
            }
        }

        /// Get a uniformly random element (rejection sampling below the
        /// modulus).
        pub fn random<T: CryptoRng + RngCore>(&self, rng: &mut T) -> FieldElement {
            match self {
                $(Field::$v(f) => FieldElement::$v(f.random(rng)),)*
            }
        }

        /// Encode an element over exactly `byte_len()` bytes (unsigned
        /// big-endian, canonical).
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn to_bytes(&self, x: &FieldElement) -> Vec<u8> {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a)) => f.encode(a),)*
                _ => width_mismatch(),
            }
        }

        /// Encode an element as lowercase hexadecimal (`2*byte_len()`
        /// digits).
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn to_hex(&self, x: &FieldElement) -> String {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a)) => f.to_hex(a),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn to_biguint(&self, x: &FieldElement) -> BigUint {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a)) => f.to_biguint(a),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn add(&self, x: &FieldElement, y: &FieldElement) -> FieldElement {
            match (self, x, y) {
                $((Field::$v(f), FieldElement::$v(a), FieldElement::$v(b))
                    => FieldElement::$v(f.add(a, b)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn sub(&self, x: &FieldElement, y: &FieldElement) -> FieldElement {
            match (self, x, y) {
                $((Field::$v(f), FieldElement::$v(a), FieldElement::$v(b))
                    => FieldElement::$v(f.sub(a, b)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn mul(&self, x: &FieldElement, y: &FieldElement) -> FieldElement {
            match (self, x, y) {
                $((Field::$v(f), FieldElement::$v(a), FieldElement::$v(b))
                    => FieldElement::$v(f.mul(a, b)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn neg(&self, x: &FieldElement) -> FieldElement {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => FieldElement::$v(f.neg(a)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn double(&self, x: &FieldElement) -> FieldElement {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => FieldElement::$v(f.double(a)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn half(&self, x: &FieldElement) -> FieldElement {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => FieldElement::$v(f.half(a)),)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn square(&self, x: &FieldElement) -> FieldElement {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => FieldElement::$v(f.square(a)),)*
                _ => width_mismatch(),
            }
        }

        /// Raise an element to the power `e` (not reduced modulo `p - 1`).
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn exp(&self, x: &FieldElement, e: &BigUint) -> FieldElement {
            let ee = e.to_u64_digits();
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => FieldElement::$v(f.exp(a, &ee)),)*
                _ => width_mismatch(),
            }
        }

        /// Invert an element (binary GCD, "up" variant). Zero, and values
        /// that are not invertible modulo a composite modulus, are
        /// reported as errors. This function is not constant-time.
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn inverse(&self, x: &FieldElement) -> Result<FieldElement, FieldError> {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => Ok(FieldElement::$v(f.invert_vartime(a)?)),)*
                _ => width_mismatch(),
            }
        }

        /// Invert an element (binary GCD, "down" variant); the inverse is
        /// returned as a plain integer. This function is not
        /// constant-time.
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn inverse_plain(&self, x: &FieldElement) -> Result<BigUint, FieldError> {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => Ok(BigUint::from_bytes_be(
                        &encode_raw(&f.invert_down_vartime(a)?))),)*
                _ => width_mismatch(),
            }
        }

        /// Invert an element with the textbook extended binary GCD. This
        /// function is not constant-time.
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn inverse_gcd(&self, x: &FieldElement) -> Result<FieldElement, FieldError> {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a))
                    => Ok(FieldElement::$v(f.invert_gcd_vartime(a)?)),)*
                _ => width_mismatch(),
            }
        }

        /// Invert all elements of a slice, in place (zeros are left
        /// unchanged). On error, the slice is unmodified. This function
        /// is not constant-time.
        ///
        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn batch_invert(&self, xx: &mut [FieldElement]) -> Result<(), FieldError> {
            match self {
                $(Field::$v(f) => {
                    let mut tt = Vec::with_capacity(xx.len());
                    for x in xx.iter() {
                        match x {
                            FieldElement::$v(a) => tt.push(*a),
                            _ => width_mismatch(),
                        }
                    }
                    f.batch_invert_vartime(&mut tt[..])?;
                    for (x, t) in xx.iter_mut().zip(tt) {
                        *x = FieldElement::$v(t);
                    }
                    Ok(())
                })*
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn equal(&self, x: &FieldElement, y: &FieldElement) -> bool {
            match (self, x, y) {
                $((Field::$v(f), FieldElement::$v(a), FieldElement::$v(b))
                    => f.equals(a, b) != 0,)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn is_zero(&self, x: &FieldElement) -> bool {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a)) => f.iszero(a) != 0,)*
                _ => width_mismatch(),
            }
        }

        /// # Panics
        ///
        /// Panics if an element does not have the limb count of this field.
        pub fn is_one(&self, x: &FieldElement) -> bool {
            match (self, x) {
                $((Field::$v(f), FieldElement::$v(a)) => f.isone(a) != 0,)*
                _ => width_mismatch(),
            }
        }
    }

} } // End of macro: define_field_dispatch

define_field_dispatch! {
    L4 => 4, L5 => 5, L6 => 6, L7 => 7, L8 => 8, L9 => 9, L10 => 10,
    L11 => 11, L12 => 12, L13 => 13, L14 => 14, L15 => 15, L16 => 16,
}

impl Field {

    /// Create a field from a modulus given as a big integer. The limb
    /// count is the smallest that fits the modulus, but at least 4.
    pub fn from_biguint(modulus: &BigUint) -> Result<Self, FieldError> {
        let bb = modulus.to_bytes_be();
        let n = core::cmp::max(MIN_LIMBS, (bb.len() + 7) >> 3);
        if n > MAX_LIMBS {
            return Err(FieldError::UnsupportedLimbCount(n));
        }
        let mut buf = [0u8; MAX_LIMBS << 3];
        let buf = &mut buf[..(n << 3)];
        let off = buf.len() - bb.len();
        buf[off..].copy_from_slice(&bb);
        Self::new(buf)
    }

    /// Get the element encoding length, in bytes.
    pub fn byte_len(&self) -> usize {
        self.limb_count() << 3
    }
}

#[cfg(test)]
mod tests {

    use super::{Field, FieldElement, Field256, Field384};
    use crate::backend::modfield::test_util::DRNG;
    use crate::{BigUint, FieldError};

    const P25519: &str =
        "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffed";

    fn mkfield(hexmod: &str, nbytes: usize) -> Field {
        let bb = hex::decode(hexmod).unwrap();
        let mut buf = [0u8; 128];
        let off = nbytes - bb.len();
        buf[off..nbytes].copy_from_slice(&bb);
        Field::new(&buf[..nbytes]).unwrap()
    }

    #[test]
    fn scenario_25519() {
        let f = mkfield(P25519, 32);
        assert!(f.limb_count() == 4);
        assert!(f.byte_len() == 32);
        assert!(f.bit_length() == 255);
        let zp = f.modulus().clone();
        assert!(zp == (BigUint::from(1u32) << 255) - 19u32);

        let mut enc = [0u8; 32];
        enc[31] = 2;
        let a = f.from_bytes(&enc).unwrap();
        let c = f.mul(&a, &a);
        let mut four = [0u8; 32];
        four[31] = 4;
        assert!(f.to_bytes(&c) == four);

        let e = f.exp(&a, &(&zp - 1u32));
        assert!(f.is_one(&e));
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(f.to_bytes(&e) == one);

        let ia = f.inverse(&a).unwrap();
        let d = f.mul(&ia, &a);
        assert!(f.to_bytes(&d) == one);
        assert!(f.equal(&f.inverse_gcd(&a).unwrap(), &ia));
        assert!(f.inverse_plain(&a).unwrap() == (&zp + 1u32) >> 1);

        // p itself does not decode; p - 1 does.
        let pb = zp.to_bytes_be();
        assert!(f.from_bytes(&pb).err() == Some(FieldError::NotCanonical));
        let pm1 = (&zp - 1u32).to_bytes_be();
        let x = f.from_bytes(&pm1).unwrap();
        assert!(f.equal(&x, &f.neg(&f.one())));
        assert!(f.to_bytes(&x) == pm1);
    }

    #[test]
    fn construction() {
        // Byte length not a multiple of 8.
        assert!(Field::new(&[0xFFu8; 33]).err()
            == Some(FieldError::InvalidModulusLength(33)));
        // Limb counts out of range.
        assert!(Field::new(&[0xFFu8; 24]).err()
            == Some(FieldError::UnsupportedLimbCount(3)));
        assert!(Field::new(&[0xFFu8; 136]).err()
            == Some(FieldError::UnsupportedLimbCount(17)));
        // Even modulus.
        let mut buf = [0xFFu8; 40];
        buf[39] = 0xFE;
        assert!(Field::new(&buf).err() == Some(FieldError::EvenModulus));
        // Every supported limb count.
        for n in 4..=16 {
            let f = Field::new(&[0xFFu8; 128][..(n << 3)]).unwrap();
            assert!(f.limb_count() == n);
            assert!(f.one().limb_count() == n);
            assert!(f.bit_length() == (n as u32) << 6);
        }

        // From a big integer: at least 4 limbs, otherwise rounded up.
        let f = Field::from_biguint(&BigUint::from(1000003u32)).unwrap();
        assert!(f.limb_count() == 4);
        assert!(f.bit_length() == 20);
        let zp = (BigUint::from(1u32) << 321) - 9u32;
        let f = Field::from_biguint(&zp).unwrap();
        assert!(f.limb_count() == 6);
        assert!(f.modulus() == &zp);
        assert!(Field::from_biguint(&BigUint::from(1u32)).err()
            == Some(FieldError::ModulusTooSmall));
        assert!(Field::from_biguint(&BigUint::from(0u32)).err()
            == Some(FieldError::EvenModulus));
        assert!(Field::from_biguint(&(BigUint::from(1u32) << 1024)).err()
            == Some(FieldError::UnsupportedLimbCount(17)));
    }

    #[test]
    fn dispatch_ops() {
        // 2^521 - 1 over 9 limbs, 2^255 - 19 over 4 limbs
        let zp = (BigUint::from(1u32) << 521) - 1u32;
        let mut rng = DRNG::from_seed(b"dispatch");
        for f in [Field::from_biguint(&zp).unwrap(), mkfield(P25519, 32)] {
            let zp = f.modulus().clone();
            for _ in 0..20 {
                let a = f.random(&mut rng);
                let b = f.random(&mut rng);
                let za = f.to_biguint(&a);
                let zb = f.to_biguint(&b);
                assert!(za < zp && zb < zp);

                assert!(f.to_biguint(&f.add(&a, &b)) == (&za + &zb) % &zp);
                assert!(f.to_biguint(&f.sub(&a, &b))
                    == (&zp + &za - &zb) % &zp);
                assert!(f.to_biguint(&f.mul(&a, &b)) == (&za * &zb) % &zp);
                assert!(f.to_biguint(&f.square(&a)) == (&za * &za) % &zp);
                assert!(f.to_biguint(&f.neg(&a)) == (&zp - &za) % &zp);
                assert!(f.to_biguint(&f.double(&a)) == (&za << 1) % &zp);
                assert!(f.equal(&f.double(&f.half(&a)), &a));
                let e = BigUint::from(0x1234567u32);
                assert!(f.to_biguint(&f.exp(&a, &e)) == za.modpow(&e, &zp));

                let bb = f.to_bytes(&a);
                assert!(bb.len() == f.byte_len());
                assert!(f.equal(&f.from_bytes(&bb).unwrap(), &a));
                assert!(f.equal(&f.from_hex(&f.to_hex(&a)).unwrap(), &a));
                let ds = za.to_str_radix(10);
                assert!(f.equal(&f.from_str(&ds).unwrap(), &a));
                assert!(f.equal(&f.element_from_biguint(&za).unwrap(), &a));
                let mut wide = [0u8; 200];
                wide[(200 - bb.len())..].copy_from_slice(&bb);
                assert!(f.equal(&f.from_bytes_reduce(&wide), &a));

                if !f.is_zero(&a) {
                    let ia = f.inverse(&a).unwrap();
                    assert!(f.is_one(&f.mul(&ia, &a)));
                    let zi = f.inverse_plain(&a).unwrap();
                    assert!(zi == f.to_biguint(&ia));
                }
            }

            let z = f.zero();
            assert!(f.is_zero(&z));
            assert!(f.inverse(&z).err() == Some(FieldError::NotInvertible));
            assert!(f.inverse_plain(&z).err() == Some(FieldError::NotInvertible));
            assert!(f.inverse_gcd(&z).err() == Some(FieldError::NotInvertible));
            assert!(f.is_one(&f.inverse(&f.one()).unwrap()));
            assert!(f.equal(&f.from_i64(-1), &f.neg(&f.from_u64(1))));
            let r = (BigUint::from(1u32) << (f.limb_count() << 6)) % &zp;
            assert!(f.to_biguint(&f.montgomery_r()) == r);

            let mut xx = [f.from_u64(3), f.zero(), f.from_i64(-7)];
            f.batch_invert(&mut xx).unwrap();
            assert!(f.is_one(&f.mul(&xx[0], &f.from_u64(3))));
            assert!(f.is_zero(&xx[1]));
            assert!(f.is_one(&f.mul(&xx[2], &f.from_i64(-7))));
        }
    }

    #[test]
    fn decoding_errors() {
        let f = mkfield(P25519, 32);
        assert!(f.from_bytes(&[0u8; 31]).err()
            == Some(FieldError::InvalidLength { expected: 32, actual: 31 }));
        assert!(f.from_hex("0xzz").err() == Some(FieldError::InvalidString));
        assert!(f.from_hex("").err() == Some(FieldError::InvalidString));
        assert!(f.from_str("12a").err() == Some(FieldError::InvalidString));
        assert!(f.from_hex(P25519).err() == Some(FieldError::NotCanonical));
        assert!(f.is_one(&f.from_hex("0x1").unwrap()));
        assert!(f.to_biguint(&f.from_str("123456789").unwrap())
            == BigUint::from(123456789u32));
    }

    #[test]
    #[should_panic(expected = "limb count does not match")]
    fn width_mismatch() {
        let f4 = mkfield(P25519, 32);
        let f5 = mkfield(P25519, 40);
        let _ = f4.add(&f4.one(), &f5.one());
    }

    #[test]
    #[should_panic(expected = "limb count does not match")]
    fn width_mismatch_encode() {
        let f4 = mkfield(P25519, 32);
        let f5 = mkfield(P25519, 40);
        let _ = f5.to_bytes(&f4.from_u64(3));
    }

    #[test]
    #[should_panic(expected = "limb count does not match")]
    fn width_mismatch_batch() {
        let f4 = mkfield(P25519, 32);
        let f5 = mkfield(P25519, 40);
        let mut xx = [f4.from_u64(2), f5.from_u64(3)];
        let _ = f4.batch_invert(&mut xx);
    }

    #[test]
    fn fixed_width_aliases() {
        let p = [0xFFFFFFFFFFFFFFEDu64, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF];
        let f = Field256::new(p).unwrap();
        let a = f.from_u64(2);
        assert!(f.isone(&f.mul(&a, &f.invert_vartime(&a).unwrap())) != 0);

        let p384 = [0x00000000FFFFFFFFu64, 0xFFFFFFFF00000000,
            0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFF];
        let f = Field384::new(p384).unwrap();
        let x = f.from_i64(-5);
        let y = FieldElement::L6(x);
        assert!(y.limb_count() == 6);
        assert!(f.equals(&f.add(&x, &f.from_u64(5)), &f.zero()) != 0);
    }
}
