use log::{debug, trace};
use num_bigint::BigUint;

use super::{limbs, monty};
use crate::{CryptoRng, FieldError, RngCore, String, Vec};

/// Smallest supported limb count (256-bit moduli).
pub const MIN_LIMBS: usize = 4;

/// Largest supported limb count (1024-bit moduli).
pub const MAX_LIMBS: usize = 16;

/// A field element in Montgomery representation, over `N` limbs.
///
/// The element does not know its modulus; it must only be used with
/// the `ModField<N>` instance that produced it.
#[derive(Clone, Copy, Debug)]
pub struct Fe<const N: usize>(pub(crate) [u64; N]);

impl<const N: usize> Fe<N> {

    /// Get the internal (Montgomery) limbs of this element.
    #[inline(always)]
    pub fn montgomery_limbs(&self) -> &[u64; N] {
        &self.0
    }
}

/// Prime field context: modulus `p` over `N` limbs, and the derived
/// Montgomery constants.
///
/// The modulus MUST be odd. It SHOULD be prime; if it is not prime, all
/// ring operations still work, and inversion of non-invertible values
/// reports an error. The context is immutable once built.
#[derive(Clone, Debug)]
pub struct ModField<const N: usize> {
    // Modulus (little-endian order, 64-bit limbs).
    modulus: [u64; N],
    modulus_big: BigUint,
    bitlen: u32,
    // -1/p mod 2^64
    inp: u64,
    // R = 2^(64*N) mod p (Montgomery representation of 1)
    r: [u64; N],
    // R^2 mod p
    r2: [u64; N],
}

impl<const N: usize> ModField<N> {

    /// Element encoding length, in bytes.
    pub const ENC_LEN: usize = N << 3;

    // Montgomery width (R = 2^W).
    pub(crate) const WIDTH: u32 = (N as u32) << 6;

    /// Create a field context from the modulus limbs (little-endian
    /// order, least significant limb first).
    pub fn new(modulus: [u64; N]) -> Result<Self, FieldError> {
        if N < MIN_LIMBS || N > MAX_LIMBS {
            return Err(FieldError::UnsupportedLimbCount(N));
        }
        if limbs::is_even(&modulus) {
            return Err(FieldError::EvenModulus);
        }
        if limbs::is_one(&modulus) {
            return Err(FieldError::ModulusTooSmall);
        }
        let bitlen = limbs::bit_length(&modulus);
        let inp = monty::ninv64(modulus[0]);
        let r = monty::pow2mod(N << 6, &modulus);
        let r2 = monty::pow2mod(N << 7, &modulus);
        let modulus_big = BigUint::from_bytes_be(&encode_raw(&modulus));
        debug!("prime field: {} limbs, {}-bit modulus", N, bitlen);
        Ok(Self { modulus, modulus_big, bitlen, inp, r, r2 })
    }

    /// Create a field context from the modulus bytes (unsigned
    /// big-endian, exactly `8*N` bytes). A length which is a multiple
    /// of 8 but does not match `N` is reported as `InvalidLength`.
    pub fn from_bytes_be(buf: &[u8]) -> Result<Self, FieldError> {
        if (buf.len() & 7) != 0 {
            return Err(FieldError::InvalidModulusLength(buf.len()));
        }
        if buf.len() != Self::ENC_LEN {
            return Err(FieldError::InvalidLength {
                expected: Self::ENC_LEN,
                actual: buf.len(),
            });
        }
        Self::new(decode_raw(buf))
    }

    /// Get the modulus limbs (little-endian order).
    #[inline(always)]
    pub fn modulus(&self) -> &[u64; N] {
        &self.modulus
    }

    /// Get the modulus as a big integer.
    #[inline(always)]
    pub fn modulus_biguint(&self) -> &BigUint {
        &self.modulus_big
    }

    /// Get the bit length of the modulus.
    #[inline(always)]
    pub fn bit_length(&self) -> u32 {
        self.bitlen
    }

    /// Get the Montgomery constant `-1/p mod 2^64`.
    #[inline(always)]
    pub fn inp(&self) -> u64 {
        self.inp
    }

    // =================================================================
    // Constants and conversions.

    #[inline(always)]
    pub fn zero(&self) -> Fe<N> {
        Fe([0u64; N])
    }

    #[inline(always)]
    pub fn one(&self) -> Fe<N> {
        Fe(self.r)
    }

    /// Get the element whose value is `R mod p` (in Montgomery
    /// representation, i.e. internally `R^2 mod p`).
    #[inline(always)]
    pub fn montgomery_r(&self) -> Fe<N> {
        Fe(self.r2)
    }

    /// Convert a plain integer into Montgomery representation (the
    /// source is implicitly reduced modulo p).
    #[inline(always)]
    pub fn to_montgomery(&self, x: &[u64; N]) -> Fe<N> {
        Fe(monty::mont_mul(x, &self.r2, &self.modulus, self.inp))
    }

    /// Convert an element out of Montgomery representation; the result
    /// is the canonical integer (in the 0 to p-1 range).
    #[inline(always)]
    pub fn from_montgomery(&self, x: &Fe<N>) -> [u64; N] {
        let mut one = [0u64; N];
        one[0] = 1;
        monty::mont_mul(&x.0, &one, &self.modulus, self.inp)
    }

    /// Create an element from its 64-bit limbs, provided in little-endian
    /// order (least significant limb first). If the value is numerically
    /// larger than the modulus, then it is implicitly reduced.
    #[inline(always)]
    pub fn from_w64le(&self, x: [u64; N]) -> Fe<N> {
        self.to_montgomery(&x)
    }

    // Create an element by converting the provided integer.
    #[inline(always)]
    pub fn from_u64(&self, x: u64) -> Fe<N> {
        let mut d = [0u64; N];
        d[0] = x;
        self.to_montgomery(&d)
    }

    // Create an element by converting the provided integer.
    #[inline(always)]
    pub fn from_i64(&self, x: i64) -> Fe<N> {
        let mut r = self.from_u64(x.unsigned_abs());
        let mut nr = r;
        self.set_neg(&mut nr);
        self.set_cond(&mut r, &nr, (x >> 63) as u32);
        r
    }

    // =================================================================
    // Arithmetic. All operations are constant-time.

    #[inline(always)]
    pub fn set_add(&self, x: &mut Fe<N>, y: &Fe<N>) {
        limbs::mod_add(&mut x.0, &y.0, &self.modulus);
    }

    #[inline(always)]
    pub fn add(&self, x: &Fe<N>, y: &Fe<N>) -> Fe<N> {
        let mut r = *x;
        self.set_add(&mut r, y);
        r
    }

    #[inline(always)]
    pub fn set_sub(&self, x: &mut Fe<N>, y: &Fe<N>) {
        limbs::mod_sub(&mut x.0, &y.0, &self.modulus);
    }

    #[inline(always)]
    pub fn sub(&self, x: &Fe<N>, y: &Fe<N>) -> Fe<N> {
        let mut r = *x;
        self.set_sub(&mut r, y);
        r
    }

    // Negate an element (zero stays zero).
    #[inline(always)]
    pub fn set_neg(&self, x: &mut Fe<N>) {
        limbs::mod_neg(&mut x.0, &self.modulus);
    }

    #[inline(always)]
    pub fn neg(&self, x: &Fe<N>) -> Fe<N> {
        let mut r = *x;
        self.set_neg(&mut r);
        r
    }

    #[inline(always)]
    pub fn set_double(&self, x: &mut Fe<N>) {
        limbs::mod_double(&mut x.0, &self.modulus);
    }

    #[inline(always)]
    pub fn double(&self, x: &Fe<N>) -> Fe<N> {
        let mut r = *x;
        self.set_double(&mut r);
        r
    }

    #[inline(always)]
    pub fn set_half(&self, x: &mut Fe<N>) {
        limbs::mod_half(&mut x.0, &self.modulus);
    }

    #[inline(always)]
    pub fn half(&self, x: &Fe<N>) -> Fe<N> {
        let mut r = *x;
        self.set_half(&mut r);
        r
    }

    #[inline(always)]
    pub fn set_mul(&self, x: &mut Fe<N>, y: &Fe<N>) {
        x.0 = monty::mont_mul(&x.0, &y.0, &self.modulus, self.inp);
    }

    #[inline(always)]
    pub fn mul(&self, x: &Fe<N>, y: &Fe<N>) -> Fe<N> {
        Fe(monty::mont_mul(&x.0, &y.0, &self.modulus, self.inp))
    }

    #[inline(always)]
    pub fn set_square(&self, x: &mut Fe<N>) {
        x.0 = monty::mont_square(&x.0, &self.modulus, self.inp);
    }

    #[inline(always)]
    pub fn square(&self, x: &Fe<N>) -> Fe<N> {
        Fe(monty::mont_square(&x.0, &self.modulus, self.inp))
    }

    // Square an element n times.
    pub fn set_xsquare(&self, x: &mut Fe<N>, n: u32) {
        for _ in 0..n {
            self.set_square(x);
        }
    }

    #[inline(always)]
    pub fn xsquare(&self, x: &Fe<N>, n: u32) -> Fe<N> {
        let mut r = *x;
        self.set_xsquare(&mut r, n);
        r
    }

    /// Raise an element to the power `e`. The exponent is provided as
    /// 64-bit limbs in little-endian order, with any number of limbs;
    /// it is not reduced modulo `p - 1`. Left-to-right square-and-multiply
    /// is used, with the multiplications applied through a constant-time
    /// selection: only the bit length of `e` leaks.
    pub fn set_exp(&self, x: &mut Fe<N>, e: &[u64]) {
        let a = *x;
        let mut acc = self.one();
        let mut bl = e.len() << 6;
        while bl > 0 && ((e[(bl - 1) >> 6] >> ((bl - 1) & 63)) & 1) == 0 {
            bl -= 1;
        }
        for i in (0..bl).rev() {
            self.set_square(&mut acc);
            let t = self.mul(&acc, &a);
            let bit = ((e[i >> 6] >> (i & 63)) & 1) as u32;
            self.set_cond(&mut acc, &t, bit.wrapping_neg());
        }
        *x = acc;
    }

    #[inline(always)]
    pub fn exp(&self, x: &Fe<N>, e: &[u64]) -> Fe<N> {
        let mut r = *x;
        self.set_exp(&mut r, e);
        r
    }

    // =================================================================
    // Constant-time selection and comparisons.

    #[inline(always)]
    pub fn set_cond(&self, x: &mut Fe<N>, a: &Fe<N>, ctl: u32) {
        limbs::cond_copy(&mut x.0, &a.0, ctl);
    }

    #[inline(always)]
    pub fn select(&self, a0: &Fe<N>, a1: &Fe<N>, ctl: u32) -> Fe<N> {
        let mut r = *a0;
        self.set_cond(&mut r, a1, ctl);
        r
    }

    #[inline]
    pub fn cswap(&self, a: &mut Fe<N>, b: &mut Fe<N>, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..N {
            let t = cw & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }

    // Equality check (constant-time): returned value is 0xFFFFFFFF on
    // equality, 0 otherwise. Values have a single valid internal
    // representation, so this is a simple comparison.
    #[inline(always)]
    pub fn equals(&self, x: &Fe<N>, y: &Fe<N>) -> u32 {
        limbs::equals(&x.0, &y.0)
    }

    #[inline(always)]
    pub fn iszero(&self, x: &Fe<N>) -> u32 {
        limbs::iszero(&x.0)
    }

    #[inline(always)]
    pub fn isone(&self, x: &Fe<N>) -> u32 {
        limbs::equals(&x.0, &self.r)
    }

    // =================================================================
    // Encoding and decoding.

    /// Encode an element into exactly `8*N` bytes (unsigned big-endian
    /// encoding of the value, normalized to the 0 to p-1 range).
    pub fn encode(&self, x: &Fe<N>) -> Vec<u8> {
        encode_raw(&self.from_montgomery(x))
    }

    // Decode a value from bytes. If the provided slice length matches
    // the encoding length exactly (`Self::ENC_LEN`), _and_ the unsigned
    // big-endian interpretation of these bytes is an integer in the 0 to
    // p-1 range, then the corresponding element is returned, along with
    // the 0xFFFFFFFF status. Otherwise, zero and 0x00000000 are returned.
    // If the length is correct, then neither the value nor the outcome
    // leak through side channels.
    pub fn decode_ct(&self, buf: &[u8]) -> (Fe<N>, u32) {
        if buf.len() != Self::ENC_LEN {
            // We cannot hide from side-channels the length of the
            // input slice, so we can return early here.
            return (self.zero(), 0);
        }
        let mut d = decode_raw::<N>(buf);
        let r = limbs::lt(&d, &self.modulus);
        limbs::cond_copy(&mut d, &[0u64; N], !r);
        (self.to_montgomery(&d), r)
    }

    /// Decode an element from exactly `8*N` bytes (big-endian). Values
    /// which are not lower than the modulus are rejected.
    pub fn decode(&self, buf: &[u8]) -> Result<Fe<N>, FieldError> {
        if buf.len() != Self::ENC_LEN {
            return Err(FieldError::InvalidLength {
                expected: Self::ENC_LEN,
                actual: buf.len(),
            });
        }
        let (x, r) = self.decode_ct(buf);
        if r != 0 {
            Ok(x)
        } else {
            Err(FieldError::NotCanonical)
        }
    }

    /// Decode some bytes (unsigned big-endian, any length) into an
    /// element; the integer is reduced modulo p, so this never fails.
    pub fn decode_reduce(&self, buf: &[u8]) -> Fe<N> {
        let n = buf.len();
        if n == 0 {
            return self.zero();
        }

        // Chunks of 8*N bytes are processed in high-to-low order. The
        // current value is in Montgomery representation. For each new
        // chunk, we add the raw chunk value, _then_ Montgomery-multiply
        // by R^2, which both shifts the current value by one chunk and
        // converts the chunk to Montgomery representation. The raw
        // addition only needs to subtract the modulus on a carry, since
        // the Montgomery multiplication accepts unreduced inputs.
        let clen = Self::ENC_LEN;
        let mut j = n % clen;
        if j == 0 {
            j = clen;
        }
        let mut acc = self.to_montgomery(&decode_raw::<N>(&buf[..j]));
        while j < n {
            let x = decode_raw::<N>(&buf[j..(j + clen)]);
            let cc = limbs::add_in_place(&mut acc.0, &x);
            let m = (cc as u64).wrapping_neg();
            let mut mp = self.modulus;
            for w in mp.iter_mut() {
                *w &= m;
            }
            limbs::sub_in_place(&mut acc.0, &mp);
            acc.0 = monty::mont_mul(&acc.0, &self.r2,
                &self.modulus, self.inp);
            j += clen;
        }
        acc
    }

    /// Convert a big integer into an element; the integer must be lower
    /// than the modulus.
    pub fn from_biguint(&self, x: &BigUint) -> Result<Fe<N>, FieldError> {
        let bb = x.to_bytes_be();
        if bb.len() > Self::ENC_LEN {
            return Err(FieldError::NotCanonical);
        }
        let mut buf = [0u8; 128];
        let buf = &mut buf[..Self::ENC_LEN];
        buf[(Self::ENC_LEN - bb.len())..].copy_from_slice(&bb);
        self.decode(buf)
    }

    /// Get the canonical integer value of an element.
    pub fn to_biguint(&self, x: &Fe<N>) -> BigUint {
        BigUint::from_bytes_be(&self.encode(x))
    }

    /// Parse a hexadecimal string (with or without a "0x" prefix, any
    /// number of digits) into an element. The value must be lower than
    /// the modulus.
    pub fn from_hex(&self, s: &str) -> Result<Fe<N>, FieldError> {
        let s = s.strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if s.is_empty() {
            return Err(FieldError::InvalidString);
        }
        let bb = if (s.len() & 1) != 0 {
            let mut t = String::with_capacity(s.len() + 1);
            t.push('0');
            t.push_str(s);
            hex::decode(t)
        } else {
            hex::decode(s)
        };
        let bb = bb.map_err(|_| FieldError::InvalidString)?;
        self.from_biguint(&BigUint::from_bytes_be(&bb))
    }

    /// Parse a decimal string into an element; a "0x" prefix selects
    /// hexadecimal instead. The value must be lower than the modulus.
    pub fn from_str(&self, s: &str) -> Result<Fe<N>, FieldError> {
        if s.starts_with("0x") || s.starts_with("0X") {
            return self.from_hex(s);
        }
        if s.is_empty() || !s.bytes().all(|c| c.is_ascii_digit()) {
            return Err(FieldError::InvalidString);
        }
        let x = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or(FieldError::InvalidString)?;
        self.from_biguint(&x)
    }

    /// Encode an element as lowercase hexadecimal (`2*8*N` digits, no
    /// prefix).
    pub fn to_hex(&self, x: &Fe<N>) -> String {
        hex::encode(self.encode(x))
    }

    /// Generate a uniformly random element. Candidates are drawn from
    /// the provided source, truncated to the bit length of the modulus,
    /// and rejected until one is lower than the modulus.
    pub fn random<T: CryptoRng + RngCore>(&self, rng: &mut T) -> Fe<N> {
        let mut tries = 0u32;
        loop {
            let mut d = [0u64; N];
            for i in 0..N {
                let lo = (i as u32) << 6;
                d[i] = if self.bitlen >= lo + 64 {
                        rng.next_u64()
                    } else if self.bitlen > lo {
                        rng.next_u64() >> (lo + 64 - self.bitlen)
                    } else {
                        0
                    };
            }
            if limbs::lt(&d, &self.modulus) != 0 {
                return self.to_montgomery(&d);
            }
            tries += 1;
            trace!("random element rejected (attempt {})", tries);
        }
    }
}

// Encode an N-limb integer over exactly 8*N bytes (big-endian).
pub(crate) fn encode_raw<const N: usize>(x: &[u64; N]) -> Vec<u8> {
    let mut d = Vec::with_capacity(N << 3);
    for i in (0..N).rev() {
        d.extend_from_slice(&x[i].to_be_bytes());
    }
    d
}

// Decode up to 8*N bytes (unsigned big-endian) into an integer. The
// value is stored as-is, unreduced and not converted to Montgomery
// representation.
pub(crate) fn decode_raw<const N: usize>(buf: &[u8]) -> [u64; N] {
    let mut d = [0u64; N];
    let mut j = buf.len();
    for i in 0..N {
        if j >= 8 {
            let mut w = [0u8; 8];
            w.copy_from_slice(&buf[(j - 8)..j]);
            d[i] = u64::from_be_bytes(w);
            j -= 8;
        } else {
            let mut tmp = [0u8; 8];
            tmp[(8 - j)..].copy_from_slice(&buf[..j]);
            d[i] = u64::from_be_bytes(tmp);
            break;
        }
    }
    d
}

// ========================================================================

#[cfg(test)]
pub(crate) mod test_util {

    use crate::{CryptoRng, RngCore, RngError};
    use sha2::{Sha512, Digest};

    // Fill a buffer with pseudorandom bytes derived from a seed.
    pub fn mkrndv(vv: &mut [u8], bx: u64) {
        let mut sh = Sha512::new();
        let mut j = 0;
        while j < vv.len() {
            sh.update((bx + ((j as u64) << 40)).to_le_bytes());
            let h = sh.finalize_reset();
            let k = core::cmp::min(64, vv.len() - j);
            vv[j..(j + k)].copy_from_slice(&h[..k]);
            j += 64;
        }
    }

    // A pretend RNG for test purposes (deterministic from a given seed).
    pub struct DRNG {
        buf: [u8; 64],
        ptr: usize,
    }

    impl DRNG {

        pub fn from_seed(seed: &[u8]) -> Self {
            let mut d = Self {
                buf: [0u8; 64],
                ptr: 0,
            };
            let mut sh = Sha512::new();
            sh.update(seed);
            d.buf[..].copy_from_slice(&sh.finalize());
            d
        }
    }

    impl RngCore for DRNG {

        fn next_u32(&mut self) -> u32 {
            let mut buf = [0u8; 4];
            self.fill_bytes(&mut buf);
            u32::from_le_bytes(buf)
        }

        fn next_u64(&mut self) -> u64 {
            let mut buf = [0u8; 8];
            self.fill_bytes(&mut buf);
            u64::from_le_bytes(buf)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let len = dest.len();
            let mut off = 0;
            while off < len {
                let mut clen = 32 - self.ptr;
                if clen > (len - off) {
                    clen = len - off;
                }
                dest[off .. off + clen].copy_from_slice(
                    &self.buf[self.ptr .. self.ptr + clen]);
                self.ptr += clen;
                off += clen;
                if self.ptr == 32 {
                    let mut sh = Sha512::new();
                    sh.update(&self.buf);
                    self.buf[..].copy_from_slice(&sh.finalize());
                    self.ptr = 0;
                }
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8])
            -> Result<(), RngError>
        {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for DRNG { }
}

#[cfg(test)]
macro_rules! define_modfield_tests { ($n:expr, $modhex:expr, $bits:expr, $submod:ident) => {

    mod $submod {

    use super::super::ModField;
    use super::super::test_util::{mkrndv, DRNG};
    use crate::{FieldError, String, Vec};
    use num_bigint::BigUint;

    const N: usize = $n;
    const ENC_LEN: usize = N << 3;

    fn mkfield() -> (ModField<N>, BigUint) {
        let zp = BigUint::parse_bytes($modhex.as_bytes(), 16).unwrap();
        let bb = zp.to_bytes_be();
        let mut buf = [0u8; ENC_LEN];
        buf[(ENC_LEN - bb.len())..].copy_from_slice(&bb);
        let f = ModField::<N>::from_bytes_be(&buf).unwrap();
        assert!(f.modulus_biguint() == &zp);
        assert!(f.bit_length() as u64 == zp.bits());
        assert!(zp.bits() == $bits);
        (f, zp)
    }

    #[test]
    fn modulus_fixture() {
        // The modulus has the intended size and passes a Fermat test
        // (checked with the big integer oracle only).
        let (f, zp) = mkfield();
        assert!(f.bit_length() == $bits);
        let pm1 = &zp - 1u32;
        for b in [2u32, 3, 5, 7] {
            assert!(BigUint::from(b).modpow(&pm1, &zp) == BigUint::from(1u32));
        }
    }

    // va and vb must have length equal to the encoding length.
    fn check_gf_ops(f: &ModField<N>, zp: &BigUint, va: &[u8], vb: &[u8]) {
        let a = f.decode_reduce(va);
        let b = f.decode_reduce(vb);
        let za = BigUint::from_bytes_be(va) % zp;
        let zb = BigUint::from_bytes_be(vb) % zp;

        assert!(f.to_biguint(&a) == za);
        assert!(f.to_biguint(&b) == zb);

        let c = f.add(&a, &b);
        assert!(f.to_biguint(&c) == (&za + &zb) % zp);

        let c = f.sub(&a, &b);
        assert!(f.to_biguint(&c) == ((zp + &za) - &zb) % zp);

        let c = f.neg(&a);
        assert!(f.to_biguint(&c) == (zp - &za) % zp);

        let c = f.double(&a);
        assert!(f.to_biguint(&c) == (&za << 1) % zp);

        let c = f.half(&a);
        assert!(f.to_biguint(&f.double(&c)) == za);

        let c = f.mul(&a, &b);
        assert!(f.to_biguint(&c) == (&za * &zb) % zp);

        let c = f.square(&a);
        assert!(f.to_biguint(&c) == (&za * &za) % zp);

        let c = f.xsquare(&a, 3);
        assert!(f.to_biguint(&c) == za.modpow(&BigUint::from(8u32), zp));

        let e = BigUint::from_bytes_be(vb);
        let c = f.exp(&a, &e.to_u64_digits());
        assert!(f.to_biguint(&c) == za.modpow(&e, zp));

        // Montgomery round trip on plain values
        let x = f.from_montgomery(&a);
        assert!(f.equals(&f.to_montgomery(&x), &a) == 0xFFFFFFFF);

        // Canonical encoding round trip
        let enc = f.encode(&a);
        assert!(enc.len() == ENC_LEN);
        assert!(f.decode(&enc).map(|y| f.equals(&y, &a)) == Ok(0xFFFFFFFF));
        let hx = f.to_hex(&a);
        assert!(hx.len() == 2 * ENC_LEN);
        let y = f.from_hex(&hx).unwrap();
        assert!(f.equals(&y, &a) == 0xFFFFFFFF);
        let y = f.from_str(&za.to_str_radix(10)).unwrap();
        assert!(f.equals(&y, &a) == 0xFFFFFFFF);
        let y = f.from_biguint(&za).unwrap();
        assert!(f.equals(&y, &a) == 0xFFFFFFFF);

        // Strict decoding: accepted only if the source is canonical
        let (e, cc) = f.decode_ct(va);
        if BigUint::from_bytes_be(va) < *zp {
            assert!(cc == 0xFFFFFFFF);
            assert!(f.encode(&e) == va);
        } else {
            assert!(cc == 0);
            assert!(f.iszero(&e) == 0xFFFFFFFF);
            assert!(f.decode(va).err() == Some(FieldError::NotCanonical));
        }

        // Reducing decoder on various lengths
        let mut tmp = Vec::new();
        tmp.extend_from_slice(va);
        tmp.extend_from_slice(vb);
        tmp.extend_from_slice(va);
        for k in 0..(tmp.len() + 1) {
            let c = f.decode_reduce(&tmp[0..k]);
            let zd = BigUint::from_bytes_be(&tmp[0..k]) % zp;
            assert!(f.to_biguint(&c) == zd);
        }
    }

    #[test]
    fn field_ops() {
        let (f, zp) = mkfield();
        let mut va = [0u8; ENC_LEN];
        let mut vb = [0u8; ENC_LEN];
        check_gf_ops(&f, &zp, &va, &vb);
        for i in 0..ENC_LEN {
            va[i] = 0xFF;
            vb[i] = 0xFF;
        }
        check_gf_ops(&f, &zp, &va, &vb);
        for i in 0..100 {
            mkrndv(&mut va, 2 * i + 0);
            mkrndv(&mut vb, 2 * i + 1);
            check_gf_ops(&f, &zp, &va, &vb);
        }
    }

    #[test]
    fn group_and_field_laws() {
        let (f, _) = mkfield();
        let mut rng = DRNG::from_seed(&(N as u64).to_le_bytes());
        let zero = f.zero();
        let one = f.one();
        for _ in 0..50 {
            let a = f.random(&mut rng);
            let b = f.random(&mut rng);
            let c = f.random(&mut rng);

            assert!(f.equals(&f.add(&a, &zero), &a) == 0xFFFFFFFF);
            assert!(f.equals(&f.sub(&a, &zero), &a) == 0xFFFFFFFF);
            assert!(f.iszero(&f.double(&zero)) == 0xFFFFFFFF);
            assert!(f.iszero(&f.neg(&zero)) == 0xFFFFFFFF);
            assert!(f.equals(&f.sub(&zero, &a), &f.neg(&a)) == 0xFFFFFFFF);
            assert!(f.equals(&f.double(&a), &f.add(&a, &a)) == 0xFFFFFFFF);
            assert!(f.equals(&f.add(&a, &b), &f.add(&b, &a)) == 0xFFFFFFFF);
            assert!(f.equals(&f.sub(&a, &b), &f.neg(&f.sub(&b, &a)))
                == 0xFFFFFFFF);
            assert!(f.equals(&f.add(&f.add(&a, &b), &c),
                &f.add(&f.add(&a, &c), &b)) == 0xFFFFFFFF);
            assert!(f.equals(&f.sub(&f.sub(&a, &b), &c),
                &f.sub(&f.sub(&a, &c), &b)) == 0xFFFFFFFF);

            assert!(f.iszero(&f.mul(&a, &zero)) == 0xFFFFFFFF);
            assert!(f.equals(&f.mul(&a, &one), &a) == 0xFFFFFFFF);
            assert!(f.equals(&f.mul(&a, &b), &f.mul(&b, &a)) == 0xFFFFFFFF);
            assert!(f.equals(&f.mul(&f.mul(&a, &b), &c),
                &f.mul(&f.mul(&a, &c), &b)) == 0xFFFFFFFF);
            assert!(f.equals(&f.mul(&c, &f.add(&a, &b)),
                &f.add(&f.mul(&c, &a), &f.mul(&c, &b))) == 0xFFFFFFFF);

            // In-place operations with aliased operands.
            let mut d = a;
            f.set_add(&mut d, &a);
            assert!(f.equals(&d, &f.double(&a)) == 0xFFFFFFFF);
            let mut d = a;
            f.set_mul(&mut d, &a);
            assert!(f.equals(&d, &f.square(&a)) == 0xFFFFFFFF);
            let mut d = a;
            f.set_sub(&mut d, &a);
            assert!(f.iszero(&d) == 0xFFFFFFFF);

            // Constant-time selection.
            assert!(f.equals(&f.select(&a, &b, 0), &a) == 0xFFFFFFFF);
            assert!(f.equals(&f.select(&a, &b, 0xFFFFFFFF), &b) == 0xFFFFFFFF);
            let mut x = a;
            let mut y = b;
            f.cswap(&mut x, &mut y, 0xFFFFFFFF);
            assert!(f.equals(&x, &b) == 0xFFFFFFFF);
            assert!(f.equals(&y, &a) == 0xFFFFFFFF);
        }
    }

    #[test]
    fn conversions() {
        let (f, zp) = mkfield();

        // Montgomery round trip of 0 and 1
        let z = [0u64; N];
        let mut o = [0u64; N];
        o[0] = 1;
        assert!(f.from_montgomery(&f.to_montgomery(&z)) == z);
        assert!(f.from_montgomery(&f.to_montgomery(&o)) == o);
        assert!(f.isone(&f.to_montgomery(&o)) == 0xFFFFFFFF);
        assert!(f.from_montgomery(&f.one()) == o);

        // R constructor: value is 2^(64*N) mod p
        let zr = BigUint::from(1u32) << (64 * N);
        assert!(f.to_biguint(&f.montgomery_r()) == &zr % &zp);

        // Small integers
        assert!(f.to_biguint(&f.from_u64(12345)) == BigUint::from(12345u32));
        assert!(f.equals(&f.from_i64(-7), &f.neg(&f.from_u64(7)))
            == 0xFFFFFFFF);
        assert!(f.iszero(&f.from_i64(0)) == 0xFFFFFFFF);

        // Decoding p fails, p-1 succeeds
        let mut vp = [0u8; ENC_LEN];
        let bb = zp.to_bytes_be();
        vp[(ENC_LEN - bb.len())..].copy_from_slice(&bb);
        assert!(f.decode(&vp).err() == Some(FieldError::NotCanonical));
        assert!(f.from_biguint(&zp).err() == Some(FieldError::NotCanonical));
        let zpm1 = &zp - 1u32;
        let mut vpm1 = [0u8; ENC_LEN];
        let bb = zpm1.to_bytes_be();
        vpm1[(ENC_LEN - bb.len())..].copy_from_slice(&bb);
        let x = f.decode(&vpm1).unwrap();
        assert!(f.equals(&x, &f.neg(&f.one())) == 0xFFFFFFFF);
        assert!(f.encode(&x) == vpm1);

        // Wrong lengths
        assert!(f.decode(&vpm1[1..]).err() == Some(FieldError::InvalidLength {
            expected: ENC_LEN, actual: ENC_LEN - 1 }));
        assert!(f.decode_ct(&vpm1[1..]).1 == 0);

        // Strings
        assert!(f.to_biguint(&f.from_hex("0x1f").unwrap())
            == BigUint::from(31u32));
        assert!(f.to_biguint(&f.from_hex("abc").unwrap())
            == BigUint::from(0xABCu32));
        assert!(f.to_biguint(&f.from_str("1000").unwrap())
            == BigUint::from(1000u32));
        assert!(f.from_hex("0x").err() == Some(FieldError::InvalidString));
        assert!(f.from_hex("12g4").err() == Some(FieldError::InvalidString));
        assert!(f.from_str("12a").err() == Some(FieldError::InvalidString));
        assert!(f.from_str("").err() == Some(FieldError::InvalidString));
        assert!(f.from_str(&zp.to_str_radix(10)).err()
            == Some(FieldError::NotCanonical));
        let mut hx = String::from("0x");
        hx.push_str(&zpm1.to_str_radix(16));
        assert!(f.equals(&f.from_hex(&hx).unwrap(), &f.neg(&f.one()))
            == 0xFFFFFFFF);
    }

    #[test]
    fn exponentiation() {
        let (f, zp) = mkfield();
        let mut rng = DRNG::from_seed(b"exponentiation");
        let pm1 = (&zp - 1u32).to_u64_digits();
        let p = zp.to_u64_digits();
        for _ in 0..10 {
            let a = f.random(&mut rng);
            assert!(f.isone(&f.exp(&a, &[])) == 0xFFFFFFFF);
            assert!(f.isone(&f.exp(&a, &[0, 0])) == 0xFFFFFFFF);
            assert!(f.equals(&f.exp(&a, &[1]), &a) == 0xFFFFFFFF);
            let a2 = f.square(&a);
            let a8 = f.square(&f.square(&a2));
            assert!(f.equals(&f.exp(&a, &[8]), &a8) == 0xFFFFFFFF);
            if f.iszero(&a) == 0 {
                assert!(f.isone(&f.exp(&a, &pm1)) == 0xFFFFFFFF);
            }
            assert!(f.equals(&f.exp(&a, &p), &a) == 0xFFFFFFFF);
        }
        assert!(f.isone(&f.exp(&f.zero(), &[])) == 0xFFFFFFFF);
        assert!(f.iszero(&f.exp(&f.zero(), &[5])) == 0xFFFFFFFF);
    }

    #[test]
    fn random_below_modulus() {
        let (f, zp) = mkfield();
        let mut rng = DRNG::from_seed(b"random");
        for _ in 0..100 {
            let a = f.random(&mut rng);
            assert!(f.to_biguint(&a) < zp);
        }
    }

    } // end of module

} } // End of macro: define_modfield_tests
