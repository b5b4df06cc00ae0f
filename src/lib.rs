//! Montfield is a Rust library for arithmetic in prime fields with large
//! moduli.
//!
//! Given an odd modulus `p` of 256 to 1024 bits (4 to 16 limbs of 64
//! bits), this library provides modular addition, subtraction, negation,
//! doubling and halving, Montgomery multiplication and squaring, modular
//! exponentiation, and modular inversion. Field elements are kept
//! internally in Montgomery representation (`x*R mod p`, with
//! `R = 2^(64*N)` for `N` limbs), so that long chains of multiplications
//! never need a full reduction.
//!
//! Two APIs are provided:
//!
//!  - `backend::ModField<N>` is a field context for a modulus whose limb
//!    count `N` is known at compile time; elements are `backend::Fe<N>`.
//!    Common widths have aliases in the `field` module (`Field256`,
//!    `Field320`, `Field384`, `Field448`, `Field512`).
//!
//!  - `field::Field` selects the limb count at runtime, from the length
//!    of the modulus encoding, and works on `field::FieldElement` values.
//!    This is the convenient entry point when the modulus is only known
//!    at runtime.
//!
//! Elements do not carry a reference to their field: all operations are
//! methods of the field context, which receives the elements as
//! parameters. The context is immutable after construction and can be
//! shared freely between threads.
//!
//! # Conventions
//!
//! Encodings are big-endian and have a fixed length of `8*N` bytes (the
//! limb count times eight), zero-padded on the left. Decoding a value
//! which is not lower than the modulus is an error, never a silent
//! reduction (use `decode_reduce()` to get reduction explicitly).
//!
//! Addition, subtraction, negation, multiplication, squaring and
//! exponentiation are constant-time (exponentiation leaks the bit length
//! of the exponent, not its value). Functions that are not constant-time
//! have "vartime" in their name; this is the case of the binary GCD
//! inversions. All functions that return a potentially secret Boolean
//! value use the `u32` type; the convention is that 0xFFFFFFFF means
//! "true", and 0x00000000 means "false". The runtime-dispatch API
//! (`field::Field`) returns plain `bool` values for convenience.
//!
//! Functions that modify the object on which they operate have a name in
//! `set_*()` (e.g. `ModField::set_add()` adds into its first operand),
//! while the corresponding function without the prefix (`add()`) returns
//! the result as a new value.
//!
//! No inline assembly is used. On x86-64 architectures, the
//! `_addcarry_u64()` and `_subborrow_u64()` intrinsics are used
//! (from `core::arch::x86_64`); on other architectures, plain
//! implementations over `u128` are used.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub(crate) use alloc::string::String;
pub(crate) use alloc::vec::Vec;

pub use num_bigint::BigUint;
pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub mod backend;
pub mod error;
pub mod field;

pub use error::FieldError;
pub use field::{Field, FieldElement};
