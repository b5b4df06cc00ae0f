//! Error type for field construction, decoding and inversion.

use core::fmt;

/// Failure of a field operation.
///
/// Construction errors are reported when building a field context,
/// decoding errors when converting external values into field elements,
/// and inversion errors when the binary GCD cannot produce an inverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The modulus is even; Montgomery reduction needs an odd modulus.
    EvenModulus,
    /// The modulus is 1 (the field would have a single element).
    ModulusTooSmall,
    /// The limb count is outside of the supported range (4 to 16).
    UnsupportedLimbCount(usize),
    /// The modulus encoding length (in bytes) is not a multiple of 8.
    InvalidModulusLength(usize),
    /// An encoding (element, or modulus for a fixed limb count) does not
    /// have the expected length (in bytes).
    InvalidLength { expected: usize, actual: usize },
    /// The decoded value is not lower than the modulus.
    NotCanonical,
    /// A decimal or hexadecimal string could not be parsed.
    InvalidString,
    /// The value has no inverse modulo the field modulus.
    NotInvertible,
    /// The inversion loop ended in a state that violates its invariants.
    InversionFailure,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::EvenModulus => write!(f, "modulus is even"),
            FieldError::ModulusTooSmall => write!(f, "modulus is too small"),
            FieldError::UnsupportedLimbCount(n) => {
                write!(f, "unsupported limb count: {} (expected 4 to 16)", n)
            }
            FieldError::InvalidModulusLength(len) => {
                write!(f, "modulus length {} is not a multiple of 8 bytes", len)
            }
            FieldError::InvalidLength { expected, actual } => {
                write!(f, "invalid encoding length: expected {} bytes, got {}",
                    expected, actual)
            }
            FieldError::NotCanonical => {
                write!(f, "value is not lower than the modulus")
            }
            FieldError::InvalidString => write!(f, "malformed integer string"),
            FieldError::NotInvertible => write!(f, "value is not invertible"),
            FieldError::InversionFailure => {
                write!(f, "inversion did not reach a valid final state")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {

    use super::FieldError;
    use alloc::string::ToString;

    #[test]
    fn display() {
        assert_eq!(FieldError::EvenModulus.to_string(), "modulus is even");
        assert_eq!(FieldError::UnsupportedLimbCount(3).to_string(),
            "unsupported limb count: 3 (expected 4 to 16)");
        assert_eq!(FieldError::InvalidLength { expected: 32, actual: 31 }
            .to_string(),
            "invalid encoding length: expected 32 bytes, got 31");
    }
}
