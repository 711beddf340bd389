//! Error types.

use core::fmt::{self, Display, Formatter};

/// Result type with the `sm2-pke` crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// SM2 encryption errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// Curve field size or digest output size is not 256 bits.
    Configuration,

    /// Cofactor multiple of the public key or the ephemeral point is the
    /// point at infinity.
    KeyValidity,

    /// Output buffer cannot hold the plaintext.
    BufferTooSmall {
        /// Number of bytes the plaintext needs.
        required: usize,
    },

    /// Ciphertext failed to decrypt.
    Authentication,

    /// Malformed ciphertext or key encoding.
    Encoding,

    /// Random number generator failed or retries were exhausted.
    Internal,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration => write!(f, "curve or digest size is not supported"),
            Error::KeyValidity => write!(f, "point is not in the prime order subgroup"),
            Error::BufferTooSmall { required } => {
                write!(f, "output buffer too small: {required} bytes required")
            }
            Error::Authentication => write!(f, "decryption failed"),
            Error::Encoding => write!(f, "malformed encoding"),
            Error::Internal => write!(f, "internal error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl From<elliptic_curve::Error> for Error {
    fn from(_: elliptic_curve::Error) -> Self {
        Error::Encoding
    }
}

#[cfg(feature = "der")]
impl From<der::Error> for Error {
    fn from(_: der::Error) -> Self {
        Error::Encoding
    }
}
