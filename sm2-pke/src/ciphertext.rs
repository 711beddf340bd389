//! SM2 ciphertext value `(C1, C2, C3)`.

#[cfg(feature = "der")]
mod der;

use crate::{domain::DIGEST_SIZE, Error, Result};
use alloc::vec::Vec;
use elliptic_curve::{
    generic_array::typenum::Unsigned,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, Tag, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize,
};
use sm2::Sm2;

/// Order of the components when a ciphertext is serialized as bytes.
///
/// `C1` is always the uncompressed SEC1 encoding of the ephemeral point and
/// `C3` is always [`DIGEST_SIZE`] bytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mode {
    /// `C1 || C2 || C3`, the layout of the original GM/T 0003 drafts.
    C1C2C3,
    /// `C1 || C3 || C2`, the layout of GM/T 0003.4-2012 and GB/T 32918.4-2016.
    #[default]
    C1C3C2,
}

/// Result of SM2 encryption.
///
/// - `C1`: ephemeral point `[k]G`
/// - `C2`: plaintext masked with the KDF output, same length as the plaintext
/// - `C3`: MAC tag `Hash(x2 || M || y2)` binding the shared point and the plaintext
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ciphertext<C: CurveArithmetic = Sm2> {
    c1: AffinePoint<C>,
    c2: Vec<u8>,
    c3: Vec<u8>,
}

impl<C: CurveArithmetic> Ciphertext<C> {
    /// Assemble a ciphertext from its components.
    ///
    /// The tag length is not checked here; a tag of the wrong length fails
    /// authentication on decryption.
    pub fn new(ephemeral_point: AffinePoint<C>, masked_payload: Vec<u8>, mac_tag: Vec<u8>) -> Self {
        Self {
            c1: ephemeral_point,
            c2: masked_payload,
            c3: mac_tag,
        }
    }

    /// Ephemeral point `C1`.
    pub fn ephemeral_point(&self) -> &AffinePoint<C> {
        &self.c1
    }

    /// Masked payload `C2`.
    pub fn masked_payload(&self) -> &[u8] {
        &self.c2
    }

    /// MAC tag `C3`.
    pub fn mac_tag(&self) -> &[u8] {
        &self.c3
    }

    /// Recorded length of the MAC tag.
    pub fn mac_tag_len(&self) -> usize {
        self.c3.len()
    }

    /// Length of the plaintext this ciphertext decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.c2.len()
    }
}

impl<C> Ciphertext<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Parse a ciphertext serialized in the given [`Mode`].
    pub fn from_slice(bytes: &[u8], mode: Mode) -> Result<Self> {
        let c1_len = uncompressed_len::<C>();
        if bytes.len() < c1_len + DIGEST_SIZE {
            return Err(Error::Encoding);
        }

        let (c1, rest) = bytes.split_at(c1_len);
        let c1 = decode_point::<C>(c1)?;

        let (c2, c3) = match mode {
            Mode::C1C2C3 => rest.split_at(rest.len() - DIGEST_SIZE),
            Mode::C1C3C2 => {
                let (c3, c2) = rest.split_at(DIGEST_SIZE);
                (c2, c3)
            }
        };

        Ok(Self::new(c1, c2.to_vec(), c3.to_vec()))
    }

    /// Serialize in the given [`Mode`].
    pub fn to_vec(&self, mode: Mode) -> Vec<u8> {
        let point = self.c1.to_encoded_point(false);
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(point.as_bytes());

        match mode {
            Mode::C1C2C3 => {
                out.extend_from_slice(&self.c2);
                out.extend_from_slice(&self.c3);
            }
            Mode::C1C3C2 => {
                out.extend_from_slice(&self.c3);
                out.extend_from_slice(&self.c2);
            }
        }

        out
    }

    /// Length of the serialized ciphertext in bytes.
    pub fn encoded_len(&self) -> usize {
        uncompressed_len::<C>() + self.c2.len() + self.c3.len()
    }
}

/// `0x04 || x || y`
fn uncompressed_len<C>() -> usize
where
    C: CurveArithmetic,
    FieldBytesSize<C>: ModulusSize,
{
    Tag::Uncompressed.message_len(FieldBytesSize::<C>::USIZE)
}

/// Decode an uncompressed point, checking that it is on the curve.
fn decode_point<C>(bytes: &[u8]) -> Result<AffinePoint<C>>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let encoded = EncodedPoint::<C>::from_bytes(bytes).map_err(|_| Error::Encoding)?;
    if encoded.tag() != Tag::Uncompressed {
        return Err(Error::Encoding);
    }

    Option::from(AffinePoint::<C>::from_encoded_point(&encoded)).ok_or(Error::Encoding)
}
