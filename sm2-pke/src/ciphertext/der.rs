//! ASN.1 DER encoding of SM2 ciphertexts as defined in GM/T 0009-2012 § 7.2.
//!
//! ```text
//! SM2Cipher ::= SEQUENCE {
//!     XCoordinate INTEGER,
//!     YCoordinate INTEGER,
//!     HASH        OCTET STRING,
//!     CipherText  OCTET STRING
//! }
//! ```

use super::{decode_point, Ciphertext};
use crate::{Error, Result};
use ::der::{
    asn1::{OctetStringRef, UintRef},
    Decode, Encode, Sequence,
};
use alloc::vec::Vec;
use elliptic_curve::{
    generic_array::typenum::Unsigned,
    sec1::{FromEncodedPoint, ModulusSize, Tag, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize,
};

#[derive(Sequence)]
struct Sm2Cipher<'a> {
    x: UintRef<'a>,
    y: UintRef<'a>,
    hash: OctetStringRef<'a>,
    cipher: OctetStringRef<'a>,
}

impl<C> Ciphertext<C>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Parse a DER-encoded `SM2Cipher` structure.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        let cipher = Sm2Cipher::from_der(bytes)?;
        let nbytes = FieldBytesSize::<C>::USIZE;

        let mut c1 = Vec::with_capacity(Tag::Uncompressed.message_len(nbytes));
        c1.push(Tag::Uncompressed as u8);
        c1.extend(left_pad(cipher.x.as_bytes(), nbytes)?);
        c1.extend(left_pad(cipher.y.as_bytes(), nbytes)?);

        Ok(Self::new(
            decode_point::<C>(&c1)?,
            cipher.cipher.as_bytes().to_vec(),
            cipher.hash.as_bytes().to_vec(),
        ))
    }

    /// Serialize as a DER-encoded `SM2Cipher` structure.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let point = self.c1.to_encoded_point(false);
        let (x, y) = match (point.x(), point.y()) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(Error::Encoding),
        };

        let cipher = Sm2Cipher {
            x: UintRef::new(x)?,
            y: UintRef::new(y)?,
            hash: OctetStringRef::new(&self.c3)?,
            cipher: OctetStringRef::new(&self.c2)?,
        };

        Ok(cipher.to_der()?)
    }
}

/// Big endian integer bytes with the leading zeros DER strips restored.
fn left_pad(bytes: &[u8], len: usize) -> Result<impl Iterator<Item = u8> + '_> {
    let padding = len.checked_sub(bytes.len()).ok_or(Error::Encoding)?;
    Ok(core::iter::repeat(0).take(padding).chain(bytes.iter().copied()))
}
