use crate::{
    domain::DomainParams,
    kdf::{kdf, xor},
    Ciphertext, EncryptingKey, Error, Mode, Result,
};
use alloc::{vec, vec::Vec};
use core::{
    fmt::{self, Debug},
    mem,
};
use digest::Digest;
use elliptic_curve::{
    sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint},
    subtle::{Choice, ConstantTimeEq},
    AffinePoint, CurveArithmetic, FieldBytes, FieldBytesSize, NonZeroScalar, PrimeField,
    ProjectivePoint, PublicKey, SecretKey,
};
use primeorder::PrimeCurveParams;
use rand_core::CryptoRngCore;
use sm2::Sm2;
use sm3::Sm3;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// SM2 decryption key: the recipient's secret scalar `d_B`.
///
/// The curve is taken from the key alone; decryption never consults a
/// separately supplied public key.
#[derive(Clone)]
pub struct DecryptingKey<C: CurveArithmetic = Sm2> {
    secret_scalar: NonZeroScalar<C>,
    encrypting_key: EncryptingKey<C>,
}

impl<C> DecryptingKey<C>
where
    C: PrimeCurveParams,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Create a [`DecryptingKey`] from a [`SecretKey`].
    pub fn new(secret_key: &SecretKey<C>) -> Self {
        Self::from_nonzero_scalar(secret_key.to_nonzero_scalar())
    }

    /// Create a [`DecryptingKey`] from a non-zero scalar.
    pub fn from_nonzero_scalar(secret_scalar: NonZeroScalar<C>) -> Self {
        let public_key = PublicKey::from_secret_scalar(&secret_scalar);

        Self {
            secret_scalar,
            encrypting_key: EncryptingKey::from(public_key),
        }
    }

    /// Generate a random [`DecryptingKey`].
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::from_nonzero_scalar(NonZeroScalar::random(rng))
    }

    /// Parse decrypting key from big endian-encoded bytes.
    pub fn from_bytes(bytes: &FieldBytes<C>) -> Result<Self> {
        let secret_scalar = Option::from(NonZeroScalar::<C>::from_repr(bytes.clone()));
        secret_scalar
            .map(Self::from_nonzero_scalar)
            .ok_or(Error::Encoding)
    }

    /// Parse decrypting key from big endian-encoded byte slice containing a
    /// secret scalar value.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let secret_scalar = NonZeroScalar::<C>::try_from(slice)?;
        Ok(Self::from_nonzero_scalar(secret_scalar))
    }

    /// Serialize as bytes.
    pub fn to_bytes(&self) -> FieldBytes<C> {
        self.secret_scalar.to_repr()
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar<C> {
        &self.secret_scalar
    }

    /// Get the [`EncryptingKey`] which corresponds to this [`DecryptingKey`].
    pub fn encrypting_key(&self) -> &EncryptingKey<C> {
        &self.encrypting_key
    }

    /// Decrypt a ciphertext, using SM3 for both the KDF and the MAC.
    pub fn decrypt(&self, ciphertext: &Ciphertext<C>) -> Result<Vec<u8>> {
        self.decrypt_digest::<Sm3, Sm3>(ciphertext)
    }

    /// Decrypt a ciphertext using `K` as the KDF digest and `M` as the MAC digest.
    pub fn decrypt_digest<K, M>(&self, ciphertext: &Ciphertext<C>) -> Result<Vec<u8>>
    where
        K: Digest,
        M: Digest,
    {
        let mut plaintext = Zeroizing::new(vec![0u8; ciphertext.plaintext_len()]);
        self.decrypt_into_digest::<K, M>(ciphertext, Some(plaintext.as_mut_slice()))?;
        Ok(mem::take(&mut *plaintext))
    }

    /// Decrypt a ciphertext into `out` with SM3, returning the plaintext length.
    ///
    /// See [`DecryptingKey::decrypt_into_digest`].
    pub fn decrypt_into(&self, ciphertext: &Ciphertext<C>, out: Option<&mut [u8]>) -> Result<usize> {
        self.decrypt_into_digest::<Sm3, Sm3>(ciphertext, out)
    }

    /// Decrypt a ciphertext into `out`, returning the plaintext length.
    ///
    /// With `out` set to `None` nothing is decrypted and only the required
    /// buffer length is returned. A buffer shorter than that fails with
    /// [`Error::BufferTooSmall`]; bytes of `out` past the plaintext length are
    /// left untouched.
    ///
    /// An empty buffer is not a capacity query: `Some(&mut [])` is an ordinary
    /// buffer and fails with [`Error::BufferTooSmall`] unless the plaintext is
    /// empty.
    ///
    /// On any error the plaintext region of `out` holds no decrypted data.
    pub fn decrypt_into_digest<K, M>(
        &self,
        ciphertext: &Ciphertext<C>,
        out: Option<&mut [u8]>,
    ) -> Result<usize>
    where
        K: Digest,
        M: Digest,
    {
        decrypt::<C, K, M>(&self.secret_scalar, ciphertext, out)
    }

    /// Parse and decrypt a ciphertext serialized in the given [`Mode`].
    ///
    /// Malformed input fails with [`Error::Authentication`], the same as a
    /// ciphertext whose tag does not verify.
    pub fn decrypt_bytes(&self, bytes: &[u8], mode: Mode) -> Result<Vec<u8>> {
        let ciphertext = Ciphertext::from_slice(bytes, mode).map_err(|_| Error::Authentication)?;
        self.decrypt(&ciphertext)
    }

    /// Parse and decrypt a DER-encoded ciphertext.
    ///
    /// Malformed input fails with [`Error::Authentication`], the same as a
    /// ciphertext whose tag does not verify.
    #[cfg(feature = "der")]
    pub fn decrypt_der(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let ciphertext = Ciphertext::from_der(bytes).map_err(|_| Error::Authentication)?;
        self.decrypt(&ciphertext)
    }
}

fn decrypt<C, K, M>(
    secret_scalar: &NonZeroScalar<C>,
    ciphertext: &Ciphertext<C>,
    out: Option<&mut [u8]>,
) -> Result<usize>
where
    C: PrimeCurveParams,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    K: Digest,
    M: Digest,
{
    let params = DomainParams::<C>::new::<K, M>()?;
    let klen = ciphertext.plaintext_len();

    let out = match out {
        Some(out) => out
            .get_mut(..klen)
            .ok_or(Error::BufferTooSmall { required: klen })?,
        None => return Ok(klen),
    };

    // B2: S = [h]C1 must not be the point at infinity
    let c1 = ciphertext.ephemeral_point();
    if params.is_small_order(c1) {
        return Err(Error::KeyValidity);
    }

    // B3: [d_B]C1 = (x2, y2)
    let d: &C::Scalar = secret_scalar;
    let shared = Zeroizing::new(ProjectivePoint::<C>::from(*c1) * d);
    let secret = params.shared_secret(&shared)?;

    // B4: t = KDF(x2 || y2, klen)
    kdf::<K>(secret.as_bytes(), out)?;

    // B5: M' = C2 ⊕ t
    xor(out, ciphertext.masked_payload());

    // B6: u = Hash(x2 || M' || y2) must equal C3
    let u = secret.tag::<M>(out);
    if !bool::from(u[..].ct_eq(ciphertext.mac_tag())) {
        out.zeroize();
        return Err(Error::Authentication);
    }

    // B7: output M'
    Ok(klen)
}

//
// Other trait impls
//

impl<C: CurveArithmetic> AsRef<EncryptingKey<C>> for DecryptingKey<C> {
    fn as_ref(&self) -> &EncryptingKey<C> {
        &self.encrypting_key
    }
}

impl<C: CurveArithmetic> ConstantTimeEq for DecryptingKey<C> {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_scalar.ct_eq(&other.secret_scalar)
    }
}

impl<C: CurveArithmetic + Debug> Debug for DecryptingKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecryptingKey")
            .field("encrypting_key", &self.encrypting_key)
            .finish_non_exhaustive()
    }
}

impl<C: CurveArithmetic> Drop for DecryptingKey<C> {
    fn drop(&mut self) {
        self.secret_scalar.zeroize();
    }
}

impl<C: CurveArithmetic> ZeroizeOnDrop for DecryptingKey<C> {}

/// Constant-time comparison
impl<C: CurveArithmetic> Eq for DecryptingKey<C> {}
impl<C: CurveArithmetic> PartialEq for DecryptingKey<C> {
    fn eq(&self, other: &DecryptingKey<C>) -> bool {
        self.ct_eq(other).into()
    }
}

impl<C> From<&SecretKey<C>> for DecryptingKey<C>
where
    C: PrimeCurveParams,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    fn from(secret_key: &SecretKey<C>) -> Self {
        Self::new(secret_key)
    }
}

#[cfg(test)]
mod tests {
    use super::DecryptingKey;
    use crate::{Ciphertext, Error};
    use alloc::{format, vec::Vec};
    use hex_literal::hex;
    use sm2::{AffinePoint, Sm2};

    const PRIVATE_KEY: [u8; 32] =
        hex!("3DDD2A3679BF6F1DFC3B49D3E99114718E48EC170EB4E4D3A82052DAB19E8B50");

    fn decrypting_key() -> DecryptingKey {
        DecryptingKey::from_slice(&PRIVATE_KEY).unwrap()
    }

    #[test]
    fn identity_c1_is_rejected() {
        let dk = decrypting_key();
        let ct = Ciphertext::<Sm2>::new(AffinePoint::IDENTITY, Vec::from(*b"abc"), [0u8; 32].to_vec());
        let mut out = [0u8; 3];
        assert_eq!(dk.decrypt_into(&ct, Some(&mut out[..])).err(), Some(Error::KeyValidity));
    }

    #[test]
    fn scalar_bytes_round_trip() {
        let dk = decrypting_key();
        assert_eq!(&dk.to_bytes()[..], &PRIVATE_KEY);
        assert_eq!(DecryptingKey::<Sm2>::from_bytes(&dk.to_bytes()).unwrap(), dk);
    }

    #[test]
    fn zero_scalar_is_rejected() {
        assert_eq!(
            DecryptingKey::<Sm2>::from_slice(&[0u8; 32]).err(),
            Some(Error::Encoding)
        );
    }

    #[test]
    fn debug_does_not_print_secret() {
        let rendered = format!("{:?}", decrypting_key());
        assert!(rendered.starts_with("DecryptingKey"));
        assert!(!rendered.to_lowercase().contains("3ddd2a36"));
    }
}
