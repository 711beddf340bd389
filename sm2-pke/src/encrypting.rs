use crate::{
    domain::{DomainParams, MAX_ENCRYPT_ATTEMPTS},
    kdf::{is_all_zero, kdf, xor},
    Ciphertext, Error, Result,
};
use alloc::{boxed::Box, vec};
use core::mem;
use digest::Digest;
use elliptic_curve::{
    group::Group,
    sec1::{EncodedPoint, FromEncodedPoint, ModulusSize, ToEncodedPoint},
    AffinePoint, CurveArithmetic, FieldBytesSize, ProjectivePoint, PublicKey,
};
use primeorder::PrimeCurveParams;
use rand_core::CryptoRngCore;
use sm2::Sm2;
use sm3::Sm3;
use zeroize::Zeroizing;

#[cfg(feature = "der")]
use alloc::vec::Vec;

/// SM2 encryption key: the recipient's public point.
///
/// Any point on the curve is accepted, including the point at infinity; the
/// subgroup check runs on every encryption and rejects such keys with
/// [`Error::KeyValidity`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncryptingKey<C: CurveArithmetic = Sm2> {
    point: AffinePoint<C>,
}

impl<C> EncryptingKey<C>
where
    C: PrimeCurveParams,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Initialize [`EncryptingKey`] from an affine point.
    pub fn from_affine(point: AffinePoint<C>) -> Self {
        Self { point }
    }

    /// Initialize [`EncryptingKey`] from a SEC1-encoded public key.
    ///
    /// Returns [`Error::Encoding`] if the bytes do not encode a point on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let encoded = EncodedPoint::<C>::from_bytes(bytes).map_err(|_| Error::Encoding)?;
        let point = Option::from(AffinePoint::<C>::from_encoded_point(&encoded));
        point.map(Self::from_affine).ok_or(Error::Encoding)
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint<C> {
        &self.point
    }

    /// Convert this [`EncryptingKey`] into the uncompressed
    /// `Elliptic-Curve-Point-to-Octet-String` encoding described in
    /// SEC 1: Elliptic Curve Cryptography (Version 2.0) section 2.3.3
    /// (page 10).
    ///
    /// <http://www.secg.org/sec1-v2.pdf>
    pub fn to_sec1_bytes(&self) -> Box<[u8]> {
        self.point.to_encoded_point(false).as_bytes().into()
    }

    /// Encrypt a message, using SM3 for both the KDF and the MAC.
    pub fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        msg: &[u8],
    ) -> Result<Ciphertext<C>> {
        self.encrypt_digest::<R, Sm3, Sm3>(rng, msg)
    }

    /// Encrypt a message using `K` as the KDF digest and `M` as the MAC digest.
    ///
    /// Both digests must produce 256-bit outputs.
    pub fn encrypt_digest<R, K, M>(&self, rng: &mut R, msg: &[u8]) -> Result<Ciphertext<C>>
    where
        R: CryptoRngCore + ?Sized,
        K: Digest,
        M: Digest,
    {
        encrypt::<C, R, K, M>(rng, &self.point, msg)
    }

    /// Encrypt a message with SM3 and encode the result as DER.
    #[cfg(feature = "der")]
    pub fn encrypt_der<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, msg: &[u8]) -> Result<Vec<u8>> {
        self.encrypt(rng, msg)?.to_der()
    }
}

impl<C: CurveArithmetic> From<PublicKey<C>> for EncryptingKey<C> {
    fn from(public_key: PublicKey<C>) -> Self {
        Self {
            point: *public_key.as_affine(),
        }
    }
}

impl<C: CurveArithmetic> From<&PublicKey<C>> for EncryptingKey<C> {
    fn from(public_key: &PublicKey<C>) -> Self {
        Self {
            point: *public_key.as_affine(),
        }
    }
}

fn encrypt<C, R, K, M>(rng: &mut R, public_point: &AffinePoint<C>, msg: &[u8]) -> Result<Ciphertext<C>>
where
    C: PrimeCurveParams,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
    R: CryptoRngCore + ?Sized,
    K: Digest,
    M: Digest,
{
    let params = DomainParams::<C>::new::<K, M>()?;

    // A3: S = [h]P_B must not be the point at infinity. P_B is fixed, so the
    // check runs once rather than on every attempt.
    if params.is_small_order(public_point) {
        return Err(Error::KeyValidity);
    }

    let public_point = ProjectivePoint::<C>::from(*public_point);

    // holds t until A6 turns it into C2
    let mut c2 = Zeroizing::new(vec![0u8; msg.len()]);

    for attempt in 1..=MAX_ENCRYPT_ATTEMPTS {
        // A1: k ∈ [1, n-1]
        let k = params.random_scalar(rng)?;
        let k: &C::Scalar = &k;

        // A2: C1 = [k]G = (x1, y1)
        let c1 = (ProjectivePoint::<C>::generator() * k).to_affine();

        // A4: [k]P_B = (x2, y2)
        let shared = Zeroizing::new(public_point * k);
        let secret = params.shared_secret(&shared)?;

        // A5: t = KDF(x2 || y2, klen), go back to A1 if t is all zero
        kdf::<K>(secret.as_bytes(), &mut c2)?;
        if is_all_zero(&c2) {
            log::debug!("KDF output is all zero on attempt {attempt}, drawing a new k");
            continue;
        }

        // A6: C2 = M ⊕ t
        xor(&mut c2, msg);

        // A7: C3 = Hash(x2 || M || y2)
        let c3 = secret.tag::<M>(msg);

        // A8: C = C1 || C2 || C3
        return Ok(Ciphertext::new(c1, mem::take(&mut *c2), c3.to_vec()));
    }

    log::warn!("KDF output all zero for {MAX_ENCRYPT_ATTEMPTS} attempts");
    Err(Error::Internal)
}
