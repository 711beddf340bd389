//! Domain parameters and validation shared by encryption and decryption.

use crate::{Error, Result};
use alloc::vec::Vec;
use digest::{Digest, Output};
use elliptic_curve::{
    generic_array::typenum::Unsigned,
    group::Group,
    sec1::{ModulusSize, ToEncodedPoint},
    AffinePoint, Field, FieldBytes, FieldBytesSize, NonZeroScalar, ProjectivePoint,
};
use primeorder::PrimeCurveParams;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};

/// Size of a serialized base field element in bytes.
///
/// SM2 encryption is only defined for 256-bit curves.
pub const FIELD_SIZE: usize = 32;

/// Output size of the KDF and MAC digests in bytes.
pub const DIGEST_SIZE: usize = 32;

/// Maximum number of ephemeral keys tried before encryption gives up on a
/// KDF that keeps producing an all-zero mask.
pub const MAX_ENCRYPT_ATTEMPTS: usize = 16;

/// Maximum number of random draws when sampling a scalar in `[1, n-1]`.
pub const MAX_SCALAR_DRAWS: usize = 64;

/// Domain parameters of the curve `C`, derived per call.
///
/// The group order `n` is enforced when sampling scalars (see
/// [`DomainParams::random_scalar`]). Every [`PrimeCurveParams`] curve has
/// prime order, so the cofactor `h` is one.
pub(crate) struct DomainParams<C: PrimeCurveParams> {
    cofactor: C::Scalar,
    nbytes: usize,
}

impl<C> DomainParams<C>
where
    C: PrimeCurveParams,
    AffinePoint<C>: ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    /// Check the curve and digests against the 256-bit profile.
    pub(crate) fn new<K: Digest, M: Digest>() -> Result<Self> {
        let nbytes = FieldBytesSize::<C>::USIZE;
        let kdf_size = <K as Digest>::output_size();
        let mac_size = <M as Digest>::output_size();

        if nbytes != FIELD_SIZE || kdf_size != DIGEST_SIZE || mac_size != DIGEST_SIZE {
            log::debug!(
                "unsupported SM2 parameters: field {nbytes} bytes, kdf {kdf_size} bytes, mac {mac_size} bytes"
            );
            return Err(Error::Configuration);
        }

        Ok(Self {
            cofactor: C::Scalar::ONE,
            nbytes,
        })
    }

    /// Is `[h]P` the point at infinity?
    pub(crate) fn is_small_order(&self, point: &AffinePoint<C>) -> bool {
        (ProjectivePoint::<C>::from(*point) * self.cofactor)
            .is_identity()
            .into()
    }

    /// Draw `k` uniformly from `[1, n-1]`.
    ///
    /// Draws equal to zero or not below `n` are rejected and redrawn.
    pub(crate) fn random_scalar<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Zeroizing<NonZeroScalar<C>>> {
        let mut bytes = FieldBytes::<C>::default();

        for _ in 0..MAX_SCALAR_DRAWS {
            if rng.try_fill_bytes(&mut bytes).is_err() {
                bytes[..].zeroize();
                log::warn!("random number generator failed");
                return Err(Error::Internal);
            }

            let k = Option::<NonZeroScalar<C>>::from(NonZeroScalar::from_repr(bytes.clone()));
            if let Some(k) = k {
                bytes[..].zeroize();
                return Ok(Zeroizing::new(k));
            }
        }

        bytes[..].zeroize();
        log::warn!("no valid scalar after {MAX_SCALAR_DRAWS} draws");
        Err(Error::Internal)
    }

    /// Encode a shared point as `x2 || y2`.
    pub(crate) fn shared_secret(&self, point: &ProjectivePoint<C>) -> Result<SharedSecret> {
        let affine = Zeroizing::new(point.to_affine());
        let mut encoded = affine.to_encoded_point(false);
        let coordinates = encoded.as_bytes().get(1..).map(<[u8]>::to_vec);
        encoded.zeroize();

        match coordinates {
            Some(xy) if xy.len() == 2 * self.nbytes => Ok(SharedSecret {
                xy: Zeroizing::new(xy),
                nbytes: self.nbytes,
            }),
            Some(mut xy) => {
                xy.zeroize();
                log::warn!("shared point is the point at infinity");
                Err(Error::Internal)
            }
            None => {
                log::warn!("shared point is the point at infinity");
                Err(Error::Internal)
            }
        }
    }
}

/// Coordinates `x2 || y2` of the point shared between sender and recipient.
///
/// Wiped on drop.
pub(crate) struct SharedSecret {
    xy: Zeroizing<Vec<u8>>,
    nbytes: usize,
}

impl SharedSecret {
    /// KDF input `Z = x2 || y2`.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.xy
    }

    /// `C3 = Hash(x2 || M || y2)`.
    pub(crate) fn tag<M: Digest>(&self, msg: &[u8]) -> Output<M> {
        let (x, y) = self.xy.split_at(self.nbytes);
        M::new()
            .chain_update(x)
            .chain_update(msg)
            .chain_update(y)
            .finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::DomainParams;
    use crate::Error;
    use elliptic_curve::{group::Group, sec1::ToEncodedPoint};
    use rand_core::{CryptoRng, RngCore};
    use sm2::{AffinePoint, ProjectivePoint, Sm2};
    use sm3::Sm3;

    /// Produces the same byte forever.
    struct ConstantRng(u8);

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            u32::from_be_bytes([self.0; 4])
        }

        fn next_u64(&mut self) -> u64 {
            u64::from_be_bytes([self.0; 8])
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ConstantRng {}

    #[test]
    fn rejects_digest_of_wrong_size() {
        let result = DomainParams::<Sm2>::new::<sha2::Sha384, Sm3>();
        assert_eq!(result.err(), Some(Error::Configuration));

        let result = DomainParams::<Sm2>::new::<Sm3, sha2::Sha512>();
        assert_eq!(result.err(), Some(Error::Configuration));
    }

    #[test]
    fn rejects_curve_of_wrong_size() {
        let result = DomainParams::<p384::NistP384>::new::<Sm3, Sm3>();
        assert_eq!(result.err(), Some(Error::Configuration));
    }

    #[test]
    fn identity_is_small_order() {
        let params = DomainParams::<Sm2>::new::<Sm3, Sm3>().unwrap();
        assert!(params.is_small_order(&AffinePoint::IDENTITY));
        assert!(!params.is_small_order(&AffinePoint::GENERATOR));
    }

    #[test]
    fn zero_draws_exhaust_scalar_sampling() {
        let params = DomainParams::<Sm2>::new::<Sm3, Sm3>().unwrap();
        let result = params.random_scalar(&mut ConstantRng(0));
        assert_eq!(result.err(), Some(Error::Internal));
    }

    #[test]
    fn draws_at_or_above_order_are_rejected() {
        let params = DomainParams::<Sm2>::new::<Sm3, Sm3>().unwrap();
        let result = params.random_scalar(&mut ConstantRng(0xff));
        assert_eq!(result.err(), Some(Error::Internal));
    }

    #[test]
    fn shared_secret_splits_coordinates() {
        let params = DomainParams::<Sm2>::new::<Sm3, Sm3>().unwrap();
        let point = ProjectivePoint::generator();
        let secret = params.shared_secret(&point).unwrap();

        let encoded = AffinePoint::GENERATOR.to_encoded_point(false);
        assert_eq!(secret.as_bytes(), &encoded.as_bytes()[1..]);
    }

    #[test]
    fn shared_secret_rejects_identity() {
        let params = DomainParams::<Sm2>::new::<Sm3, Sm3>().unwrap();
        let result = params.shared_secret(&ProjectivePoint::identity());
        assert_eq!(result.err(), Some(Error::Internal));
    }
}
