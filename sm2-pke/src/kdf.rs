//! Key derivation function from GM/T 0003.4-2012 § 5.4.3.
//!
//! ```text
//! Ha_i = Hash(Z || ct_i), ct_i = 1, 2, ... as 32-bit big endian
//! K    = Ha_1 || Ha_2 || ... truncated to klen bytes
//! ```
//!
//! This is the same construction as the ANSI X9.63 KDF with an empty shared
//! info string.

use crate::{Error, Result};
use digest::Digest;
use elliptic_curve::subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Fill `out` with `KDF(z, out.len())`.
pub(crate) fn kdf<D: Digest>(z: &[u8], out: &mut [u8]) -> Result<()> {
    let block_size = <D as Digest>::output_size();
    let max_blocks = usize::try_from(u32::MAX).unwrap_or(usize::MAX);
    if out.len().div_ceil(block_size) > max_blocks {
        return Err(Error::Internal);
    }

    let mut ct: u32 = 1;
    for chunk in out.chunks_mut(block_size) {
        let mut ha = D::new().chain_update(z).chain_update(ct.to_be_bytes()).finalize();
        chunk.copy_from_slice(&ha[..chunk.len()]);
        ha[..].zeroize();
        ct = ct.wrapping_add(1);
    }

    Ok(())
}

/// Is every byte of the mask zero?
///
/// Runs in time dependent only on the length.
pub(crate) fn is_all_zero(mask: &[u8]) -> bool {
    let acc = mask.iter().fold(0u8, |acc, byte| acc | byte);
    bool::from(acc.ct_eq(&0) & Choice::from(u8::from(!mask.is_empty())))
}

/// `data ^= mask`, byte-wise.
pub(crate) fn xor(data: &mut [u8], mask: &[u8]) {
    for (byte, m) in data.iter_mut().zip(mask) {
        *byte ^= m;
    }
}
