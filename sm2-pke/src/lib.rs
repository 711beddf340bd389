#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! ## Usage
//!
#![cfg_attr(feature = "getrandom", doc = "```")]
#![cfg_attr(not(feature = "getrandom"), doc = "```ignore")]
//! # fn example() -> Result<(), sm2_pke::Error> {
//! use rand_core::OsRng; // requires 'getrandom' feature
//! use sm2_pke::{Ciphertext, DecryptingKey, Mode};
//!
//! // Encrypting
//! let decrypting_key = DecryptingKey::random(&mut OsRng);
//! let encrypting_key = decrypting_key.encrypting_key();
//! let ciphertext = encrypting_key.encrypt(&mut OsRng, b"plaintext")?;
//! let bytes = ciphertext.to_vec(Mode::C1C3C2);
//!
//! // Decrypting
//! let ciphertext: Ciphertext = Ciphertext::from_slice(&bytes, Mode::C1C3C2)?;
//! let plaintext = decrypting_key.decrypt(&ciphertext)?;
//! assert_eq!(plaintext, b"plaintext");
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

mod ciphertext;
mod decrypting;
mod domain;
mod encrypting;
mod error;
mod kdf;

pub use crate::{
    ciphertext::{Ciphertext, Mode},
    decrypting::DecryptingKey,
    domain::{DIGEST_SIZE, FIELD_SIZE, MAX_ENCRYPT_ATTEMPTS, MAX_SCALAR_DRAWS},
    encrypting::EncryptingKey,
    error::{Error, Result},
};

pub use digest;
pub use elliptic_curve;
pub use sm2::Sm2;
pub use sm3::Sm3;

#[cfg(feature = "der")]
pub use der;
