//! `OpenPGP` transforms over in-memory buffers for a single RSA entity.
//!
//! An [`Entity`] is built from bare key packets, then used to encrypt, decrypt,
//! sign and verify byte buffers. Secrets are supplied at call time through a
//! [`KeyProvider`].
mod decrypt;
mod encrypt;
mod errors;
mod key;
mod pipeline;
mod profile;
mod provider;
mod sign;
mod types;
mod verify;

pub mod armor;
pub mod compression;

/// Re-export the `pgp` crate.
pub use pgp;

pub use decrypt::*;
pub use encrypt::*;
pub use errors::*;
pub use key::*;
pub use pipeline::*;
pub use profile::*;
pub use provider::*;
pub use sign::*;
pub use types::*;
pub use verify::*;
