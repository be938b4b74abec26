//! Cryptographic primitives for Canopy
//!
//! Principals in the registry are Ed25519 public keys. This module provides:
//!
//! - **Identity**: Ed25519 keypairs (`SecretKey`/`PublicKey`) naming principals
//! - **Delegation**: detached signatures an owner uses to vouch for a delegate signer
//!
//! Node ids of non-asset nodes are derived from the owning principal's key
//!  bytes, see [`NodeId::derive`](crate::registry::NodeId::derive).

mod keys;

pub use ed25519_dalek::Signature;
pub use keys::{KeyError, PublicKey, SecretKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
