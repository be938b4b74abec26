/**
 * Cryptographic types and operations.
 *  - Public and Private key implementations
 *  - Delegation signatures
 */
pub mod crypto;
/**
 * The content registry: nodes, the tree index,
 *  ownership, auth modules and the two
 *  authorization resolvers.
 */
pub mod registry;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{PublicKey, SecretKey};
    pub use crate::registry::{
        ModuleId, NodeId, NodeKind, NodeSpec, Policy, Registry, RegistryError, RegistryEvent,
    };
    pub use crate::version::build_info;
}
