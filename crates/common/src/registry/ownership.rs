use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, Signature};

use super::auth::Principal;
use super::id::Token;

/// Domain tag an owner signs over when vouching for a delegate key
pub const DELEGATE_DOMAIN: &[u8] = b"canopy:delegate:v1";

/// Trait for the identity / ownership layer the registry consults.
///  The registry never edits ownership itself, except to record the
///  owner of a freshly minted token.
/// Think of this as the seam where any ledger can back the registry
///  - a simple hash map
///  - a token contract
///  - an external identity service
pub trait OwnershipProvider: std::fmt::Debug {
    /// Map a requesting principal to the owner it acts on behalf of.
    ///  `None` means the principal has no recognized owning identity.
    fn resolve_owner(&self, principal: &Principal) -> Option<Principal>;

    /// The current owner of a token, `None` if it was never minted
    fn owner_of(&self, token: Token) -> Option<Principal>;

    /// Record `owner` as the holder of a newly created token
    fn mint(&mut self, token: Token, owner: Principal);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OwnershipError {
    #[error("invalid delegation signature")]
    InvalidSignature,
    #[error("token {0} was never minted")]
    UnknownToken(Token),
    #[error("principal is not the owner of token {0}")]
    NotOwner(Token),
    #[error("a principal cannot delegate to itself")]
    SelfDelegation,
    #[error("delegation would form a cycle")]
    DelegationCycle,
}

/// In-memory ownership ledger
///
/// Every principal is its own owner unless it was registered as a
///  delegate signer of some other principal. Delegation edges are kept
///  as signed; a principal resolves to the end of its chain, so an
///  owner that later becomes a delegate carries its own delegates and
///  tokens along with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryOwnership {
    /// delegate signer -> principal that vouched for it
    delegates: HashMap<Principal, Principal>,
    /// token -> owner recorded at mint or transfer
    owners: HashMap<Token, Principal>,
}

impl MemoryOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    /// The message an owner signs to vouch for `delegate`
    pub fn delegation_message(delegate: &PublicKey) -> Vec<u8> {
        let mut msg = DELEGATE_DOMAIN.to_vec();
        msg.extend_from_slice(&delegate.to_bytes());
        msg
    }

    /// Let `delegate` act on behalf of `owner`.
    ///  `signature` must be `owner`'s signature over
    ///  [`MemoryOwnership::delegation_message`].
    pub fn register_delegate(
        &mut self,
        owner: PublicKey,
        delegate: PublicKey,
        signature: &Signature,
    ) -> Result<(), OwnershipError> {
        if owner == delegate {
            return Err(OwnershipError::SelfDelegation);
        }
        owner
            .verify(&Self::delegation_message(&delegate), signature)
            .map_err(|_| OwnershipError::InvalidSignature)?;

        if self.root_of(&owner) != Some(delegate) {
            tracing::info!("registered delegate {} for owner {}", delegate, owner);
            self.delegates.insert(delegate, owner);
            Ok(())
        } else {
            Err(OwnershipError::DelegationCycle)
        }
    }

    /// Follow delegation edges from `principal` to the identity at the
    ///  end of the chain. `None` only for a cyclic ledger (e.g. a
    ///  hand-edited snapshot).
    fn root_of(&self, principal: &Principal) -> Option<Principal> {
        let mut current = *principal;
        for _ in 0..=self.delegates.len() {
            match self.delegates.get(&current) {
                Some(next) => current = *next,
                None => return Some(current),
            }
        }
        tracing::warn!("delegation chain from {} does not terminate", principal);
        None
    }

    pub fn revoke_delegate(&mut self, delegate: &PublicKey) -> bool {
        self.delegates.remove(delegate).is_some()
    }

    /// Move a token to a new owner. `from` must resolve to the current owner.
    pub fn transfer(
        &mut self,
        token: Token,
        from: &Principal,
        to: Principal,
    ) -> Result<(), OwnershipError> {
        let current = self
            .owner_of(token)
            .ok_or(OwnershipError::UnknownToken(token))?;
        if self.resolve_owner(from) != Some(current) {
            return Err(OwnershipError::NotOwner(token));
        }
        let to = self.resolve_owner(&to).unwrap_or(to);
        self.owners.insert(token, to);
        Ok(())
    }

    /// Tokens whose effective owner is `owner`, in ascending order
    pub fn tokens_of(&self, owner: &Principal) -> Vec<Token> {
        let mut tokens: Vec<Token> = self
            .owners
            .iter()
            .filter(|(_, o)| self.root_of(o).as_ref() == Some(owner))
            .map(|(t, _)| *t)
            .collect();
        tokens.sort_unstable();
        tokens
    }
}

impl OwnershipProvider for MemoryOwnership {
    fn resolve_owner(&self, principal: &Principal) -> Option<Principal> {
        self.root_of(principal)
    }

    fn owner_of(&self, token: Token) -> Option<Principal> {
        self.owners.get(&token).and_then(|o| self.root_of(o))
    }

    fn mint(&mut self, token: Token, owner: Principal) {
        self.owners.insert(token, owner);
    }
}
