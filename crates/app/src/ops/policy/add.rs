use std::collections::BTreeSet;

use clap::{Args, ValueEnum};

use common::prelude::PublicKey;
use common::registry::{ModuleId, Policy};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Grant everyone
    Open,
    /// Deny everyone
    Closed,
    /// Grant only the listed principals
    Allow,
    /// Grant everyone but the listed principals
    Deny,
}

#[derive(Args, Debug, Clone)]
pub struct Add {
    /// Name nodes use to designate this policy
    pub name: String,

    /// Decision rule
    #[arg(value_enum)]
    pub kind: PolicyKind,

    /// Principal public key (hex), for allow and deny lists
    #[arg(long = "principal")]
    pub principals: Vec<PublicKey>,
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyAddError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
    #[error("{0} policies take no principals")]
    UnexpectedPrincipals(String),
}

impl Add {
    fn policy(&self) -> Result<Policy, PolicyAddError> {
        let principals: BTreeSet<PublicKey> = self.principals.iter().copied().collect();
        match self.kind {
            PolicyKind::Open | PolicyKind::Closed if !principals.is_empty() => Err(
                PolicyAddError::UnexpectedPrincipals(format!("{:?}", self.kind).to_lowercase()),
            ),
            PolicyKind::Open => Ok(Policy::Open),
            PolicyKind::Closed => Ok(Policy::Closed),
            PolicyKind::Allow => Ok(Policy::AllowList(principals)),
            PolicyKind::Deny => Ok(Policy::DenyList(principals)),
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Add {
    type Error = PolicyAddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let policy = self.policy()?;
        let mut session = ctx.session()?;
        let replaced = session.registry.is_installed(&ModuleId::new(&self.name));

        let output = format!(
            "{} policy {}: {}",
            if replaced { "replaced" } else { "installed" },
            self.name,
            policy
        );
        session
            .registry
            .install_policy(ModuleId::new(&self.name), policy);
        session.save()?;
        Ok(output)
    }
}
