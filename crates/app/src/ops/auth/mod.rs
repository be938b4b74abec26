use clap::{Args, Subcommand};

pub mod access;
pub mod reference;

use common::registry::RegistryError;

use crate::op::Op;
use crate::state::StateError;

crate::command_enum! {
    (Access, access::Access),
    (Reference, reference::Reference),
}

pub type AuthCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Auth {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[async_trait::async_trait]
impl Op for Auth {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthOpError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

pub(crate) fn verdict(allowed: bool) -> String {
    let verdict = if allowed { "allowed" } else { "denied" };
    verdict.to_string()
}
