use clap::Args;

use common::prelude::PublicKey;
use common::registry::NodeId;

use super::{verdict, AuthOpError};

#[derive(Args, Debug, Clone)]
pub struct Reference {
    /// Asset id
    pub id: NodeId,

    /// Principal public key (hex); defaults to the operator
    #[arg(long)]
    pub principal: Option<PublicKey>,
}

#[async_trait::async_trait]
impl crate::op::Op for Reference {
    type Error = AuthOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let principal = self.principal.unwrap_or(session.operator);
        Ok(verdict(session.registry.ref_auth(&self.id, &principal)?))
    }
}
