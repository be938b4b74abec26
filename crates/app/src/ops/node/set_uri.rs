use clap::Args;

use common::registry::NodeId;

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct SetUri {
    /// Node id
    pub id: NodeId,

    /// New content uri
    pub uri: String,
}

#[async_trait::async_trait]
impl crate::op::Op for SetUri {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;
        session
            .registry
            .set_uri(&session.operator, &self.id, self.uri.clone())?;
        session.save()?;
        Ok(format!("set uri of {} to {}", self.id, self.uri))
    }
}
