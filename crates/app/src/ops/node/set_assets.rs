use clap::Args;

use common::registry::NodeId;

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct SetAssets {
    /// Reference or collection id
    pub id: NodeId,

    /// Asset ids, in collection order
    #[arg(required = true)]
    pub assets: Vec<NodeId>,
}

#[async_trait::async_trait]
impl crate::op::Op for SetAssets {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;
        session
            .registry
            .set_referenced_assets(&session.operator, &self.id, self.assets.clone())?;
        session.save()?;
        Ok(format!("{} now references {} asset(s)", self.id, self.assets.len()))
    }
}
