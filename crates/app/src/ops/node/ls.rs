use clap::Args;

use common::registry::NodeId;

use super::{summary, NodeOpError};

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Container to list (defaults to the root)
    pub parent: Option<NodeId>,
}

#[async_trait::async_trait]
impl crate::op::Op for Ls {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let parent = self.parent.unwrap_or(NodeId::ROOT);

        let children = session.registry.children(&parent)?;
        if children.is_empty() {
            return Ok("No nodes found".to_string());
        }
        let lines = children
            .iter()
            .map(|id| session.registry.get(id).map(|view| summary(&view)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }
}
