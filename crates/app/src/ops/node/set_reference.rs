use clap::Args;

use common::registry::{ModuleId, NodeId};

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct SetReference {
    /// Node id
    pub id: NodeId,

    /// Installed policy governing who may reference this node; omit to clear
    pub module: Option<String>,
}

#[async_trait::async_trait]
impl crate::op::Op for SetReference {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;
        let module = self.module.as_deref().map(ModuleId::new);
        session
            .registry
            .set_reference_module(&session.operator, &self.id, module)?;
        session.save()?;

        Ok(match &self.module {
            Some(m) => format!("references to {} now governed by {}", self.id, m),
            None => format!("cleared reference module of {}", self.id),
        })
    }
}
