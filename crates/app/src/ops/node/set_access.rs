use clap::Args;

use common::registry::{ModuleId, NodeId};

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct SetAccess {
    /// Node id
    pub id: NodeId,

    /// Installed policy governing direct access; omit to clear
    pub module: Option<String>,
}

#[async_trait::async_trait]
impl crate::op::Op for SetAccess {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;
        let module = self.module.as_deref().map(ModuleId::new);
        session
            .registry
            .set_access_module(&session.operator, &self.id, module)?;
        session.save()?;

        Ok(match &self.module {
            Some(m) => format!("access to {} now governed by {}", self.id, m),
            None => format!("cleared access module of {}", self.id),
        })
    }
}
