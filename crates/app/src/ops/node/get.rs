use clap::Args;

use common::registry::NodeId;

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Node id
    pub id: NodeId,

    /// Print the full record as JSON
    #[arg(long)]
    pub json: bool,
}

#[async_trait::async_trait]
impl crate::op::Op for Get {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let view = session.registry.get(&self.id)?;

        if self.json {
            return Ok(serde_json::to_string_pretty(&view)?);
        }

        let module = |m: &Option<common::registry::ModuleId>| {
            m.as_ref().map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())
        };
        let mut output = format!(
            "id: {}\nkind: {}\ntoken: {}\nparent: {}\nuri: {}\naccess module: {}\nreference module: {}\ncreator: {}",
            view.id,
            view.kind,
            view.token,
            view.parent,
            view.uri.as_deref().unwrap_or("-"),
            module(&view.access_module),
            module(&view.reference_module),
            view.creator,
        );
        if let Some(owner) = view.owner {
            output.push_str(&format!("\nowner: {}", owner));
        }
        for asset in &view.referenced_assets {
            output.push_str(&format!("\nasset: {}", asset));
        }
        Ok(output)
    }
}
