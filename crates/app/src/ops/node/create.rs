use clap::Args;

use common::registry::{NodeId, NodeKind, NodeSpec};

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Kind of node: container, asset, reference or collection
    #[arg(long, default_value = "container")]
    pub kind: NodeKind,

    /// Parent container id (defaults to the root)
    #[arg(long)]
    pub parent: Option<NodeId>,

    /// Explicit node id. Non-asset ids default to the operator's next derived id
    #[arg(long)]
    pub id: Option<NodeId>,

    /// Content hashed into the id of an asset, in place of --id
    #[arg(long, conflicts_with = "id")]
    pub content: Option<String>,

    /// Content uri
    #[arg(long)]
    pub uri: Option<String>,

    /// Referenced asset id (repeat for collections)
    #[arg(long = "asset")]
    pub assets: Vec<NodeId>,
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;

        let id = match (self.id, &self.content) {
            (Some(id), _) => id,
            (None, Some(content)) => NodeId::from_content(content.as_bytes()),
            (None, None) if self.kind.requires_derived_id() => {
                session.registry.next_node_id(&session.operator)?
            }
            (None, None) => return Err(NodeOpError::MissingAssetId),
        };

        let spec = NodeSpec {
            id,
            parent: self.parent.unwrap_or(NodeId::ROOT),
            kind: self.kind,
            uri: self.uri.clone(),
            referenced_assets: self.assets.clone(),
        };
        let token = session.registry.create_node(&session.operator, spec)?;
        session.save()?;

        Ok(format!("created {} {} (token {})", self.kind, id, token))
    }
}
