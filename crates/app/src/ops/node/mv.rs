use clap::Args;

use common::registry::NodeId;

use super::NodeOpError;

#[derive(Args, Debug, Clone)]
pub struct Mv {
    /// Node to move
    pub id: NodeId,

    /// New parent container (defaults to the root)
    pub to: Option<NodeId>,
}

#[async_trait::async_trait]
impl crate::op::Op for Mv {
    type Error = NodeOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut session = ctx.session()?;
        let to = self.to.unwrap_or(NodeId::ROOT);

        session.registry.move_node(&session.operator, &self.id, &to)?;
        session.save()?;

        Ok(format!("moved {} to {}", self.id, to))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::op::test_util;
    use crate::op::Op;
    use crate::ops::node::ls::Ls;
    use common::registry::NodeSpec;

    #[tokio::test]
    async fn test_mv_then_ls() {
        let (_temp, ctx) = test_util::context();
        let mut session = ctx.session().unwrap();
        let owner = session.operator;
        let folder = session.registry.next_node_id(&owner).unwrap();
        session
            .registry
            .create(&owner, NodeSpec::container(folder, NodeId::ROOT))
            .unwrap();
        let a = NodeId::from_content(b"a");
        let b = NodeId::from_content(b"b");
        for id in [a, b] {
            session
                .registry
                .create(&owner, NodeSpec::asset(id, NodeId::ROOT, "ipfs://x"))
                .unwrap();
        }
        session.save().unwrap();

        Mv { id: a, to: Some(folder) }.execute(&ctx).await.unwrap();

        let root = Ls { parent: None }.execute(&ctx).await.unwrap();
        let lines: Vec<&str> = root.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(&folder.to_string()));
        assert!(lines[1].starts_with(&b.to_string()));

        let inside = Ls { parent: Some(folder) }.execute(&ctx).await.unwrap();
        assert!(inside.starts_with(&a.to_string()));

        // the empty container reads as such once emptied
        Mv { id: a, to: None }.execute(&ctx).await.unwrap();
        assert_eq!(
            Ls { parent: Some(folder) }.execute(&ctx).await.unwrap(),
            "No nodes found"
        );
    }
}
