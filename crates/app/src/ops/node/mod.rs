use clap::{Args, Subcommand};

pub mod create;
pub mod get;
pub mod ls;
pub mod mv;
pub mod set_access;
pub mod set_assets;
pub mod set_reference;
pub mod set_uri;

use common::registry::{NodeView, RegistryError};

use crate::op::Op;
use crate::state::StateError;

crate::command_enum! {
    (Create, create::Create),
    (Get, get::Get),
    (Ls, ls::Ls),
    (Mv, mv::Mv),
    (SetUri, set_uri::SetUri),
    (SetAccess, set_access::SetAccess),
    (SetReference, set_reference::SetReference),
    (SetAssets, set_assets::SetAssets),
}

pub type NodeCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Node {
    #[command(subcommand)]
    pub command: NodeCommand,
}

#[async_trait::async_trait]
impl Op for Node {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

/// Shared failure modes of the node ops
#[derive(Debug, thiserror::Error)]
pub enum NodeOpError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("an asset needs --id or --content")]
    MissingAssetId,
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One line per node: id, kind, then uri if it has one
pub(crate) fn summary(view: &NodeView) -> String {
    match &view.uri {
        Some(uri) => format!("{} {} {}", view.id, view.kind, uri),
        None => format!("{} {}", view.id, view.kind),
    }
}
