use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct List;

#[derive(Debug, thiserror::Error)]
pub enum PolicyListError {
    #[error("state error: {0}")]
    State(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for List {
    type Error = PolicyListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.session()?;
        let policies = session.registry.policies();
        if policies.is_empty() {
            return Ok("No policies installed".to_string());
        }
        Ok(policies
            .iter()
            .map(|(name, policy)| format!("{}: {}", name, policy))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
