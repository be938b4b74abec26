use clap::Args;

use common::registry::MAX_BATCH_SIZE;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default log directive written to config.toml
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Largest batch a single create may publish
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    pub max_batch_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
    #[error("max batch size must be between 1 and {}", MAX_BATCH_SIZE)]
    InvalidBatchSize,
    #[error("invalid log level {0:?}: {1}")]
    InvalidLogLevel(String, tracing_subscriber::filter::ParseError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        if self.max_batch_size == 0 || self.max_batch_size > MAX_BATCH_SIZE {
            return Err(InitError::InvalidBatchSize);
        }
        if let Err(e) = tracing_subscriber::EnvFilter::try_new(&self.log_level) {
            return Err(InitError::InvalidLogLevel(self.log_level.clone(), e));
        }
        let config = AppConfig {
            log_level: self.log_level.clone(),
            max_batch_size: self.max_batch_size,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let operator = state.load_key()?.public();

        let output = format!(
            "Initialized canopy directory at: {}\n\
             - Key: {}\n\
             - Registry: {}\n\
             - Config: {}\n\
             - Operator: {}\n\
             - Log level: {}\n\
             - Max batch size: {}",
            state.canopy_dir.display(),
            state.key_path.display(),
            state.registry_path.display(),
            state.config_path.display(),
            operator,
            state.config.log_level,
            state.config.max_batch_size
        );

        Ok(output)
    }
}
