use std::error::Error;
use std::path::PathBuf;

use common::prelude::{PublicKey, Registry};

use crate::state::{AppState, StateError};

#[derive(Debug, Clone)]
pub struct OpContext {
    /// Optional custom state path (defaults to ~/.canopy)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub fn state(&self) -> Result<AppState, StateError> {
        AppState::load(self.config_path.clone())
    }

    /// Load the registry and the operator identity acting on it
    pub fn session(&self) -> Result<Session, StateError> {
        let state = self.state()?;
        let operator = state.load_key()?.public();
        let registry = state.load_registry()?;
        Ok(Session {
            state,
            operator,
            registry,
        })
    }
}

/// A loaded registry, ready for one op to read or mutate
pub struct Session {
    pub state: AppState,
    pub operator: PublicKey,
    pub registry: Registry,
}

impl Session {
    pub fn save(&self) -> Result<(), StateError> {
        self.state.save_registry(&self.registry)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
pub mod test_util {
    use tempfile::TempDir;

    use super::OpContext;
    use crate::state::AppState;

    /// A context over a freshly initialized state directory.
    ///  Keep the `TempDir` alive for as long as the context is used.
    pub fn context() -> (TempDir, OpContext) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("canopy");
        AppState::init(Some(path.clone()), None).unwrap();
        (temp, OpContext::new(Some(path)))
    }
}
