use thiserror::Error;

use super::config::ConfigError;
use crate::core::forcefield::params::ParamLoadError;
use crate::core::io::restart::RestartError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Restart record error: {source}")]
    Restart {
        #[from]
        source: RestartError,
    },

    #[error("Failed to load coefficient table: {source}")]
    ParamLoad {
        #[from]
        source: ParamLoadError,
    },

    #[error("Pair style must be initialized after its last configuration change")]
    NotInitialized,

    #[error("Type pair ({itype}, {jtype}) is outside 1..={ntypes}")]
    TypePair {
        itype: usize,
        jtype: usize,
        ntypes: usize,
    },

    #[error("Force buffer holds {found} entries but {expected} particles are present")]
    ForceBufferSize { expected: usize, found: usize },
}
