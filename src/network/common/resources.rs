use anyhow::{Context, Result};
use std::sync::Arc;

use super::setup::{CommandLineOptions, StorageType};
use crate::storage::ParameterDatabase;

pub const DEFAULT_DB_PATH: &str = "bayesdiag.db";

/// The ResourceContext provides access to the parameter database chosen on
/// the command line.
pub struct ResourceContext {
    pub config: CommandLineOptions,
    pub database: Arc<ParameterDatabase>,
}

impl ResourceContext {
    pub fn new(options: &CommandLineOptions) -> Result<ResourceContext> {
        let database = match options.storage_type {
            StorageType::InMemory => ParameterDatabase::new_in_memory()?,
            StorageType::Persistent => {
                let path = options.db_path.as_deref().unwrap_or(DEFAULT_DB_PATH);
                ParameterDatabase::new(path)
                    .with_context(|| format!("Failed to open parameter database at {}", path))?
            }
        };
        Ok(ResourceContext {
            config: options.clone(),
            database: Arc::new(database),
        })
    }
}
