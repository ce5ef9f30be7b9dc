use serde_json::Value;

use super::{Fragment, FragmentLoader};
use crate::error::ConfigError;
use crate::resolver::FragmentContext;

/// Loads declarative `.json` fragments.
///
/// JSON fragments cannot declare dependencies, so they are always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl FragmentLoader for JsonLoader {
    fn extension(&self) -> &str {
        "json"
    }

    fn evaluate(
        &self,
        fragment: &Fragment,
        _ctx: &mut FragmentContext<'_>,
    ) -> Result<Option<Value>, ConfigError> {
        let content = std::fs::read_to_string(&fragment.location)?;
        let value = serde_json::from_str(&content).map_err(|source| ConfigError::FragmentParse {
            path: fragment.location.clone(),
            source,
        })?;
        Ok(Some(value))
    }
}
