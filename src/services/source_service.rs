use std::path::Path;

use tracing::info;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::source::SourceDefinition;

/// Loads the ordered source list from the JSON config file. On first run,
/// when the file does not exist yet, a single placeholder definition is
/// written out and returned so there is always something to edit.
pub fn load_or_init(path: &str) -> Result<Vec<SourceDefinition>> {
    if !Path::new(path).exists() {
        let sample = vec![SourceDefinition::example()];
        let body = serde_json::to_string_pretty(&sample)?;
        std::fs::write(path, body)?;
        info!(path, "sources file not found, wrote placeholder definition");
        return Ok(sample);
    }

    let body = std::fs::read_to_string(path)?;
    let sources: Vec<SourceDefinition> = serde_json::from_str(&body)
        .map_err(|e| Error::Config(format!("invalid sources file {}: {}", path, e)))?;

    for source in &sources {
        source
            .validate()
            .map_err(|e| Error::Config(format!("invalid source definition: {}", e)))?;
    }

    Ok(sources)
}
