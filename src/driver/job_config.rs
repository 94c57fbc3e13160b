use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use serde_json::{Map, Value};

use crate::driver::{JobConfig, JobConfigLoader};
use crate::foundation::core::Variant;
use crate::foundation::error::{SnapError, SnapResult};

/// Loads JSON job configurations and writes each variant into one top-level field.
#[derive(Clone, Debug)]
pub struct JsonJobLoader {
    field: String,
}

impl JsonJobLoader {
    /// Variants are written to `field` (e.g. `rotation`).
    pub fn new(field: impl Into<String>) -> SnapResult<Self> {
        let field = field.into();
        if field.is_empty() {
            return Err(SnapError::validation("variant field name must be non-empty"));
        }
        Ok(Self { field })
    }
}

impl JobConfigLoader for JsonJobLoader {
    type Config = JsonJobConfig;

    fn load(&self, path: &Path) -> SnapResult<JsonJobConfig> {
        let f = File::open(path)
            .map_err(|e| SnapError::config(format!("open job '{}': {e}", path.display())))?;
        let value: Value = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| SnapError::config(format!("parse job '{}': {e}", path.display())))?;
        let Value::Object(doc) = value else {
            return Err(SnapError::config(format!(
                "job '{}' must be a JSON object",
                path.display()
            )));
        };
        Ok(JsonJobConfig {
            doc,
            field: self.field.clone(),
        })
    }
}

/// JSON job configuration loaded by [`JsonJobLoader`].
#[derive(Clone, Debug, PartialEq)]
pub struct JsonJobConfig {
    doc: Map<String, Value>,
    field: String,
}

impl JsonJobConfig {
    /// Borrow the underlying document.
    pub fn document(&self) -> &Map<String, Value> {
        &self.doc
    }
}

impl JobConfig for JsonJobConfig {
    fn set_variant(&mut self, variant: &Variant) -> SnapResult<()> {
        self.doc.insert(self.field.clone(), Value::from(variant.value));
        Ok(())
    }

    fn save(&self, path: &Path) -> SnapResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapError::config(format!("create staging dir '{}': {e}", parent.display()))
            })?;
        }
        let f = File::create(path)
            .map_err(|e| SnapError::config(format!("create '{}': {e}", path.display())))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &self.doc)
            .map_err(|e| SnapError::config(format!("write '{}': {e}", path.display())))?;
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/job_config.rs"]
mod tests;
