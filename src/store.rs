use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::MotionError;
use crate::model::template::{parse_template, TemplateRecord};

/// Template files on local disk, one JSON file per template.
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of the `.json` files in the templates directory, sorted.
    /// A missing directory just means there are no templates yet.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.dir.display()))
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".json"))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Read and validate a whole template. Nothing is returned unless every
    /// record is well formed.
    pub fn load(&self, name: &str) -> Result<Vec<TemplateRecord>> {
        let path = self.path_for(name)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MotionError::TemplateNotFound(path).into())
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };

        parse_template(&contents)
            .map_err(|reason| MotionError::InvalidTemplate { path, reason }.into())
    }

    /// Write a new template. Existing files are never overwritten.
    pub fn save(&self, name: &str, records: &[TemplateRecord]) -> Result<PathBuf> {
        let path = self.path_for(name)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let json = serde_json::to_string_pretty(records)?;
        let mut file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(MotionError::TemplateExists(path).into())
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to create {}", path.display())),
        };
        writeln!(file, "{json}").with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, MotionError> {
        Ok(self.dir.join(template_file_name(name)?))
    }
}

/// Normalize a user-supplied template name into a file name.
pub fn template_file_name(name: &str) -> Result<String, MotionError> {
    let trimmed = name.trim();
    let stem = trimmed.strip_suffix(".json").unwrap_or(trimmed);
    if stem.is_empty()
        || stem.starts_with('.')
        || stem.contains(['/', '\\'])
        || stem.chars().any(char::is_control)
    {
        return Err(MotionError::InvalidTemplateName(name.to_string()));
    }
    Ok(format!("{}.json", stem.replace(' ', "_")))
}

/// Default template name: `<workspace>.<project>.<YYYYmmdd_HHMMSS>.json`.
pub fn suggested_name(workspace: &str, project: &str, now: DateTime<Utc>) -> String {
    let clean = |s: &str| s.trim().replace([' ', '/', '\\'], "_");
    format!(
        "{}.{}.{}.json",
        clean(workspace),
        clean(project),
        now.format("%Y%m%d_%H%M%S")
    )
}
