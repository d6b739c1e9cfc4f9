use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A project-agnostic task definition. Carries no ids or dates so it can be
/// replayed into any project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TaskDuration>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    /// Motion user id of the original assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Asap,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Asap, Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Asap => "ASAP",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown priority '{wanted}'"))
    }
}

/// Motion accepts either a number of minutes or a keyword (`NONE`, `REMINDER`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskDuration {
    Minutes(u32),
    Keyword(String),
}

/// Parse the contents of a template file.
///
/// The canonical form is a bare JSON array of records. Files written by the
/// older script wrap the array as `{"tasks": [...]}` and are accepted too.
/// Each record is checked individually so the error names the bad index.
pub fn parse_template(contents: &str) -> Result<Vec<TemplateRecord>, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| format!("invalid JSON: {e}"))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => match obj.remove("tasks") {
            Some(Value::Array(entries)) => entries,
            _ => return Err("expected a JSON array of task records".into()),
        },
        _ => return Err("expected a JSON array of task records".into()),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let record: TemplateRecord =
                serde_json::from_value(entry).map_err(|e| format!("record {}: {e}", i + 1))?;
            if record.name.trim().is_empty() {
                return Err(format!("record {}: name is empty", i + 1));
            }
            Ok(record)
        })
        .collect()
}
