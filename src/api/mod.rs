pub mod client;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::model::template::{Priority, TaskDuration};

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Schedule {
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assignee {
    pub id: String,
}

/// A task as returned by `GET /tasks`. Only the fields a template needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Option<TaskDuration>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScheduled {
    pub start_date: String,
    pub deadline_type: String,
    pub schedule: String,
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub name: String,
    pub workspace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<TaskDuration>,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scheduled: Option<AutoScheduled>,
}

/// Body of `POST /projects`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    pub workspace_id: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// The slice of the Motion REST API this tool talks to.
#[async_trait]
pub trait MotionApi: Send + Sync {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, MotionError>;
    async fn list_projects(&self, workspace_id: &str) -> Result<Vec<Project>, MotionError>;
    /// Every task in the project, across all pages.
    async fn list_tasks(&self, project_id: &str) -> Result<Vec<RemoteTask>, MotionError>;
    async fn list_schedules(&self) -> Result<Vec<Schedule>, MotionError>;
    /// Returns the id of the created task.
    async fn create_task(&self, task: &NewTask) -> Result<String, MotionError>;
    /// Returns the id of the created project.
    async fn create_project(&self, project: &NewProject) -> Result<String, MotionError>;
}
