use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::api::{MotionApi, RemoteTask};
use crate::model::template::TemplateRecord;
use crate::store::{template_file_name, TemplateStore};

#[derive(Debug)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub count: usize,
}

/// Strip a remote task down to the fields worth replaying.
pub fn to_record(task: RemoteTask) -> TemplateRecord {
    tracing::debug!(task_id = %task.id, "templating task");
    TemplateRecord {
        name: task.name,
        description: task.description.filter(|d| !d.trim().is_empty()),
        duration: task.duration,
        labels: task
            .labels
            .into_iter()
            .map(|l| l.name)
            .filter(|name| !name.is_empty())
            .collect(),
        priority: task
            .priority
            .and_then(|p| p.parse().ok())
            .unwrap_or_default(),
        assignee_id: task.assignees.into_iter().next().map(|a| a.id),
    }
}

/// Pull every task of a project into a new template file.
pub async fn export_project(
    api: &dyn MotionApi,
    store: &TemplateStore,
    project_id: &str,
    template_name: &str,
) -> Result<ExportOutcome> {
    // Reject a bad name before spending requests.
    template_file_name(template_name)?;

    let tasks = api
        .list_tasks(project_id)
        .await
        .context("Could not retrieve tasks for this project")?;
    if tasks.is_empty() {
        tracing::warn!(project_id, "project has no tasks, writing an empty template");
    }

    let records: Vec<TemplateRecord> = tasks.into_iter().map(to_record).collect();
    let path = store.save(template_name, &records)?;
    tracing::info!(path = %path.display(), count = records.len(), "template written");

    Ok(ExportOutcome {
        path,
        count: records.len(),
    })
}
