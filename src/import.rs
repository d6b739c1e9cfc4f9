use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::time::Duration;

use crate::api::{AutoScheduled, MotionApi, NewProject, NewTask};
use crate::model::template::{Priority, TemplateRecord};
use crate::store::TemplateStore;

/// Motion allows 12 requests per minute; 8s keeps creation at 7.5/minute.
pub const REQUEST_DELAY: Duration = Duration::from_secs(8);

/// Largest accepted "days from now" answer for a due date.
pub const MAX_DUE_DAYS: u32 = 3650;

/// Schedule used when auto-scheduling is on but no schedule was picked.
pub const DEFAULT_SCHEDULE: &str = "Work Hours";

/// Where and how the template's tasks get created.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub workspace_id: String,
    pub project_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub schedule: Option<String>,
}

#[derive(Debug)]
pub struct ImportFailure {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub total: usize,
    pub created: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `now + days`, or `None` when the result is out of range.
pub fn due_date_in_days(days: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.checked_add_signed(TimeDelta::try_days(i64::from(days))?)
}

/// Create the project the imported tasks will land in.
pub async fn create_target_project(
    api: &dyn MotionApi,
    workspace_id: &str,
    name: &str,
    priority: Priority,
    due_date: Option<DateTime<Utc>>,
) -> Result<String> {
    let project = NewProject {
        name: name.trim().to_string(),
        workspace_id: workspace_id.to_string(),
        priority,
        due_date: due_date.map(format_timestamp),
    };
    let id = api
        .create_project(&project)
        .await
        .with_context(|| format!("Error creating project '{}'", project.name))?;
    tracing::info!(project_id = %id, name = %project.name, "project created");
    Ok(id)
}

/// Resolve the schedule to use: an explicit pick wins, otherwise
/// auto-scheduling falls back to the default schedule.
pub fn resolve_schedule(picked: Option<String>, auto_schedule: bool) -> Option<String> {
    picked.or_else(|| auto_schedule.then(|| DEFAULT_SCHEDULE.to_string()))
}

pub fn build_task(record: &TemplateRecord, plan: &ImportPlan, now: DateTime<Utc>) -> NewTask {
    NewTask {
        name: record.name.clone(),
        workspace_id: plan.workspace_id.clone(),
        project_id: plan.project_id.clone(),
        due_date: plan.due_date.map(format_timestamp),
        duration: record.duration.clone(),
        priority: record.priority,
        description: record.description.clone(),
        labels: record.labels.clone(),
        assignee_id: record.assignee_id.clone(),
        auto_scheduled: plan.schedule.as_ref().map(|schedule| AutoScheduled {
            start_date: format_timestamp(now),
            deadline_type: "SOFT".into(),
            schedule: schedule.clone(),
        }),
    }
}

/// Create one task per record, in order, pausing `delay` between calls.
///
/// A failed creation is reported and skipped; the rest of the batch still runs.
pub async fn import_template(
    api: &dyn MotionApi,
    records: &[TemplateRecord],
    plan: &ImportPlan,
    delay: Duration,
) -> ImportOutcome {
    let mut outcome = ImportOutcome {
        total: records.len(),
        ..Default::default()
    };

    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            tokio::time::sleep(delay).await;
        }
        println!("Creating task {}/{}...", i + 1, records.len());

        let task = build_task(record, plan, Utc::now());
        match api.create_task(&task).await {
            Ok(id) => {
                println!("Task '{}' created (ID: {id})", record.name);
                outcome.created.push(id);
            }
            Err(e) => {
                let payload = serde_json::to_string(&task).unwrap_or_default();
                tracing::warn!(task = %record.name, error = %e, "task creation failed");
                println!("Error creating task '{}': {e}", record.name);
                println!("Payload sent: `{payload}`");
                outcome.failures.push(ImportFailure {
                    name: record.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        created = outcome.created.len(),
        failed = outcome.failures.len(),
        total = outcome.total,
        "import finished"
    );
    outcome
}

/// Load a stored template and import it. The whole file is validated before
/// the first creation call.
pub async fn import_from_store(
    api: &dyn MotionApi,
    store: &TemplateStore,
    template_name: &str,
    plan: &ImportPlan,
    delay: Duration,
) -> Result<ImportOutcome> {
    let records = store.load(template_name)?;
    Ok(import_template(api, &records, plan, delay).await)
}
