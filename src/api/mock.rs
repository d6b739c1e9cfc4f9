use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use super::{MotionApi, NewProject, NewTask, Project, RemoteTask, Schedule, Workspace};
use crate::error::MotionError;

/// In-memory Motion that records every call. Only tasks are seeded; the
/// other listings come back empty.
#[derive(Default)]
pub struct MockMotion {
    pub tasks: HashMap<String, Vec<RemoteTask>>,
    pub created_tasks: Arc<Mutex<Vec<(Instant, NewTask)>>>,
    pub created_projects: Arc<Mutex<Vec<NewProject>>>,
    pub calls: Arc<Mutex<usize>>,
    fail_task_names: Vec<String>,
    fail_listing: bool,
    fail_projects: bool,
}

impl MockMotion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(mut self, project_id: &str, tasks: Vec<RemoteTask>) -> Self {
        self.tasks.insert(project_id.to_string(), tasks);
        self
    }

    /// Creating a task with this name returns an API error.
    pub fn failing_task(mut self, name: &str) -> Self {
        self.fail_task_names.push(name.to_string());
        self
    }

    pub fn with_listing_failure(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn with_project_failure(mut self) -> Self {
        self.fail_projects = true;
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    pub fn created(&self) -> Vec<(Instant, NewTask)> {
        self.created_tasks.lock().unwrap().clone()
    }

    pub fn projects_created(&self) -> Vec<NewProject> {
        self.created_projects.lock().unwrap().clone()
    }

    fn record_call(&self) {
        *self.calls.lock().unwrap() += 1;
    }

    fn listing_error(&self) -> Result<(), MotionError> {
        if self.fail_listing {
            return Err(MotionError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: "mock listing failure".into(),
            });
        }
        Ok(())
    }
}

pub fn remote_task(id: &str, name: &str) -> RemoteTask {
    RemoteTask {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        duration: None,
        priority: None,
        labels: vec![],
        assignees: vec![],
    }
}

#[async_trait]
impl MotionApi for MockMotion {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, MotionError> {
        self.record_call();
        self.listing_error()?;
        Ok(vec![])
    }

    async fn list_projects(&self, _workspace_id: &str) -> Result<Vec<Project>, MotionError> {
        self.record_call();
        self.listing_error()?;
        Ok(vec![])
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<RemoteTask>, MotionError> {
        self.record_call();
        self.listing_error()?;
        Ok(self.tasks.get(project_id).cloned().unwrap_or_default())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, MotionError> {
        self.record_call();
        self.listing_error()?;
        Ok(vec![])
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, MotionError> {
        self.record_call();
        if self.fail_task_names.contains(&task.name) {
            return Err(MotionError::Api {
                status: reqwest::StatusCode::BAD_REQUEST,
                body: format!("mock failure for {}", task.name),
            });
        }
        let mut created = self.created_tasks.lock().unwrap();
        created.push((Instant::now(), task.clone()));
        Ok(format!("task-{}", created.len()))
    }

    async fn create_project(&self, project: &NewProject) -> Result<String, MotionError> {
        self.record_call();
        if self.fail_projects {
            return Err(MotionError::Api {
                status: reqwest::StatusCode::UNPROCESSABLE_ENTITY,
                body: "mock project failure".into(),
            });
        }
        let mut created = self.created_projects.lock().unwrap();
        created.push(project.clone());
        Ok(format!("project-{}", created.len()))
    }
}
