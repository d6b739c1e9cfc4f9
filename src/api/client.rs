use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{MotionApi, NewProject, NewTask, Project, RemoteTask, Schedule, Workspace};
use crate::config::ApiKey;
use crate::error::MotionError;

const API_KEY_HEADER: &str = "X-API-Key";

pub struct MotionClient {
    base_url: String,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl MotionClient {
    pub fn new(base_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from `MOTION_API_KEY`. Without a key there is no
    /// client, so nothing can be sent.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, MotionError> {
        Self::from_lookup(base_url, |var| std::env::var(var).ok())
    }

    pub fn from_lookup(
        base_url: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MotionError> {
        let api_key = ApiKey::from_lookup(lookup)?;
        Ok(Self::new(base_url, api_key))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET a list endpoint, following `meta.nextCursor` until it runs out.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, MotionError> {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.url(path))
                .header(API_KEY_HEADER, self.api_key.as_str())
                .query(query);
            if let Some(cursor) = &cursor {
                request = request.query(&[("cursor", cursor.as_str())]);
            }
            tracing::debug!(path, cursor = cursor.as_deref(), "GET");

            let page: Page<T> = read_json(request.send().await?).await?;
            items.extend(page.items);

            match page.meta.and_then(|m| m.next_cursor) {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn post<B: serde::Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, MotionError> {
        tracing::debug!(path, "POST");
        let resp = self
            .client
            .post(self.url(path))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(body)
            .send()
            .await?;
        let created: Created = read_json(resp).await?;
        Ok(created.id)
    }
}

/// List responses wrap their items under a resource-named key.
#[derive(Deserialize)]
struct Page<T> {
    #[serde(alias = "workspaces", alias = "projects", alias = "tasks")]
    items: Vec<T>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, MotionError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(MotionError::Api { status, body });
    }
    Ok(resp.json().await?)
}

#[async_trait]
impl MotionApi for MotionClient {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, MotionError> {
        self.get_paged("/workspaces", &[]).await
    }

    async fn list_projects(&self, workspace_id: &str) -> Result<Vec<Project>, MotionError> {
        self.get_paged("/projects", &[("workspaceId", workspace_id)]).await
    }

    async fn list_tasks(&self, project_id: &str) -> Result<Vec<RemoteTask>, MotionError> {
        self.get_paged("/tasks", &[("projectId", project_id)]).await
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, MotionError> {
        tracing::debug!(path = "/schedules", "GET");
        let resp = self
            .client
            .get(self.url("/schedules"))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;
        read_json(resp).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<String, MotionError> {
        self.post("/tasks", task).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<String, MotionError> {
        self.post("/projects", project).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::Priority;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> MotionClient {
        MotionClient::from_lookup(server.uri(), |_| Some("test-key".into())).unwrap()
    }

    #[tokio::test]
    async fn missing_key_builds_no_client_and_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workspaces": []})))
            .mount(&server)
            .await;

        let result = MotionClient::from_lookup(server.uri(), |_| None);
        assert!(matches!(result, Err(MotionError::MissingApiKey)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_project_posts_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/projects"))
            .and(header("X-API-Key", "test-key"))
            .and(body_json(json!({
                "name": "Q4 launch",
                "workspaceId": "w1",
                "priority": "ASAP",
                "dueDate": "2026-10-24T09:00:00Z"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "proj-7",
                "name": "Q4 launch"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let project = NewProject {
            name: "Q4 launch".into(),
            workspace_id: "w1".into(),
            priority: Priority::Asap,
            due_date: Some("2026-10-24T09:00:00Z".into()),
        };
        let id = client_for(&server).create_project(&project).await.unwrap();
        assert_eq!(id, "proj-7");
    }

    #[tokio::test]
    async fn list_tasks_follows_cursor() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("projectId", "p1"))
            .and(header("X-API-Key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tasks": [{"id": "t1", "name": "First", "duration": 30}],
                "meta": {"nextCursor": "c2", "pageSize": 1}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("projectId", "p1"))
            .and(query_param("cursor", "c2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tasks": [{"id": "t2", "name": "Second", "labels": [{"name": "ops"}]}],
                "meta": {"pageSize": 1}
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        let tasks = client_for(&server).list_tasks("p1").await.unwrap();
        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(tasks[1].labels[0].name, "ops");
    }

    #[tokio::test]
    async fn list_workspaces_reads_wrapped_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/workspaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "workspaces": [{"id": "w1", "name": "Personal", "type": "INDIVIDUAL"}],
                "meta": {"nextCursor": null}
            })))
            .mount(&server)
            .await;

        let workspaces = client_for(&server).list_workspaces().await.unwrap();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].name, "Personal");
    }

    #[tokio::test]
    async fn list_schedules_reads_bare_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/schedules"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Work Hours", "timezone": "Europe/Berlin", "schedule": {}}
            ])))
            .mount(&server)
            .await;

        let schedules = client_for(&server).list_schedules().await.unwrap();
        assert_eq!(schedules[0].name, "Work Hours");
    }

    #[tokio::test]
    async fn create_task_posts_camel_case_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(header("X-API-Key", "test-key"))
            .and(body_partial_json(json!({
                "name": "Review",
                "workspaceId": "w1",
                "projectId": "p9",
                "priority": "HIGH"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "new-task"})))
            .mount(&server)
            .await;

        let task = NewTask {
            name: "Review".into(),
            workspace_id: "w1".into(),
            project_id: Some("p9".into()),
            due_date: None,
            duration: None,
            priority: Priority::High,
            description: None,
            labels: vec![],
            assignee_id: None,
            auto_scheduled: None,
        };
        let id = client_for(&server).create_task(&task).await.unwrap();
        assert_eq!(id, "new-task");
    }

    #[tokio::test]
    async fn error_status_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_projects("w1").await.unwrap_err();
        match err {
            MotionError::Api { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
