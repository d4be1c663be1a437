use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use super::TaskGateway;
use crate::config::{AsanaSettings, CustomFieldIds};
use crate::error::GatewayError;
use crate::model::task::{
    CustomFieldInfo, EnumOption, Follower, ProjectMetadata, RemoteTask, SectionRef, TaskDescriptor,
};

const BASE: &str = "https://app.asana.com/api/1.0";

pub struct AsanaGateway {
    workspace_id: String,
    project_id: String,
    fields: CustomFieldIds,
    auth_header: String,
    client: reqwest::Client,
}

impl AsanaGateway {
    pub fn new(settings: AsanaSettings) -> Self {
        Self {
            workspace_id: settings.workspace_id,
            project_id: settings.project_id,
            fields: settings.fields,
            auth_header: format!("Bearer {}", settings.token),
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json(self.client.get(url)).await
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        req.header("Authorization", &self.auth_header)
            .send()
            .await
            .context("Asana API request failed")?
            .error_for_status()
            .context("Asana API returned an error")
    }

    async fn send_json<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T> {
        let envelope: Envelope<T> = self
            .send(req)
            .await?
            .json()
            .await
            .context("Failed to parse Asana response")?;
        Ok(envelope.data)
    }

    async fn project_sections(&self) -> Result<Vec<SectionRef>> {
        info!("getting project sections...");
        let sections: Vec<SectionWire> = self
            .get(&format!("{BASE}/projects/{}/sections", self.project_id))
            .await?;
        Ok(sections.into_iter().map(SectionRef::from).collect())
    }

    /// Payload for `POST /tasks`. The card id lands in its own custom field so
    /// later runs can find the task again.
    fn create_body(&self, task: &TaskDescriptor) -> Value {
        let mut custom_fields = Map::new();
        custom_fields.insert(self.fields.external_id.clone(), json!(task.external_id));
        custom_fields.insert(self.fields.url.clone(), json!(task.url));
        custom_fields.insert(self.fields.task_type.clone(), json!(task.task_type));
        custom_fields.insert(self.fields.card_id.clone(), json!(task.card_id));

        json!({
            "data": {
                "name": task.name,
                "notes": task.notes,
                "assignee": task.assignee,
                "workspace": self.workspace_id,
                "projects": [self.project_id],
                "custom_fields": custom_fields,
            }
        })
    }

    fn search_url(&self, card_id: &str) -> String {
        format!(
            "{BASE}/workspaces/{}/tasks/search?projects.any={}&custom_fields.{}.value={}",
            self.workspace_id,
            self.project_id,
            self.fields.card_id,
            urlencoding::encode(card_id)
        )
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct SectionWire {
    gid: String,
    name: Option<String>,
}

impl From<SectionWire> for SectionRef {
    fn from(s: SectionWire) -> Self {
        SectionRef {
            gid: s.gid,
            name: s.name,
        }
    }
}

#[derive(Deserialize)]
struct ProjectWire {
    gid: String,
    name: String,
    #[serde(default)]
    followers: Vec<Follower>,
    #[serde(default)]
    custom_field_settings: Vec<CustomFieldSetting>,
}

#[derive(Deserialize)]
struct CustomFieldSetting {
    custom_field: CustomFieldWire,
}

#[derive(Deserialize)]
struct CustomFieldWire {
    gid: String,
    name: String,
    #[serde(rename = "type", default)]
    field_type: String,
    #[serde(default)]
    enum_options: Option<Vec<EnumOption>>,
}

#[derive(Deserialize)]
struct TaskCompact {
    gid: String,
    #[serde(default)]
    name: String,
}

/// Pick the task to reconcile against when a search returns several hits.
/// The first one in response order wins.
fn first_match(card_id: &str, matches: Vec<TaskCompact>) -> Option<TaskCompact> {
    if matches.len() > 1 {
        warn!(
            card_id,
            count = matches.len(),
            "several tasks carry this card id, using the first"
        );
    }
    matches.into_iter().next()
}

#[derive(Deserialize)]
struct TaskWire {
    gid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    memberships: Vec<Membership>,
}

#[derive(Deserialize)]
struct Membership {
    project: Option<ProjectRef>,
    section: Option<SectionWire>,
}

#[derive(Deserialize)]
struct ProjectRef {
    gid: String,
}

impl TaskWire {
    /// The section this task occupies in `project_id`, falling back to the
    /// first membership when the project is not listed.
    fn into_remote(self, project_id: &str) -> RemoteTask {
        let mut memberships = self.memberships;
        let idx = memberships
            .iter()
            .position(|m| m.project.as_ref().is_some_and(|p| p.gid == project_id))
            .unwrap_or(0);
        let section = if idx < memberships.len() {
            memberships.swap_remove(idx).section.map(SectionRef::from)
        } else {
            None
        };
        RemoteTask {
            gid: self.gid,
            name: self.name,
            section,
        }
    }
}

impl From<TaskCompact> for RemoteTask {
    fn from(t: TaskCompact) -> Self {
        RemoteTask {
            gid: t.gid,
            name: t.name,
            section: None,
        }
    }
}

impl From<CustomFieldSetting> for CustomFieldInfo {
    fn from(s: CustomFieldSetting) -> Self {
        let cf = s.custom_field;
        CustomFieldInfo {
            gid: cf.gid,
            name: cf.name,
            field_type: cf.field_type,
            options: cf.enum_options.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl TaskGateway for AsanaGateway {
    async fn fetch_project_metadata(&self) -> Result<ProjectMetadata, GatewayError> {
        info!("getting project info...");
        let project: ProjectWire = self
            .get(&format!("{BASE}/projects/{}", self.project_id))
            .await
            .map_err(|e| GatewayError::read("fetch project", e))?;
        let sections = self
            .project_sections()
            .await
            .map_err(|e| GatewayError::read("fetch project sections", e))?;

        Ok(ProjectMetadata {
            gid: project.gid,
            name: project.name,
            followers: project.followers,
            custom_fields: project
                .custom_field_settings
                .into_iter()
                .map(CustomFieldInfo::from)
                .collect(),
            sections,
        })
    }

    async fn fetch_all_tasks(&self) -> Result<Vec<RemoteTask>, GatewayError> {
        info!("getting tasks for project...");
        let tasks: Vec<TaskCompact> = self
            .get(&format!("{BASE}/projects/{}/tasks", self.project_id))
            .await
            .map_err(|e| GatewayError::read("fetch project tasks", e))?;
        Ok(tasks.into_iter().map(RemoteTask::from).collect())
    }

    async fn find_task_by_card_id(
        &self,
        card_id: &str,
    ) -> Result<Option<RemoteTask>, GatewayError> {
        let matches: Vec<TaskCompact> = self
            .get(&self.search_url(card_id))
            .await
            .map_err(|e| GatewayError::read("search tasks by card id", e))?;

        let Some(first) = first_match(card_id, matches) else {
            return Ok(None);
        };

        let task: TaskWire = self
            .get(&format!("{BASE}/tasks/{}", first.gid))
            .await
            .map_err(|e| GatewayError::read("fetch task", e))?;
        Ok(Some(task.into_remote(&self.project_id)))
    }

    async fn create_task(&self, task: &TaskDescriptor) -> Result<RemoteTask, GatewayError> {
        info!(task = %task.name, "creating task");
        let req = self
            .client
            .post(format!("{BASE}/tasks"))
            .json(&self.create_body(task));
        let created: TaskCompact = self
            .send_json(req)
            .await
            .map_err(|e| GatewayError::write("create task", e))?;
        Ok(created.into())
    }

    async fn move_task_to_section(
        &self,
        section_id: &str,
        remote_id: &str,
    ) -> Result<(), GatewayError> {
        debug!(section_id, remote_id, "adding task to section");
        let req = self
            .client
            .post(format!("{BASE}/sections/{section_id}/addTask"))
            .json(&json!({ "data": { "task": remote_id } }));
        self.send(req)
            .await
            .map_err(|e| GatewayError::write("move task to section", e))?;
        Ok(())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError> {
        info!(remote_id, "deleting task");
        let req = self.client.delete(format!("{BASE}/tasks/{remote_id}"));
        self.send(req)
            .await
            .map_err(|e| GatewayError::write("delete task", e))?;
        Ok(())
    }
}
