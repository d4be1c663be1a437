use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BoardGateway, TaskGateway};
use crate::error::GatewayError;
use crate::model::card::{BoardSummary, Card};
use crate::model::task::{ProjectMetadata, RemoteTask, SectionRef, TaskDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Find(String),
    Create(String),
    Move { section_id: String, remote_id: String },
    Delete(String),
}

#[derive(Debug, Clone)]
pub struct StoredTask {
    pub task: RemoteTask,
    pub card_id: String,
}

#[derive(Default)]
struct State {
    tasks: Vec<StoredTask>,
    calls: Vec<Call>,
    next_gid: u32,
}

/// Task gateway backed by a vector, recording every call.
#[derive(Clone, Default)]
pub struct MemoryTasks {
    state: Arc<Mutex<State>>,
    fail_find: bool,
    fail_create: bool,
    fail_move: bool,
}

impl MemoryTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_move(mut self) -> Self {
        self.fail_move = true;
        self
    }

    pub fn with_task(self, gid: &str, card_id: &str, section: Option<&str>) -> Self {
        self.state.lock().unwrap().tasks.push(StoredTask {
            task: RemoteTask {
                gid: gid.to_string(),
                name: format!("Task {gid}"),
                section: section.map(|s| SectionRef {
                    gid: s.to_string(),
                    name: None,
                }),
            },
            card_id: card_id.to_string(),
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn tasks(&self) -> Vec<StoredTask> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn count_creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    pub fn count_moves(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Move { .. }))
            .count()
    }
}

#[async_trait]
impl TaskGateway for MemoryTasks {
    async fn fetch_project_metadata(&self) -> Result<ProjectMetadata, GatewayError> {
        Ok(ProjectMetadata {
            gid: "project".into(),
            name: "In-memory".into(),
            followers: vec![],
            custom_fields: vec![],
            sections: vec![],
        })
    }

    async fn fetch_all_tasks(&self) -> Result<Vec<RemoteTask>, GatewayError> {
        Ok(self.tasks().into_iter().map(|s| s.task).collect())
    }

    async fn find_task_by_card_id(
        &self,
        card_id: &str,
    ) -> Result<Option<RemoteTask>, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Find(card_id.to_string()));
        if self.fail_find {
            return Err(GatewayError::read("search tasks by card id", "timed out"));
        }
        Ok(state
            .tasks
            .iter()
            .find(|s| s.card_id == card_id)
            .map(|s| s.task.clone()))
    }

    async fn create_task(&self, task: &TaskDescriptor) -> Result<RemoteTask, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create(task.card_id.clone()));
        if self.fail_create {
            return Err(GatewayError::write("create task", "403 Forbidden"));
        }
        state.next_gid += 1;
        let remote = RemoteTask {
            gid: format!("gid-{}", state.next_gid),
            name: task.name.clone(),
            section: None,
        };
        state.tasks.push(StoredTask {
            task: remote.clone(),
            card_id: task.card_id.clone(),
        });
        Ok(remote)
    }

    async fn move_task_to_section(
        &self,
        section_id: &str,
        remote_id: &str,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Move {
            section_id: section_id.to_string(),
            remote_id: remote_id.to_string(),
        });
        if self.fail_move {
            return Err(GatewayError::write("move task to section", "500 Internal Server Error"));
        }
        if let Some(stored) = state.tasks.iter_mut().find(|s| s.task.gid == remote_id) {
            stored.task.section = Some(SectionRef {
                gid: section_id.to_string(),
                name: None,
            });
        }
        Ok(())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(remote_id.to_string()));
        state.tasks.retain(|s| s.task.gid != remote_id);
        Ok(())
    }
}

/// Board gateway serving a fixed card list.
pub struct MemoryBoard {
    pub cards: Vec<Card>,
    pub fail: bool,
}

#[async_trait]
impl BoardGateway for MemoryBoard {
    async fn fetch_board_summary(&self) -> Result<BoardSummary, GatewayError> {
        Ok(BoardSummary {
            card_types: vec![],
            lanes: vec![],
            users: vec![],
        })
    }

    async fn fetch_cards(&self) -> Result<Vec<Card>, GatewayError> {
        if self.fail {
            return Err(GatewayError::read("fetch cards", "401 Unauthorized"));
        }
        Ok(self.cards.clone())
    }
}
