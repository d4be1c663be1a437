pub mod asana;
pub mod leankit;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::model::card::{BoardSummary, Card};
use crate::model::task::{ProjectMetadata, RemoteTask, TaskDescriptor};

/// Read access to the Kanban board cards come from.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    async fn fetch_board_summary(&self) -> Result<BoardSummary, GatewayError>;
    async fn fetch_cards(&self) -> Result<Vec<Card>, GatewayError>;
}

/// The project tasks are reconciled into.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    async fn fetch_project_metadata(&self) -> Result<ProjectMetadata, GatewayError>;
    async fn fetch_all_tasks(&self) -> Result<Vec<RemoteTask>, GatewayError>;
    /// Look up the task whose card-id custom field equals `card_id`.
    async fn find_task_by_card_id(&self, card_id: &str) -> Result<Option<RemoteTask>, GatewayError>;
    /// Create a task from the descriptor. The returned task has no section yet.
    async fn create_task(&self, task: &TaskDescriptor) -> Result<RemoteTask, GatewayError>;
    async fn move_task_to_section(
        &self,
        section_id: &str,
        remote_id: &str,
    ) -> Result<(), GatewayError>;
    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError>;
}

#[cfg(test)]
pub mod memory;
