pub mod mapper;

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::error::GatewayError;
use crate::gateways::{BoardGateway, TaskGateway};
use crate::mapping::MappingConfig;
use crate::model::card::Card;
use crate::model::task::TaskDescriptor;

/// What reconciliation did for one descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Task exists and already sits in the right section.
    Unchanged,
    /// Task exists and was moved to the resolved section.
    Moved,
    /// Task was created and placed in its section.
    Created,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Create,
    Move,
}

/// A write that failed. The run carries on with the next descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub card_id: String,
    pub task_name: String,
    pub stage: Stage,
    pub error: GatewayError,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub created: usize,
    pub moved: usize,
    pub unchanged: usize,
    pub duplicates: usize,
    pub failures: Vec<SyncFailure>,
}

/// Everything a sync produced, kept for the optional output file.
#[derive(Debug)]
pub struct SyncRun {
    pub cards: Vec<Card>,
    pub tasks: Vec<TaskDescriptor>,
    pub report: SyncReport,
}

impl SyncReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Moved => self.moved += 1,
            Outcome::Created => self.created += 1,
        }
    }
}

/// Look the task up by card id, then create or move it as needed.
///
/// A failed lookup counts as "not found", so creation is attempted. A failed
/// move after a successful create leaves `remote_id` set on the descriptor.
pub async fn reconcile_task(
    gateway: &dyn TaskGateway,
    task: &mut TaskDescriptor,
) -> Result<Outcome, SyncFailure> {
    let existing = match gateway.find_task_by_card_id(&task.card_id).await {
        Ok(found) => found,
        Err(e) => {
            warn!(card_id = %task.card_id, error = %e, "lookup failed, treating task as missing");
            None
        }
    };

    let fail = |task: &TaskDescriptor, stage, error| SyncFailure {
        card_id: task.card_id.clone(),
        task_name: task.name.clone(),
        stage,
        error,
    };

    match existing {
        None => {
            let created = gateway
                .create_task(task)
                .await
                .map_err(|e| fail(task, Stage::Create, e))?;
            task.remote_id = Some(created.gid.clone());
            gateway
                .move_task_to_section(&task.section_id, &created.gid)
                .await
                .map_err(|e| fail(task, Stage::Move, e))?;
            Ok(Outcome::Created)
        }
        Some(remote) => {
            info!(task = %remote.name, "task already exists");
            task.remote_id = Some(remote.gid.clone());
            if remote.is_in_section(&task.section_id) {
                return Ok(Outcome::Unchanged);
            }
            info!(task = %remote.name, section_id = %task.section_id, "moving task");
            gateway
                .move_task_to_section(&task.section_id, &remote.gid)
                .await
                .map_err(|e| fail(task, Stage::Move, e))?;
            Ok(Outcome::Moved)
        }
    }
}

/// Reconcile descriptors one at a time in list order.
///
/// A card id is only reconciled once per run; repeats take the remote id of the
/// first occurrence instead of issuing another lookup-and-create.
pub async fn reconcile_all(gateway: &dyn TaskGateway, tasks: &mut [TaskDescriptor]) -> SyncReport {
    let mut report = SyncReport::default();
    let mut seen: HashMap<String, Option<String>> = HashMap::new();

    for task in tasks.iter_mut() {
        if let Some(remote_id) = seen.get(&task.card_id) {
            warn!(
                card_id = %task.card_id,
                task = %task.name,
                "card appears twice in this run, skipping"
            );
            task.remote_id = remote_id.clone();
            report.duplicates += 1;
            continue;
        }

        match reconcile_task(gateway, task).await {
            Ok(outcome) => report.record(outcome),
            Err(failure) => {
                error!(
                    card_id = %failure.card_id,
                    task = %failure.task_name,
                    stage = ?failure.stage,
                    "{}",
                    failure.error
                );
                report.failures.push(failure);
            }
        }
        seen.insert(task.card_id.clone(), task.remote_id.clone());
    }

    report
}

/// Fetch, filter, map and reconcile every card on the board.
///
/// With no task gateway this is a test run: descriptors are produced but
/// nothing remote is touched. Only a failure to fetch the cards is returned as
/// an error; everything after that is logged and collected in the report.
pub async fn run_sync(
    board: &dyn BoardGateway,
    gateway: Option<&dyn TaskGateway>,
    mapping: &MappingConfig,
) -> Result<SyncRun, GatewayError> {
    info!("synchronizing all cards...");
    let cards = mapper::filter_excluded(board.fetch_cards().await?, mapping);
    let mut tasks = mapper::map_cards(&cards, mapping);
    info!(cards = cards.len(), tasks = tasks.len(), "mapped cards");

    let report = match gateway {
        Some(gateway) => reconcile_all(gateway, &mut tasks).await,
        None => {
            info!("test run, no tasks will be changed");
            SyncReport::default()
        }
    };

    Ok(SyncRun {
        cards,
        tasks,
        report,
    })
}
