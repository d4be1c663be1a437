use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

use crate::cli::{InfoArgs, SyncArgs};
use crate::config::AppConfig;
use crate::error::GatewayError;
use crate::gateways::asana::AsanaGateway;
use crate::gateways::leankit::LeanKitGateway;
use crate::gateways::{BoardGateway, TaskGateway};
use crate::mapping;
use crate::model::card::Card;
use crate::model::task::TaskDescriptor;
use crate::sync::{self, SyncRun};

/// Shape of the `--file` document written by `sync`.
#[derive(Serialize)]
struct SyncOutput<'a> {
    cards: &'a [Card],
    tasks: &'a [TaskDescriptor],
}

/// Pretty JSON to `file`, or stdout when no file was given.
fn emit(value: &impl Serialize, file: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match file {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Read failures in info mode are shown as an empty result.
fn or_empty<T>(result: Result<T, GatewayError>) -> Option<T> {
    result.map_err(|e| error!("{e}")).ok()
}

pub async fn handle_info(args: &InfoArgs, config: &AppConfig) -> Result<()> {
    let file = args.file.as_deref();

    if args.board {
        let board = LeanKitGateway::new(config.leankit_settings()?);
        return emit(&or_empty(board.fetch_board_summary().await), file);
    }

    let asana = AsanaGateway::new(config.asana_settings()?);
    if args.project {
        emit(&or_empty(asana.fetch_project_metadata().await), file)
    } else if args.tasks {
        emit(&or_empty(asana.fetch_all_tasks().await), file)
    } else if let Some(card_id) = &args.task_card_id {
        emit(&or_empty(asana.find_task_by_card_id(card_id).await).flatten(), file)
    } else if args.delete_tasks {
        delete_all_tasks(&asana).await;
        Ok(())
    } else {
        Ok(())
    }
}

/// Delete every task in the project; failures are logged and skipped.
pub async fn delete_all_tasks(gateway: &dyn TaskGateway) -> usize {
    let tasks = or_empty(gateway.fetch_all_tasks().await).unwrap_or_default();
    let mut deleted = 0;
    for task in &tasks {
        match gateway.delete_task(&task.gid).await {
            Ok(()) => deleted += 1,
            Err(e) => error!(task = %task.name, "{e}"),
        }
    }
    info!(deleted, total = tasks.len(), "finished deleting tasks");
    deleted
}

/// Write the output file for a finished run. Reconciliation already happened,
/// so a write failure is logged and the run still completes.
fn write_sync_output(run: &SyncRun, path: &Path) -> bool {
    let output = SyncOutput {
        cards: &run.cards,
        tasks: &run.tasks,
    };
    match emit(&output, Some(path)) {
        Ok(()) => true,
        Err(e) => {
            error!("{e:#}");
            false
        }
    }
}

pub async fn handle_sync(args: &SyncArgs, config: &AppConfig) -> Result<()> {
    let mapping = mapping::load_mapping(&args.mapping)?;
    let board = LeanKitGateway::new(config.leankit_settings()?);
    let asana = if args.test {
        None
    } else {
        Some(AsanaGateway::new(config.asana_settings()?))
    };

    let run = sync::run_sync(
        &board,
        asana.as_ref().map(|g| g as &dyn TaskGateway),
        &mapping,
    )
    .await?;

    if let Some(path) = &args.file {
        write_sync_output(&run, path);
    }

    let report = &run.report;
    info!(
        created = report.created,
        moved = report.moved,
        unchanged = report.unchanged,
        duplicates = report.duplicates,
        failed = report.failures.len(),
        "finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateways::memory::{Call, MemoryTasks};
    use crate::sync::SyncReport;

    #[tokio::test]
    async fn delete_all_removes_every_task() {
        let gateway = MemoryTasks::new()
            .with_task("1", "C1", Some("S1"))
            .with_task("2", "C2", None);

        let deleted = delete_all_tasks(&gateway).await;

        assert_eq!(deleted, 2);
        assert!(gateway.tasks().is_empty());
        assert_eq!(
            gateway.calls(),
            vec![Call::Delete("1".into()), Call::Delete("2".into())]
        );
    }

    #[test]
    fn emit_writes_pretty_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let output = SyncOutput {
            cards: &[],
            tasks: &[],
        };

        emit(&output, Some(path.as_path())).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value, serde_json::json!({ "cards": [], "tasks": [] }));
        assert!(written.contains('\n'));
    }

    fn empty_run() -> SyncRun {
        SyncRun {
            cards: Vec::new(),
            tasks: Vec::new(),
            report: SyncReport::default(),
        }
    }

    #[test]
    fn sync_output_lands_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.json");
        assert!(write_sync_output(&empty_run(), &path));
        assert!(path.exists());
    }

    #[test]
    fn unwritable_sync_output_is_logged_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("sync.json");
        assert!(!write_sync_output(&empty_run(), &path));
        assert!(!path.exists());
    }

    #[test]
    fn read_failure_becomes_empty() {
        let failed: Result<Vec<u8>, GatewayError> =
            Err(GatewayError::read("fetch project tasks", "timeout"));
        assert_eq!(or_empty(failed), None);
    }
}
