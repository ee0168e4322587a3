//! Then steps for recurring completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use taskflow::events::{EventType, Topic};
use taskflow::task::domain::AuditEventKind;
use taskflow::task::services::{CompletionOutcome, TaskCompletion};

fn first_completion(world: &CompletionWorld) -> Result<&TaskCompletion, eyre::Report> {
    match world.completions.first() {
        Some(CompletionOutcome::Completed(completion)) => Ok(completion),
        other => Err(eyre::eyre!("expected a fresh completion, got {other:?}")),
    }
}

#[then(r#"the next occurrence is due "{due}""#)]
fn next_occurrence_due(world: &CompletionWorld, due: String) -> Result<(), eyre::Report> {
    let expected = DateTime::parse_from_rfc3339(&due)
        .wrap_err("parse expected due date")?
        .with_timezone(&Utc);
    let next = first_completion(world)?
        .next_occurrence
        .as_ref()
        .ok_or_else(|| eyre::eyre!("completion created no next occurrence"))?;
    if next.due_date != Some(expected) {
        return Err(eyre::eyre!(
            "expected next due date {expected}, found {:?}",
            next.due_date
        ));
    }
    Ok(())
}

#[then("no next occurrence is created")]
fn no_next_occurrence(world: &CompletionWorld) -> Result<(), eyre::Report> {
    let completion = first_completion(world)?;
    if completion.is_recurring || completion.next_occurrence.is_some() {
        return Err(eyre::eyre!("one-off task produced {completion:?}"));
    }
    Ok(())
}

#[then("the last completion reports the task as already completed")]
fn last_completion_already_completed(world: &CompletionWorld) -> Result<(), eyre::Report> {
    match world.completions.last() {
        Some(CompletionOutcome::AlreadyCompleted(_)) => Ok(()),
        other => Err(eyre::eyre!("expected an already-completed outcome, got {other:?}")),
    }
}

#[then("the chain holds {count:usize} tasks")]
fn chain_holds(world: &CompletionWorld, count: usize) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let chain = run_async(world.service.recurring_chain(id)).wrap_err("load scenario chain")?;
    if chain.len() != count {
        return Err(eyre::eyre!("expected {count} tasks in chain, found {}", chain.len()));
    }
    Ok(())
}

#[then("the audit log records {count:usize} completion")]
fn audit_records_completions(world: &CompletionWorld, count: usize) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let entries = run_async(world.service.audit_history(id)).wrap_err("load audit history")?;
    let completions = entries
        .iter()
        .filter(|entry| entry.event_type() == AuditEventKind::TaskCompleted)
        .count();
    if completions != count {
        return Err(eyre::eyre!(
            "expected {count} completion audit entries, found {completions}"
        ));
    }
    Ok(())
}

#[then("a task completed event was published")]
fn completed_event_published(world: &CompletionWorld) -> Result<(), eyre::Report> {
    let published = world
        .bus
        .published_on(Topic::TaskEvents)
        .iter()
        .any(|message| message.event_type() == EventType::TaskCompleted);
    if !published {
        return Err(eyre::eyre!("no task.completed event on the bus"));
    }
    Ok(())
}
