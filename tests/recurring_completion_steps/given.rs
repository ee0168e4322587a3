//! Given steps for recurring completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use chrono::{DateTime, Utc};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskflow::task::services::CreateTaskRequest;

#[given(r#"a task "{title}" due "{due}" repeating "{recurrence}""#)]
fn recurring_task(
    world: &mut CompletionWorld,
    title: String,
    due: String,
    recurrence: String,
) -> Result<(), eyre::Report> {
    let due_date = DateTime::parse_from_rfc3339(&due)
        .wrap_err("parse scenario due date")?
        .with_timezone(&Utc);
    let request = CreateTaskRequest::new(title)
        .with_due_date(due_date)
        .with_recurrence(recurrence);
    let task = run_async(world.service.create_task(request)).wrap_err("create scenario task")?;
    world.task = Some(task);
    Ok(())
}
