//! When steps for recurring completion BDD scenarios.

use super::world::{CompletionWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;

#[when("the task is completed")]
fn complete_task(world: &mut CompletionWorld) -> Result<(), eyre::Report> {
    let id = world.task()?.id();
    let outcome = run_async(world.service.complete_task(id)).wrap_err("complete scenario task")?;
    world.completions.push(outcome);
    Ok(())
}
