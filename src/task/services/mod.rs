//! Application services for task lifecycle orchestration.

mod completion;
mod lifecycle;

pub use completion::{CompletionOutcome, NextOccurrence, TaskCompletion};
pub use lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
