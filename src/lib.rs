//! Taskflow: recurring tasks and reminder scheduling for a to-do backend.
//!
//! The crate hosts three cooperating services that communicate through a
//! publish/subscribe sidecar:
//!
//! - the **backend** owns tasks and reminders, schedules one-shot jobs, and
//!   publishes task and reminder events;
//! - the **notification service** pushes triggered reminders to users'
//!   live WebSocket connections;
//! - the **recurring worker** creates the next occurrence of a completed
//!   recurring task when nothing else has.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture:
//!
//! - **Domain**: pure types and rules with no infrastructure dependencies
//! - **Ports**: trait interfaces for storage, scheduling, and messaging
//! - **Adapters**: in-memory and HTTP implementations of the ports
//! - **Services**: orchestration over the ports
//!
//! # Modules
//!
//! - [`recurrence`]: recurrence grammar and next-date arithmetic
//! - [`task`]: task records, completion, and occurrence chains
//! - [`reminder`]: reminder records and job scheduling
//! - [`events`]: event envelopes, publishing, and subscriptions
//! - [`notification`]: live connection registry and reminder delivery
//! - [`recurring`]: next-occurrence worker
//! - [`app`] and [`http`]: service composition and HTTP surfaces

pub mod app;
pub mod clock;
pub mod config;
pub mod events;
pub mod failure;
pub mod http;
pub mod notification;
pub mod recurrence;
pub mod recurring;
pub mod reminder;
pub mod task;
pub mod telemetry;
