//! # raid-service
//!
//! Application layer: the command queue and its worker, the services that
//! implement the event lifecycle, the maintenance scheduler, and the
//! dispatcher that routes interactions to them.

pub mod dispatcher;
pub mod dto;
pub mod maintenance;
pub mod queue;
pub mod services;
pub mod worker;

pub use dispatcher::{Command, Dispatched, Dispatcher, InteractionSource, Invocation};
pub use maintenance::MaintenanceScheduler;
pub use queue::{QueueClosed, QueuedTask, TaskQueue, TaskReceiver};
pub use services::{Caller, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, ServiceSettings};
pub use worker::{CommandWorker, WorkerStats};
