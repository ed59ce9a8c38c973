//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "plan a target" or "build everything stale".

pub mod build_service;
pub mod dispatch_service;
pub mod plan_service;

pub use build_service::{BuildOptions, BuildReport, BuildService};
pub use dispatch_service::DispatchService;
pub use plan_service::PlanService;
