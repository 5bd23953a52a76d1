//! Guardrail core: scoped verification runs and workflow compliance checks.
//!
//! The two load-bearing pieces are the [`scheduler`] (bounded worker pool
//! with queue-ordered reporting and fail-fast semantics) and the rule
//! engines: the [`policy`] validator for automation scripts and the
//! [`lifecycle`] guards for branch/commit/PR naming and status drift.
//! External commands only ever run through the [`runner`].

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod policy;
pub mod registry;
pub mod report;
pub mod runner;
pub mod scheduler;
