//! agelit-core
//!
//! Asynchronous literature search for aging-related gene modifications:
//! a task registry with cooperative cancellation and progress, a seven-stage
//! search pipeline, and the runner that ties one to the other.
//!
//! # Modules
//! - **domain**: ids, statuses, task records, papers, verdicts, findings, errors
//! - **ports**: traits for the literature source, scorer, extractor, clock, ids
//! - **app**: registry, reaper, orchestrator, runner, service, builder
//! - **impls**: offline corpus and lexical / replay collaborators
//! - **config**: JSON configuration with defaults

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
