//! The adaptive simulated-annealing controller.
//!
//! Drives the neighborhood operators over the authoritative fleet
//! state: mutate, re-simulate, Metropolis-accept or roll back, cool
//! down — until the iteration budget, the temperature floor, or a
//! zero-danger solution ends the run.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod runner;

pub use config::{AnnealingConfig, OperatorSelection};
pub use runner::{AnnealingResult, AnnealingRunner, ClearingProblem, DiagnosticsTrace};
