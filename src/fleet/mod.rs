//! Clearing machines and their staged routes.
//!
//! A route is one segment sequence per forecast stage; stage `k` ends
//! where stage `k + 1` begins. Routes are plain owned id sequences, so
//! cloning the machine list yields a genuinely independent solution
//! snapshot for rollback and best-solution bookkeeping.

mod initial;
mod machine;

pub use machine::{stage_time, Machine, Route, Stage};
