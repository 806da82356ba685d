//! Stage-wise hazard simulation: the objective function.

mod simulator;

pub use simulator::simulate_danger;
