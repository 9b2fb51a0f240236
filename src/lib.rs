//! A Vicsek-style flocking simulator: self-propelled particles on a periodic
//! square domain realign each step toward the average heading of their
//! neighborhood, perturbed by uniform angular noise. The crate provides the
//! stepping engine, interchangeable neighbor-finding strategies, the
//! polarization order parameter, and the noise/density sweep experiments
//! built on top of them.

pub mod config;
pub mod grid;
pub mod metrics;
pub mod neighbors;
pub mod output;
pub mod particle;
pub mod sim_params;
pub mod simulation;
pub mod update;
pub mod vecmath;
