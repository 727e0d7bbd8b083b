//! pidsim - closed-loop PID / FOPDT process simulation
//!
//! Simulates a discrete PID controller regulating a first-order-plus-dead-time
//! (FOPDT) process through a step setpoint change, and scores the run with the
//! ITAE performance metric.
//!
//! # Architecture
//!
//! Three cooperating pieces:
//! - [`Pid`] - stateful discrete controller producing a control variable from
//!   the setpoint/process-variable error
//! - [`FopdtModel`] - first-order lag plus transport delay, advanced one unit
//!   interval per call with an adaptive ODE solver
//! - [`run_simulation`] - the time-stepped loop wiring controller output into
//!   the plant and plant output back into the controller, accumulating ITAE
//!   and per-term histories
//!
//! # Example
//!
//! ```rust,ignore
//! use pidsim::prelude::*;
//!
//! let model = ProcessModel::new(2.25, 60.5, 9.99);
//! let gains = PidGains { kp: 1.1, ki: 0.1, kd: 0.09 };
//!
//! // One noise realization per process, reused across tuning runs
//! let noise = NoiseSource::from_entropy(MIN_HORIZON);
//!
//! let result = run_simulation(&model, &gains, &noise)?;
//! println!("ITAE: {:.2}", result.itae);
//! ```

pub mod error;
pub mod noise;
pub mod pid;
pub mod plant;
pub mod simulation;
pub mod solvers;

pub use error::SimError;
pub use noise::NoiseSource;
pub use pid::{OutputLimits, Pid};
pub use plant::FopdtModel;
pub use simulation::{
    horizon, run_simulation, PidGains, ProcessModel, SimulationResult, DEFAULT_BIAS, MAX_HORIZON,
    MIN_HORIZON, STEP_INDEX, STEP_SETPOINT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::SimError;
    pub use crate::noise::NoiseSource;
    pub use crate::pid::{OutputLimits, Pid};
    pub use crate::plant::FopdtModel;
    pub use crate::simulation::{
        horizon, run_simulation, PidGains, ProcessModel, SimulationResult, DEFAULT_BIAS,
        MAX_HORIZON, MIN_HORIZON, STEP_INDEX, STEP_SETPOINT,
    };
    pub use crate::solvers::*;
}
