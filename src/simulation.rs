//! Simulation driver
//!
//! Orchestrates the closed loop: at each unit timestep the controller turns
//! the current process variable and setpoint into a control variable, the
//! plant integrates one interval ahead, and the driver records the series
//! and accumulates the ITAE performance metric.

use nalgebra::DVector;

use crate::error::SimError;
use crate::noise::NoiseSource;
use crate::pid::Pid;
use crate::plant::FopdtModel;
use crate::solvers::RKF45;

/// Shortest allowed run, in steps
pub const MIN_HORIZON: usize = 600;
/// Longest allowed run, in steps
pub const MAX_HORIZON: usize = 7200;
/// Time index at which the setpoint steps up
pub const STEP_INDEX: usize = 10;
/// Setpoint level after the step
pub const STEP_SETPOINT: f64 = 50.0;
/// Default process bias (engineering units)
pub const DEFAULT_BIAS: f64 = 13.115;

/// Upper saturation bound on the process variable
const PV_MAX: f64 = 100.0;

/// FOPDT process parameters for one run
#[derive(Debug, Clone, Copy)]
pub struct ProcessModel {
    pub gain: f64,
    pub time_constant: f64,
    pub dead_time: f64,
    pub bias: f64,
}

impl ProcessModel {
    /// Model with the default bias
    pub fn new(gain: f64, time_constant: f64, dead_time: f64) -> Self {
        Self {
            gain,
            time_constant,
            dead_time,
            bias: DEFAULT_BIAS,
        }
    }

    pub fn with_bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }
}

/// PID controller gains for one run
#[derive(Debug, Clone, Copy)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

/// Output of one simulation run
///
/// All series have the same length as `time`. `itae` is normalized by the
/// horizon length.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Normalized integral of time-weighted absolute error
    pub itae: f64,
    /// Unit-step time vector, 0..N
    pub time: Vec<usize>,
    /// Setpoint series
    pub setpoint: Vec<f64>,
    /// Control variable series
    pub control: Vec<f64>,
    /// Process variable series
    pub process: Vec<f64>,
    /// Proportional term history
    pub p_term: Vec<f64>,
    /// Integral term history
    pub i_term: Vec<f64>,
    /// Derivative term history
    pub d_term: Vec<f64>,
}

/// Horizon length for a model: `4 * (dead_time + time_constant)` steps,
/// truncated and clamped to `[MIN_HORIZON, MAX_HORIZON]`
pub fn horizon(model: &ProcessModel) -> usize {
    let span = 4.0 * (model.dead_time + model.time_constant);
    if span < MIN_HORIZON as f64 {
        MIN_HORIZON
    } else if span > MAX_HORIZON as f64 {
        MAX_HORIZON
    } else {
        span as usize
    }
}

/// Run one closed-loop simulation
///
/// A single synchronous pass over the horizon: seed `pv[0] = bias +
/// noise[0]`, then for each step compute the control variable, advance the
/// plant one unit interval, perturb with noise, and saturate the process
/// variable to `[bias, 100]`. The final index copies the setpoint, control,
/// and term values forward rather than simulating (the loop needs `i + 1`
/// to exist).
///
/// ITAE accumulates `(i - STEP_INDEX) * |sp[i] - pv[i]|` from the setpoint
/// step onward and is reported normalized by the horizon length.
///
/// # Errors
/// Invalid model parameters are rejected before any series is built; solver
/// failure or a non-finite process variable aborts the run with no partial
/// result.
pub fn run_simulation(
    model: &ProcessModel,
    gains: &PidGains,
    noise: &NoiseSource,
) -> Result<SimulationResult, SimError> {
    let plant = FopdtModel::new(model.gain, model.time_constant, model.dead_time, model.bias)?;

    let n = horizon(model);
    let time: Vec<usize> = (0..n).collect();

    let mut setpoint = vec![0.0; n];
    let mut process = vec![0.0; n];
    let mut control = vec![0.0; n];
    let mut p_term = vec![0.0; n];
    let mut i_term = vec![0.0; n];
    let mut d_term = vec![0.0; n];

    // Controller starts at setpoint 0 with the default [0, 100] limits
    let mut pid = Pid::new(gains.kp, gains.ki, gains.kd, 0.0);

    // One solver reused across steps; state is replaced per advance call
    let mut solver = RKF45::new(DVector::from_vec(vec![model.bias]));

    process[0] = model.bias + noise.sample(0);

    let mut itae = 0.0;
    for i in 0..n {
        if i < n - 1 {
            setpoint[i] = if i < STEP_INDEX { 0.0 } else { STEP_SETPOINT };
            control[i] = pid.compute(process[i], setpoint[i]);

            let mut next = plant.advance(&mut solver, process[i], &control, i)?;
            next += noise.sample(i);

            // Physical saturation: ceiling at 100, floor at the process bias
            if next > PV_MAX {
                next = PV_MAX;
            }
            if next < model.bias {
                next = model.bias;
            }
            process[i + 1] = next;

            let (p, integral, d) = pid.components();
            p_term[i] = p;
            i_term[i] = integral;
            d_term[i] = d;
        } else {
            // Endpoint cleanup: nothing left to simulate at the last index
            setpoint[i] = setpoint[i - 1];
            control[i] = control[i - 1];
            p_term[i] = p_term[i - 1];
            i_term[i] = i_term[i - 1];
            d_term[i] = d_term[i - 1];
        }

        if i >= STEP_INDEX {
            itae += (i - STEP_INDEX) as f64 * (setpoint[i] - process[i]).abs();
        }
    }

    Ok(SimulationResult {
        itae: itae / n as f64,
        time,
        setpoint,
        control,
        process,
        p_term,
        i_term,
        d_term,
    })
}
