//! First-order-plus-dead-time (FOPDT) process model

use nalgebra::DVector;

use crate::error::SimError;
use crate::solvers::{integrate_interval, ExplicitSolver};

/// FOPDT process model
///
/// A single exponential lag plus a pure transport delay:
///
/// ```text
/// dPV/dt = (-(PV - bias) + gain * CV(t - dead_time)) / time_constant
/// ```
///
/// The delayed input is looked up in the control-variable history recorded
/// by the simulation driver; the system is assumed at rest before t = 0, so
/// lookups at or before the start of the run read zero.
///
/// # Example
///
/// ```ignore
/// let plant = FopdtModel::new(2.25, 60.5, 9.99, 13.115)?;
/// let mut solver = RKF45::new(DVector::from_vec(vec![13.115]));
/// let next_pv = plant.advance(&mut solver, pv, &cv_history, i)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FopdtModel {
    gain: f64,
    time_constant: f64,
    dead_time: f64,
    bias: f64,
}

impl FopdtModel {
    /// Create a plant model, rejecting unusable parameters
    ///
    /// # Errors
    /// - non-positive or non-finite time constant
    /// - negative or non-finite dead time
    /// - non-finite gain or bias
    pub fn new(gain: f64, time_constant: f64, dead_time: f64, bias: f64) -> Result<Self, SimError> {
        if !time_constant.is_finite() || time_constant <= 0.0 {
            return Err(SimError::InvalidTimeConstant(time_constant));
        }
        if !dead_time.is_finite() || dead_time < 0.0 {
            return Err(SimError::InvalidDeadTime(dead_time));
        }
        if !gain.is_finite() {
            return Err(SimError::InvalidGain(gain));
        }
        if !bias.is_finite() {
            return Err(SimError::InvalidBias(bias));
        }

        Ok(Self {
            gain,
            time_constant,
            dead_time,
            bias,
        })
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    pub fn dead_time(&self) -> f64 {
        self.dead_time
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Control input seen by the lag at the given time index
    ///
    /// Reads the history at `index - trunc(dead_time)`; indices at or before
    /// the start of the run see zero (no input yet).
    pub fn delayed_input(&self, cv_history: &[f64], index: usize) -> f64 {
        if index as f64 - self.dead_time <= 0.0 {
            0.0
        } else {
            cv_history[index - self.dead_time as usize]
        }
    }

    /// dPV/dt at the given process variable and time index
    pub fn derivative(&self, pv: f64, cv_history: &[f64], index: usize) -> f64 {
        let delayed = self.delayed_input(cv_history, index);
        (-(pv - self.bias) + self.gain * delayed) / self.time_constant
    }

    /// Integrate the lag over `[index, index + 1]` and return the next PV
    ///
    /// The dead-time lookup is fixed for the whole interval, so the right-hand
    /// side depends only on the state. The solver's current state is replaced
    /// by `pv` before integrating.
    ///
    /// # Errors
    /// [`SimError::SolverFailure`] if the solver rejects down to its minimum
    /// timestep; [`SimError::NonFinitePv`] if the integrated value is not
    /// finite.
    pub fn advance<S: ExplicitSolver>(
        &self,
        solver: &mut S,
        pv: f64,
        cv_history: &[f64],
        index: usize,
    ) -> Result<f64, SimError> {
        let delayed = self.delayed_input(cv_history, index);
        let gain = self.gain;
        let time_constant = self.time_constant;
        let bias = self.bias;

        solver.set_state(DVector::from_vec(vec![pv]));

        let t0 = index as f64;
        integrate_interval(
            solver,
            |x, _t| DVector::from_vec(vec![(-(x[0] - bias) + gain * delayed) / time_constant]),
            t0,
            t0 + 1.0,
            1.0,
        )
        .map_err(|source| SimError::SolverFailure {
            step: index,
            source,
        })?;

        let next = solver.state()[0];
        if !next.is_finite() {
            return Err(SimError::NonFinitePv { step: index });
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::RKF45;
    use approx::assert_relative_eq;

    fn solver_at(pv: f64) -> RKF45 {
        RKF45::new(DVector::from_vec(vec![pv]))
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(FopdtModel::new(1.0, 0.0, 0.0, 0.0).is_err());
        assert!(FopdtModel::new(1.0, -5.0, 0.0, 0.0).is_err());
        assert!(FopdtModel::new(1.0, f64::NAN, 0.0, 0.0).is_err());
        assert!(FopdtModel::new(1.0, 10.0, -1.0, 0.0).is_err());
        assert!(FopdtModel::new(f64::INFINITY, 10.0, 0.0, 0.0).is_err());

        let plant = FopdtModel::new(1.0, 10.0, 2.0, 13.115).unwrap();
        assert_eq!(plant.gain(), 1.0);
        assert_eq!(plant.time_constant(), 10.0);
        assert_eq!(plant.dead_time(), 2.0);
        assert_eq!(plant.bias(), 13.115);
    }

    #[test]
    fn test_delayed_input_before_start_is_zero() {
        let plant = FopdtModel::new(1.0, 10.0, 5.0, 0.0).unwrap();
        let history = [7.0; 20];

        // index - dead_time <= 0: at rest before t=0
        assert_eq!(plant.delayed_input(&history, 0), 0.0);
        assert_eq!(plant.delayed_input(&history, 5), 0.0);
        assert_eq!(plant.delayed_input(&history, 6), 7.0);
    }

    #[test]
    fn test_delayed_input_truncates_fractional_dead_time() {
        let plant = FopdtModel::new(1.0, 10.0, 9.99, 0.0).unwrap();
        let mut history = vec![0.0; 20];
        history[1] = 42.0;

        // 10 - 9.99 > 0, lookup at 10 - trunc(9.99) = 1
        assert_eq!(plant.delayed_input(&history, 10), 42.0);
    }

    #[test]
    fn test_derivative_pulls_toward_bias() {
        let plant = FopdtModel::new(2.0, 10.0, 0.0, 13.115).unwrap();
        let history = [0.0; 4];

        // Above bias with no input: negative rate
        assert!(plant.derivative(20.0, &history, 2) < 0.0);
        // At bias with no input: zero rate
        assert_relative_eq!(plant.derivative(13.115, &history, 2), 0.0);
    }

    #[test]
    fn test_advance_matches_exact_lag_solution() {
        // gain 0 and no delay: pure decay toward bias
        // PV(t) = bias + (PV0 - bias) * exp(-t/tau)
        let bias = 13.115;
        let tau = 10.0;
        let plant = FopdtModel::new(0.0, tau, 0.0, bias).unwrap();
        let history = vec![0.0; 8];

        let pv0 = bias + 20.0;
        let mut solver = solver_at(pv0);
        let next = plant.advance(&mut solver, pv0, &history, 3).unwrap();

        let exact = bias + 20.0 * (-1.0 / tau).exp();
        assert_relative_eq!(next, exact, epsilon = 1e-5);
    }

    #[test]
    fn test_advance_monotone_decay_toward_bias() {
        let bias = 13.115;
        let plant = FopdtModel::new(0.0, 5.0, 0.0, bias).unwrap();
        let history = vec![0.0; 64];

        let mut pv = bias + 30.0;
        let mut solver = solver_at(pv);
        for i in 0..50 {
            let next = plant.advance(&mut solver, pv, &history, i).unwrap();
            assert!(next < pv);
            assert!(next > bias);
            pv = next;
        }
        // Well within one percent of bias after ten time constants
        assert!(pv - bias < 0.3);
    }

    #[test]
    fn test_advance_steady_state_gain() {
        // Constant input u: steady state is bias + gain * u
        let plant = FopdtModel::new(2.25, 3.0, 0.0, 13.115).unwrap();
        let history = vec![10.0; 128];

        let mut pv = 13.115;
        let mut solver = solver_at(pv);
        for i in 1..100 {
            pv = plant.advance(&mut solver, pv, &history, i).unwrap();
        }

        assert_relative_eq!(pv, 13.115 + 2.25 * 10.0, epsilon = 1e-3);
    }
}
