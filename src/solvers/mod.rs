//! Numerical integration solvers
//!
//! Staged explicit ODE solvers with adaptive timestepping and error control:
//! - RKF45: adaptive embedded 4(5) pair
//! - RK4: classic fixed-step 4th order
//!
//! A full timestep is `stages()` calls to `step()` after a `buffer()`; the
//! final stage of an adaptive method reports the local error estimate.
//! [`integrate_interval`] wraps this protocol into an adaptive drive over
//! one time interval.

mod base;
mod rk4;
mod rkf45;

pub use base::*;
pub use rk4::RK4;
pub use rkf45::RKF45;

use nalgebra::DVector;

/// Smallest timestep the adaptive drive will attempt before giving up
pub const DT_MIN: f64 = 1e-9;

/// Integrate an ODE over `[t0, t1]` with adaptive step-size control
///
/// Runs the staged solver protocol repeatedly until the interval is
/// consumed. Rejected steps are reverted and retried with the rescaled
/// timestep suggested by the solver's error controller; accepted steps
/// grow the timestep by the same suggestion.
///
/// # Arguments
/// * `solver` - Explicit solver holding the current state
/// * `f` - Right-hand side function `f(state, t)`
/// * `t0`, `t1` - Interval bounds, `t1 > t0`
/// * `dt_init` - Initial timestep attempt
///
/// # Errors
/// [`SolverError::TimestepTooSmall`] when repeated rejections drive the
/// timestep below [`DT_MIN`].
pub fn integrate_interval<S, F>(
    solver: &mut S,
    mut f: F,
    t0: f64,
    t1: f64,
    dt_init: f64,
) -> Result<(), SolverError>
where
    S: ExplicitSolver,
    F: FnMut(&DVector<f64>, f64) -> DVector<f64>,
{
    let mut t = t0;
    let mut dt = dt_init.min(t1 - t0);

    while t < t1 - 1e-12 {
        dt = dt.min(t1 - t);

        solver.buffer(dt);
        let mut result = SolverStepResult::default();
        let stages = solver.stages();
        for _ in 0..stages {
            result = solver.step(|x, stage_t| f(x, t + stage_t), dt);
        }

        if solver.is_adaptive() && !result.success {
            solver.revert()?;
            dt *= result.scale.unwrap_or(0.5);
            if dt < DT_MIN {
                return Err(SolverError::TimestepTooSmall { dt, dt_min: DT_MIN });
            }
            continue;
        }

        t += dt;
        if let Some(scale) = result.scale {
            dt = (dt * scale).max(DT_MIN);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integrate_interval_exponential_decay() {
        // dx/dt = -x over [0, 1], exact: exp(-1)
        let mut solver = RKF45::new(DVector::from_vec(vec![1.0]));

        integrate_interval(&mut solver, |x, _t| -x, 0.0, 1.0, 1.0).unwrap();

        assert_relative_eq!(solver.state()[0], (-1.0f64).exp(), epsilon = 1e-5);
    }

    #[test]
    fn test_integrate_interval_fixed_step() {
        // RK4 walks the interval at the requested step
        let mut solver = RK4::new(DVector::from_vec(vec![1.0]));

        integrate_interval(&mut solver, |x, _t| -x, 0.0, 1.0, 0.1).unwrap();

        assert_relative_eq!(solver.state()[0], (-1.0f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_integrate_interval_matches_between_solvers() {
        // Same lag dynamics through both solvers must agree closely
        let rhs = |x: &DVector<f64>, _t: f64| DVector::from_vec(vec![(10.0 - x[0]) / 3.0]);

        let mut adaptive = RKF45::new(DVector::from_vec(vec![0.0]));
        integrate_interval(&mut adaptive, rhs, 0.0, 1.0, 1.0).unwrap();

        let mut fixed = RK4::new(DVector::from_vec(vec![0.0]));
        integrate_interval(&mut fixed, rhs, 0.0, 1.0, 0.01).unwrap();

        assert_relative_eq!(adaptive.state()[0], fixed.state()[0], epsilon = 1e-4);
    }
}
