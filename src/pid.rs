//! Discrete PID controller with output clamping and integral anti-windup

use crate::error::SimError;

/// Controller output limits
///
/// An unset bound makes `clamp` a no-op on that side. The default matches
/// the actuator range of the simulated loop, [0, 100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputLimits {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            lower: Some(0.0),
            upper: Some(100.0),
        }
    }
}

impl OutputLimits {
    /// Limits with both bounds set
    pub fn bounded(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Reject inverted bounds
    pub fn validate(&self) -> Result<(), SimError> {
        if let (Some(lower), Some(upper)) = (self.lower, self.upper) {
            if lower > upper {
                return Err(SimError::InvertedLimits { lower, upper });
            }
        }
        Ok(())
    }

    /// Clamp a value to the set bounds
    pub fn clamp(&self, value: f64) -> f64 {
        match (self.lower, self.upper) {
            (_, Some(upper)) if value > upper => upper,
            (Some(lower), _) if value < lower => lower,
            _ => value,
        }
    }

    /// True when the value sits strictly inside the open interval
    pub fn interior(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| value > lower)
            && self.upper.map_or(true, |upper| value < upper)
    }
}

/// Discrete PID controller
///
/// Called once per simulation step with the current process variable and
/// setpoint; returns the clamped control variable.
///
/// # Control law
///
/// - Proportional: `Kp * (sp - pv)`
/// - Integral: accumulates `Ki * (sp - pv)` only while the previous output
///   sat strictly inside the output limits (anti-windup freeze). The stored
///   integral is re-clamped to the limits after every update. The freeze
///   bounds follow the *configured* limits rather than a fixed [0, 100];
///   see DESIGN.md.
/// - Derivative on measurement: `Kd * d(-pv)`, so setpoint steps produce no
///   derivative kick. The first call after construction or [`Pid::reset`]
///   forces the derivative term to zero.
///
/// # Example
///
/// ```ignore
/// let mut pid = Pid::new(1.1, 0.1, 0.09, 0.0);
/// let cv = pid.compute(13.1, 50.0);
/// let (p, i, d) = pid.components();
/// ```
#[derive(Debug, Clone)]
pub struct Pid {
    // Tunings
    kp: f64,
    ki: f64,
    kd: f64,

    setpoint: f64,
    limits: OutputLimits,

    // Last computed terms
    proportional: f64,
    integral: f64,
    derivative: f64,

    // Step-to-step memory
    last_d_input: f64,
    last_output: f64,
    derivative_primed: bool,
}

impl Pid {
    /// Create a controller with gains and an initial setpoint
    ///
    /// Output limits default to [0, 100].
    pub fn new(kp: f64, ki: f64, kd: f64, setpoint: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            setpoint,
            limits: OutputLimits::default(),
            proportional: 0.0,
            integral: 0.0,
            derivative: 0.0,
            last_d_input: 0.0,
            last_output: 0.0,
            derivative_primed: false,
        }
    }

    /// Compute the control variable for one step
    pub fn compute(&mut self, pv: f64, setpoint: f64) -> f64 {
        self.setpoint = setpoint;
        let error = setpoint - pv;

        self.proportional = self.kp * error;

        // Freeze integration while the last output sat at or beyond a limit
        if self.limits.interior(self.last_output) {
            self.integral += self.ki * error;
            self.integral = self.limits.clamp(self.integral);
        }

        // Derivative on measurement
        let d_input = -pv;
        self.derivative = self.kd * (d_input - self.last_d_input);

        // Suppress the derivative kick of the very first sample
        if !self.derivative_primed {
            self.derivative = 0.0;
            self.derivative_primed = true;
        }

        let output = self
            .limits
            .clamp(self.proportional + self.integral + self.derivative);

        self.last_d_input = d_input;
        self.last_output = output;

        output
    }

    /// Reset the controller to its initial state
    ///
    /// Zeroes the three terms, re-clamps the integral to the limits, clears
    /// the derivative and output memory, and re-arms the first-sample
    /// derivative suppression.
    pub fn reset(&mut self) {
        self.proportional = 0.0;
        self.integral = self.limits.clamp(0.0);
        self.derivative = 0.0;
        self.last_d_input = 0.0;
        self.last_output = 0.0;
        self.derivative_primed = false;
    }

    /// Last-computed (proportional, integral, derivative) terms
    pub fn components(&self) -> (f64, f64, f64) {
        (self.proportional, self.integral, self.derivative)
    }

    /// Current (Kp, Ki, Kd) gains
    pub fn tunings(&self) -> (f64, f64, f64) {
        (self.kp, self.ki, self.kd)
    }

    /// Replace all three gains at once; no validation
    pub fn set_tunings(&mut self, tunings: (f64, f64, f64)) {
        (self.kp, self.ki, self.kd) = tunings;
    }

    /// Current output limits
    pub fn output_limits(&self) -> OutputLimits {
        self.limits
    }

    /// Replace the output limits; `None` restores the default [0, 100]
    ///
    /// The stored integral is re-clamped to the new limits immediately.
    pub fn set_output_limits(&mut self, limits: Option<OutputLimits>) {
        self.limits = limits.unwrap_or_default();
        self.integral = self.limits.clamp(self.integral);
    }

    /// Current setpoint (updated on every [`Pid::compute`] call)
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }
}
