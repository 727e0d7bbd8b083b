use pidsim::{run_simulation, NoiseSource, PidGains, ProcessModel, MIN_HORIZON};

/// Demo entry point: one closed-loop run printed as a coarse table
///
/// Takes six optional positional arguments:
/// gain, time constant, dead time, Kp, Ki, Kd
fn main() {
    let args: Vec<f64> = std::env::args()
        .skip(1)
        .map(|a| {
            a.parse().unwrap_or_else(|_| {
                eprintln!("usage: pidsim [gain tau dead_time kp ki kd]");
                std::process::exit(2);
            })
        })
        .collect();

    let get = |i: usize, default: f64| args.get(i).copied().unwrap_or(default);

    let model = ProcessModel::new(get(0, 2.25), get(1, 60.5), get(2, 9.99));
    let gains = PidGains {
        kp: get(3, 1.1),
        ki: get(4, 0.1),
        kd: get(5, 0.09),
    };

    // One noise realization for the process lifetime
    let noise = NoiseSource::from_entropy(MIN_HORIZON);

    println!("PID / FOPDT closed-loop simulation");
    println!("==================================");
    println!(
        "Model: gain={} tau={}s dead_time={}s",
        model.gain, model.time_constant, model.dead_time
    );
    println!("Gains: Kp={} Ki={} Kd={}", gains.kp, gains.ki, gains.kd);
    println!();

    let result = match run_simulation(&model, &gains, &noise) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            std::process::exit(1);
        }
    };

    println!("{:>6} {:>8} {:>8} {:>8}", "t", "SP", "CV", "PV");
    for &t in result.time.iter().step_by(result.time.len() / 20) {
        println!(
            "{:>6} {:>8.2} {:>8.2} {:>8.2}",
            t, result.setpoint[t], result.control[t], result.process[t]
        );
    }

    println!();
    println!("ITAE: {:.2}", result.itae);
}
