use std::collections::HashMap;

use formulary::{EquationId, EquationSolver, Method, Repository, SolveOptions};

fn main() -> Result<(), String> {
    let repository = Repository::seeded();

    for equation in repository.list(&Default::default()) {
        println!(
            "{}\t{}\t{}",
            equation.id(),
            equation.formula(),
            equation.name()
        );
    }

    // Mass of an object with the energy of 1 kWh.
    let einstein = repository
        .get(EquationId::new(1))
        .ok_or("equation not found")?;
    let inputs = HashMap::from([("E".to_string(), 3.6e6), ("c".to_string(), 299_792_458.0)]);
    let mass = formulary::solve(einstein, &inputs, "m").map_err(|error| format!("{error}"))?;
    println!("m = {mass:e} kg");

    // The same by bisection, to see the iterations.
    let mut options = SolveOptions::default();
    options
        .set_use_catalog(false)
        .set_interval((0.0, 1.0))
        .set_max_iters(100)
        .set_tolerance(1e-3);

    let solution = EquationSolver::new()
        .with_options(options)
        .solve_detailed(einstein, &inputs, "m")
        .map_err(|error| format!("{error}"))?;

    match solution.method {
        Method::ClosedForm => println!("m = {:e} kg (closed form)", solution.value),
        Method::Bisection {
            iters,
            residual,
            status,
        } => println!(
            "m = {:e} kg ({:?} after {} iterations, residual = {:e})",
            solution.value, status, iters, residual
        ),
    }

    Ok(())
}
