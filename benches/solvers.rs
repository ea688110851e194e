use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, Criterion};
use formulary::{
    equation::{Equation, EquationDraft, EquationId, Variable},
    expr::compile,
    markup::normalize,
    EquationSolver, Repository, SolveOptions,
};

fn inputs(values: &[(&str, f64)]) -> HashMap<String, f64> {
    values
        .iter()
        .map(|(symbol, value)| (symbol.to_string(), *value))
        .collect()
}

fn kinetic() -> Equation {
    let draft = EquationDraft::new("Kinetic Energy", "K = \\frac{1}{2}mv^2")
        .with_variable(Variable::new("K"))
        .with_variable(Variable::new("m"))
        .with_variable(Variable::new("v"));

    Equation::new(EquationId::new(1), draft).unwrap()
}

fn closed_form(c: &mut Criterion) {
    let repository = Repository::seeded();
    let einstein = repository.get(EquationId::new(1)).unwrap();
    let values = inputs(&[("E", 1.8e17), ("c", 299_792_458.0)]);
    let solver = EquationSolver::new();

    c.bench_function("closed form E = mc^2", |b| {
        b.iter(|| assert!(solver.solve(einstein, &values, "m").is_ok()))
    });
}

fn bisection(c: &mut Criterion) {
    let kinetic = kinetic();
    let values = inputs(&[("K", 100.0), ("m", 2.0)]);

    let mut options = SolveOptions::default();
    options.set_interval((0.0, 1000.0));
    let default_budget = EquationSolver::new().with_options(options.clone());

    options.set_max_iters(60).set_tolerance(1e-12);
    let full_budget = EquationSolver::new().with_options(options);

    c.bench_function("bisection kinetic energy 20 iterations", |b| {
        b.iter(|| assert!(default_budget.solve(&kinetic, &values, "v").is_ok()))
    });

    c.bench_function("bisection kinetic energy 60 iterations", |b| {
        b.iter(|| assert!(full_budget.solve(&kinetic, &values, "v").is_ok()))
    });
}

fn compilation(c: &mut Criterion) {
    let symbols = ["K", "m", "v"];

    c.bench_function("normalize and compile kinetic energy", |b| {
        b.iter(|| {
            let residual = normalize("K = \\frac{1}{2}mv^2", &symbols).unwrap();
            assert!(compile(&residual, &symbols).is_ok())
        })
    });
}

criterion_group!(benches, closed_form, bisection, compilation);
criterion_main!(benches);
