use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tinycp::solver::{
    constraints::{circuit::Circuit, element::Element1D},
    engine::Solver,
    heuristics::first_fail,
    search::DFSearch,
};

fn count_circuits(n: usize) -> usize {
    let mut solver = Solver::new();
    let x = solver.new_variables(n, 0, n as i64 - 1);
    solver
        .post(Box::new(Circuit::new(x.clone())))
        .expect("circuit model is satisfiable");
    let mut search = DFSearch::new(&mut solver, first_fail(x));
    search.start().expect("search completes").n_solutions
}

fn circuit_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_all_solutions");
    for n in [5usize, 6, 7] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| count_circuits(black_box(n)));
        });
    }
    group.finish();
}

fn element_benchmark(c: &mut Criterion) {
    let table: Vec<i64> = (0..64).map(|i| (i * 37) % 101).collect();
    c.bench_function("element_bound_tightening", |b| {
        b.iter(|| {
            let mut solver = Solver::new();
            let x = solver.new_variable(0, table.len() as i64 - 1);
            let y = solver.new_variable(0, 100);
            let element = Element1D::new(solver.trail_mut(), &table, x, y);
            solver.post(Box::new(element)).expect("consistent model");
            for bound in [10, 25, 40, 60, 80] {
                solver.remove_below(y, black_box(bound)).expect("feasible");
            }
            solver.min(y)
        });
    });
}

criterion_group!(benches, circuit_benchmark, element_benchmark);
criterion_main!(benches);
