use criterion::{Criterion, criterion_group, criterion_main};
use sat_puzzles::queens::Queens;
use sat_puzzles::resources::ResourcePuzzle;
use sat_puzzles::sat::cdcl::Cdcl;
use sat_puzzles::sat::cnf::Cnf;
use sat_puzzles::sat::literal::Literal;
use sat_puzzles::sat::solver::{
    BaselineConfig, DefaultConfig, GeometricConfig, SolveLimits, Solver, SolverConfig,
};
use sat_puzzles::sudoku::{EXAMPLE_NINE, EXAMPLE_SIXTEEN, Sudoku};
use std::hint::black_box;
use std::time::Duration;

fn convert<L: Literal>(cnf: &Cnf) -> Cnf<L> {
    Cnf::new(cnf.iter().map(|c| c.to_i32s()))
}

fn solve_cnf<C: SolverConfig>(cnf: &Cnf<C::Literal>) {
    let mut state: Cdcl<C> = Solver::new(cnf.clone(), SolveLimits::default());
    black_box(state.solve());
}

fn bench_puzzles(c: &mut Criterion) {
    let sudoku = Sudoku::new(EXAMPLE_NINE).expect("valid givens");
    c.bench_function("sudoku 9x9", |b| {
        b.iter(|| black_box(sudoku.solve().expect("solves")));
    });

    let queens = Queens::default();
    c.bench_function("8-queens", |b| {
        b.iter(|| black_box(queens.solve().expect("solves")));
    });

    let puzzle = ResourcePuzzle::default();
    c.bench_function("resource allocation", |b| {
        b.iter(|| black_box(puzzle.solve().expect("solves")));
    });
}

fn bench_solver_configs(c: &mut Criterion) {
    let cnf = Sudoku::new(EXAMPLE_SIXTEEN)
        .and_then(|s| s.to_cnf())
        .expect("16x16 sudoku compiles");
    let structured = convert(&cnf);

    let mut group = c.benchmark_group("sudoku 16x16 - solver config");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("Default", |b| b.iter(|| solve_cnf::<DefaultConfig>(&cnf)));
    group.bench_function("Geometric", |b| {
        b.iter(|| solve_cnf::<GeometricConfig>(&structured));
    });
    group.bench_function("Baseline", |b| b.iter(|| solve_cnf::<BaselineConfig>(&cnf)));

    group.finish();
}

fn bench_queens_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("n-queens");
    for n in [4, 8, 12, 16] {
        let queens = Queens::new(n).expect("non-empty board");
        group.bench_function(format!("{n}"), |b| {
            b.iter(|| black_box(queens.solve().expect("solves")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_puzzles, bench_solver_configs, bench_queens_sizes);
criterion_main!(benches);
