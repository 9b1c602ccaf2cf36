use criterion::{Criterion, criterion_group, criterion_main};
use prop_sat::sat::cnf::Cnf;
use prop_sat::sat::dpll::Dpll;
use prop_sat::sat::extract::{ClauseCollector, ClauseOrder, formula_to_clauses};
use prop_sat::sat::solver::Solver;
use prop_sat::sat::symbols::{Alphabet, encode_clauses};
use prop_sat::sudoku::solver::{Board, EXAMPLE_FOUR, EXAMPLE_NINE, Sudoku};
use std::hint::black_box;
use std::time::Duration;

const FORMULAS: &[&str] = &[
    "(A=>B)^(B=>C)^(C=>D)^A",
    "(A<=>B)^(B<=>C)^(C<=>!A)",
    "(AvB)^(CvD)v(E^F)v(G^H)",
    "!((A^B)v(C^D))=>(EvF)",
    "((A=>B)=>C)<=>((D^E)vF)",
];

/// Random 3-SAT instances near the phase transition (ratio 4.26).
fn random_3sat(rng: &mut fastrand::Rng, num_vars: i32, count: usize) -> Vec<Cnf> {
    let num_clauses = (f64::from(num_vars) * 4.26) as usize;
    (0..count)
        .map(|_| {
            let clauses = (0..num_clauses)
                .map(|_| {
                    (0..3)
                        .map(|_| {
                            let var = rng.i32(1..=num_vars);
                            if rng.bool() { var } else { -var }
                        })
                        .collect()
                })
                .collect();
            Cnf::new(clauses)
        })
        .collect()
}

fn formula_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula pipeline");

    group.bench_function("to clauses", |b| {
        b.iter(|| {
            for f in FORMULAS {
                black_box(formula_to_clauses(f).ok());
            }
        })
    });

    group.bench_function("to clauses and solve", |b| {
        b.iter(|| {
            let mut collector = ClauseCollector::new(ClauseOrder::Length);
            for f in FORMULAS {
                let _ = collector.push_formula(f);
            }
            let clauses = collector.finish();
            if let Ok(cnf) = encode_clauses(&clauses, &mut Alphabet) {
                let mut solver = Dpll::new(cnf);
                black_box(solver.solve());
            }
        })
    });

    group.finish();
}

fn dpll_random(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let small = random_3sat(&mut rng, 20, 50);
    let medium = random_3sat(&mut rng, 50, 10);

    let mut group = c.benchmark_group("dpll - random 3-SAT");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("20 variables", |b| {
        b.iter(|| {
            for cnf in &small {
                let mut solver = Dpll::new(cnf.clone());
                black_box(solver.solve());
            }
        })
    });

    group.sample_size(10);
    group.bench_function("50 variables", |b| {
        b.iter(|| {
            for cnf in &medium {
                let mut solver = Dpll::new(cnf.clone());
                black_box(solver.solve());
            }
        })
    });

    group.finish();
}

fn sudoku(c: &mut Criterion) {
    let mut group = c.benchmark_group("sudoku");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(20));

    let Ok(four) = Sudoku::new(Board::from(EXAMPLE_FOUR)) else {
        return;
    };
    let Ok(nine) = Sudoku::new(Board::from(EXAMPLE_NINE)) else {
        return;
    };

    group.bench_function("4x4 direct", |b| {
        b.iter(|| {
            if let Ok(cnf) = four.to_cnf() {
                let mut solver = Dpll::new(cnf);
                black_box(solver.solve());
            }
        })
    });

    group.bench_function("4x4 via formulas", |b| {
        b.iter(|| {
            if let Ok(cnf) = four.to_cnf_via_formulas(ClauseOrder::Length) {
                let mut solver = Dpll::new(cnf);
                black_box(solver.solve());
            }
        })
    });

    group.bench_function("9x9 direct", |b| {
        b.iter(|| {
            if let Ok(cnf) = nine.to_cnf() {
                let mut solver = Dpll::new(cnf);
                black_box(solver.solve());
            }
        })
    });

    group.finish();
}

criterion_group!(benches, formula_pipeline, dpll_random, sudoku);
criterion_main!(benches);
