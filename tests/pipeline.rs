use prop_sat::sat::cnf::Cnf;
use prop_sat::sat::dpll::Dpll;
use prop_sat::sat::expr::Expr;
use prop_sat::sat::extract::{ClauseCollector, ClauseOrder, deduplicate, extract, formula_to_clauses};
use prop_sat::sat::solver::{Solver, Verdict};
use prop_sat::sat::symbols::{Alphabet, SymbolTable, encode_clauses};
use prop_sat::sat::transform::{is_cnf, normalize};
use prop_sat::sudoku::solver::{Size, parse_cell_assignments};

const NAMES: [&str; 5] = ["A", "B", "C", "D", "E"];

fn random_expr(rng: &mut fastrand::Rng, depth: usize) -> Expr {
    if depth == 0 || rng.u8(0..4) == 0 {
        return Expr::var(NAMES[rng.usize(..NAMES.len())]);
    }
    let l = random_expr(rng, depth - 1);
    match rng.u8(0..5) {
        0 => Expr::not(l),
        1 => Expr::and(l, random_expr(rng, depth - 1)),
        2 => Expr::or(l, random_expr(rng, depth - 1)),
        3 => Expr::implies(l, random_expr(rng, depth - 1)),
        _ => Expr::iff(l, random_expr(rng, depth - 1)),
    }
}

/// Every assignment of `NAMES` as a bit set, bit `i` holding `NAMES[i]`.
fn assignments() -> impl Iterator<Item = u32> {
    0..(1u32 << NAMES.len())
}

fn value_of(bits: u32, name: &str) -> bool {
    NAMES
        .iter()
        .position(|n| *n == name)
        .is_some_and(|i| bits & (1 << i) != 0)
}

fn has_and_under_or(e: &Expr) -> bool {
    match e {
        Expr::Or(l, r) => contains_and(l) || contains_and(r),
        Expr::And(l, r) | Expr::Implies(l, r) | Expr::Iff(l, r) => {
            has_and_under_or(l) || has_and_under_or(r)
        }
        Expr::Not(a) => has_and_under_or(a),
        Expr::Var(_) => false,
    }
}

fn contains_and(e: &Expr) -> bool {
    match e {
        Expr::And(..) => true,
        Expr::Or(l, r) | Expr::Implies(l, r) | Expr::Iff(l, r) => contains_and(l) || contains_and(r),
        Expr::Not(a) => contains_and(a),
        Expr::Var(_) => false,
    }
}

fn solve_clauses(clauses: &[String]) -> (Verdict, Dpll) {
    let cnf = encode_clauses(clauses, &mut Alphabet).unwrap();
    let mut solver = Dpll::new(cnf);
    let verdict = solver.solve();
    (verdict, solver)
}

fn brute_force_sat(cnf: &Cnf) -> bool {
    let n = cnf.num_vars;
    (0..(1u32 << n)).any(|bits| {
        cnf.iter().all(|clause| {
            clause.iter().any(|lit| {
                let value = bits & (1 << (lit.variable() - 1)) != 0;
                value == lit.polarity()
            })
        })
    })
}

fn random_cnf(rng: &mut fastrand::Rng, num_vars: i32) -> Cnf {
    let num_clauses = rng.usize(1..=(num_vars as usize * 5));
    let clauses = (0..num_clauses)
        .map(|_| {
            (0..rng.usize(1..=3))
                .map(|_| {
                    let var = rng.i32(1..=num_vars);
                    if rng.bool() { var } else { -var }
                })
                .collect()
        })
        .collect();
    Cnf::new(clauses)
}

#[test]
fn test_conjunction_of_two_variables() {
    let clauses = formula_to_clauses("A^B").unwrap();
    assert_eq!(clauses, vec!["A", "B"]);

    let (verdict, solver) = solve_clauses(&clauses);
    assert_eq!(verdict, Verdict::Satisfiable);
    assert_eq!(solver.valuation().var_value(1), Some(true));
    assert_eq!(solver.valuation().var_value(2), Some(true));
}

#[test]
fn test_contradiction_is_unsat() {
    let clauses = formula_to_clauses("A^!A").unwrap();
    let (verdict, _) = solve_clauses(&clauses);
    assert_eq!(verdict, Verdict::Unsatisfiable);
}

#[test]
fn test_modus_ponens_violation_is_unsat() {
    let clauses = formula_to_clauses("(A=>B)^A^!B").unwrap();
    let (verdict, _) = solve_clauses(&clauses);
    assert_eq!(verdict, Verdict::Unsatisfiable);
}

#[test]
fn test_biconditional_with_unit_forces_partner() {
    let mut collector = ClauseCollector::new(ClauseOrder::Length);
    collector.push_formula("A<=>B").unwrap();
    collector.push_formula("A").unwrap();
    let clauses = collector.finish();
    assert_eq!(clauses[0], "A");

    let (verdict, solver) = solve_clauses(&clauses);
    assert_eq!(verdict, Verdict::Satisfiable);
    assert_eq!(solver.valuation().var_value(1), Some(true));
    assert_eq!(solver.valuation().var_value(2), Some(true));
}

#[test]
fn test_four_by_four_sudoku_through_formulas() {
    let _ = env_logger::builder().is_test(true).try_init();
    let puzzle = parse_cell_assignments(Size::Four, &["11=3"]).unwrap();
    let cnf = puzzle.to_cnf_via_formulas(ClauseOrder::Length).unwrap();

    let mut solver = Dpll::new(cnf.clone());
    assert_eq!(solver.solve(), Verdict::Satisfiable);
    assert!(cnf.verify(solver.valuation()));

    let solution = puzzle.decode(solver.valuation());
    assert!(solution.is_solved());
    assert!(solution.extends(&puzzle));
}

#[test]
fn test_normalized_formula_is_equivalent() {
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..300 {
        let e = random_expr(&mut rng, 4);
        let cnf = normalize(e.clone());
        for bits in assignments() {
            let lookup = |name: &str| value_of(bits, name);
            let expected = e.evaluate(&lookup);
            let actual = cnf.as_ref().is_none_or(|c| c.evaluate(&lookup));
            assert_eq!(expected, actual, "{e} vs {cnf:?} under {bits:05b}");
        }
    }
}

#[test]
fn test_normalized_formula_has_no_and_under_or() {
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..300 {
        let e = random_expr(&mut rng, 5);
        if let Some(cnf) = normalize(e) {
            assert!(is_cnf(&cnf), "{cnf}");
            assert!(!has_and_under_or(&cnf), "{cnf}");
        }
    }
}

/// A chain of `depth - 2` connectives over `A^B`, each taking a variable or a
/// two-variable conjunction as its other operand.
fn random_spine(rng: &mut fastrand::Rng, depth: usize) -> Expr {
    let mut e = Expr::and(Expr::var("A"), Expr::var("B"));
    for _ in 2..depth {
        let other = if rng.bool() {
            Expr::var(NAMES[rng.usize(..NAMES.len())])
        } else {
            Expr::and(
                Expr::var(NAMES[rng.usize(..NAMES.len())]),
                Expr::var(NAMES[rng.usize(..NAMES.len())]),
            )
        };
        e = match rng.u8(0..3) {
            0 => Expr::not(e),
            1 => Expr::and(e, other),
            _ => Expr::or(other, e),
        };
    }
    e
}

#[test]
fn test_deep_formulas_have_no_and_under_or() {
    let mut rng = fastrand::Rng::with_seed(29);
    for _ in 0..50 {
        let e = random_spine(&mut rng, 10);
        assert_eq!(e.depth(), 10, "{e}");
        let cnf = normalize(e.clone());
        if let Some(cnf) = &cnf {
            assert!(is_cnf(cnf), "{cnf}");
            assert!(!has_and_under_or(cnf), "{cnf}");
        }
        for bits in assignments() {
            let lookup = |name: &str| value_of(bits, name);
            assert_eq!(e.evaluate(&lookup), cnf.as_ref().is_none_or(|c| c.evaluate(&lookup)), "{e}");
        }
    }
}

#[test]
fn test_normalize_is_idempotent_on_cnf() {
    let mut rng = fastrand::Rng::with_seed(13);
    for _ in 0..200 {
        if let Some(cnf) = normalize(random_expr(&mut rng, 4)) {
            assert_eq!(normalize(cnf.clone()), Some(cnf));
        }
    }
}

#[test]
fn test_deduplicated_clauses_are_distinct() {
    let mut rng = fastrand::Rng::with_seed(17);
    for _ in 0..100 {
        let e = Expr::and(random_expr(&mut rng, 3), random_expr(&mut rng, 3));
        let e = Expr::and(e.clone(), e);
        let raw = extract(normalize(e).as_ref());
        let unique = deduplicate(raw.clone());

        for clause in &raw {
            assert_eq!(unique.iter().filter(|c| *c == clause).count(), 1);
        }
        assert_eq!(unique.len(), unique.iter().collect::<std::collections::HashSet<_>>().len());
    }
}

#[test]
fn test_formula_verdict_matches_truth_table() {
    let mut rng = fastrand::Rng::with_seed(19);
    for _ in 0..300 {
        let e = random_expr(&mut rng, 4);
        let clauses = deduplicate(extract(normalize(e.clone()).as_ref()));
        let (verdict, solver) = solve_clauses(&clauses);

        let satisfiable = assignments().any(|bits| e.evaluate(&|name: &str| value_of(bits, name)));
        assert_eq!(verdict.is_sat(), satisfiable, "{e}");

        if verdict.is_sat() {
            let valuation = solver.valuation();
            let lookup = |name: &str| {
                Alphabet
                    .variable(name)
                    .and_then(|v| valuation.var_value(v))
                    .unwrap_or(false)
            };
            assert!(e.evaluate(&lookup), "{e}");
        }
    }
}

#[test]
fn test_dpll_agrees_with_brute_force() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = fastrand::Rng::with_seed(23);
    for _ in 0..200 {
        let num_vars = rng.i32(1..=12);
        let cnf = random_cnf(&mut rng, num_vars);

        let mut solver = Dpll::new(cnf.clone());
        let verdict = solver.solve();

        if verdict.is_sat() {
            assert!(cnf.verify(solver.valuation()), "{cnf}");
        } else {
            assert!(!brute_force_sat(&cnf), "{cnf}");
        }
    }
}
