//! Rewrite passes that bring an expression tree into conjunctive normal form.
//!
//! Each pass takes a tree by value and returns a new one, rewriting children
//! before their parent is inspected. The passes must run in the order
//! [`normalize`] applies them:
//!
//! 1. [`eliminate_biconditional`]
//! 2. [`eliminate_implication`]
//! 3. [`apply_de_morgan`]
//! 4. [`remove_double_negation`]
//! 5. [`distribute_or_over_and`]
//!
//! The last pass returns `None` for a formula that is trivially true, since such
//! a formula contributes no clause at all.

use crate::sat::expr::Expr;
use log::trace;
use rustc_hash::FxHashSet;

/// Rebuilds `e` with `f` applied to each of its direct children.
fn map_children(e: Expr, f: fn(Expr) -> Expr) -> Expr {
    match e {
        Expr::Var(_) => e,
        Expr::Not(a) => Expr::not(f(*a)),
        Expr::And(l, r) => Expr::and(f(*l), f(*r)),
        Expr::Or(l, r) => Expr::or(f(*l), f(*r)),
        Expr::Implies(l, r) => Expr::implies(f(*l), f(*r)),
        Expr::Iff(l, r) => Expr::iff(f(*l), f(*r)),
    }
}

/// `A <=> B` becomes `(A => B) ^ (B => A)`.
#[must_use]
pub fn eliminate_biconditional(e: Expr) -> Expr {
    match map_children(e, eliminate_biconditional) {
        Expr::Iff(l, r) => Expr::and(
            Expr::implies((*l).clone(), (*r).clone()),
            Expr::implies(*r, *l),
        ),
        e => e,
    }
}

/// `A => B` becomes `!A v B`.
#[must_use]
pub fn eliminate_implication(e: Expr) -> Expr {
    match map_children(e, eliminate_implication) {
        Expr::Implies(l, r) => Expr::or(Expr::not(*l), *r),
        e => e,
    }
}

/// Pushes every negation down to the variables.
///
/// `!(A v B)` becomes `!A ^ !B` and `!(A ^ B)` becomes `!A v !B`; the new
/// negations are pushed further in straight away, so a single pass leaves no
/// negation above a conjunction or disjunction. Double negations are left for
/// [`remove_double_negation`].
#[must_use]
pub fn apply_de_morgan(e: Expr) -> Expr {
    match map_children(e, apply_de_morgan) {
        Expr::Not(inner) => negate(*inner),
        e => e,
    }
}

/// Negates a tree whose negations have already been pushed inwards.
fn negate(e: Expr) -> Expr {
    match e {
        Expr::Or(l, r) => Expr::and(negate(*l), negate(*r)),
        Expr::And(l, r) => Expr::or(negate(*l), negate(*r)),
        e => Expr::not(e),
    }
}

/// `!!A` becomes `A`.
#[must_use]
pub fn remove_double_negation(e: Expr) -> Expr {
    match map_children(e, remove_double_negation) {
        Expr::Not(inner) => match *inner {
            Expr::Not(a) => *a,
            inner => Expr::not(inner),
        },
        e => e,
    }
}

/// Distributes disjunction over conjunction until no `Or` has an `And` below it.
///
/// Disjunctions that contain a variable together with its negation are always
/// true and are dropped. `None` means nothing is left, i.e. the whole formula is
/// trivially true; a dropped conjunct of an `And` leaves only the other side.
#[must_use]
pub fn distribute_or_over_and(e: Expr) -> Option<Expr> {
    distribute(e).and_then(drop_tautologies)
}

/// Clauses are only checked for tautologies where a distribution multiplies
/// them, and once more at the top, so a long flat clause is scanned once.
fn distribute(e: Expr) -> Option<Expr> {
    match e {
        Expr::And(l, r) => conjoin(distribute(*l), distribute(*r)),
        Expr::Or(l, r) => {
            let l = distribute(*l)?;
            let r = distribute(*r)?;
            if matches!(l, Expr::And(..)) || matches!(r, Expr::And(..)) {
                drop_tautologies(distribute_pair(l, r))
            } else {
                Some(Expr::or(l, r))
            }
        }
        e => Some(e),
    }
}

/// Disjoins two trees that are already in CNF.
fn distribute_pair(l: Expr, r: Expr) -> Expr {
    match (l, r) {
        (Expr::And(a, b), r) => {
            Expr::and(distribute_pair(*a, r.clone()), distribute_pair(*b, r))
        }
        (l, Expr::And(a, b)) => {
            Expr::and(distribute_pair(l.clone(), *a), distribute_pair(l, *b))
        }
        (l, r) => Expr::or(l, r),
    }
}

/// Checks each finished clause once and removes the tautological ones.
fn drop_tautologies(e: Expr) -> Option<Expr> {
    match e {
        Expr::And(l, r) => conjoin(drop_tautologies(*l), drop_tautologies(*r)),
        clause if is_tautology(&clause) => {
            trace!("dropping tautology {clause}");
            None
        }
        clause => Some(clause),
    }
}

fn conjoin(l: Option<Expr>, r: Option<Expr>) -> Option<Expr> {
    match (l, r) {
        (Some(l), Some(r)) => Some(Expr::and(l, r)),
        (l, None) => l,
        (None, r) => r,
    }
}

fn disjuncts<'a>(e: &'a Expr, out: &mut Vec<&'a Expr>) {
    match e {
        Expr::Or(l, r) => {
            disjuncts(l, out);
            disjuncts(r, out);
        }
        e => out.push(e),
    }
}

/// A disjunction containing some variable with both polarities.
#[must_use]
pub fn is_tautology(clause: &Expr) -> bool {
    let mut parts = Vec::new();
    disjuncts(clause, &mut parts);

    let mut seen = FxHashSet::default();
    parts
        .iter()
        .filter_map(|e| e.as_literal())
        .any(|(name, polarity)| {
            seen.insert((name, polarity));
            seen.contains(&(name, !polarity))
        })
}

/// Whether `e` is a conjunction of disjunctions of literals.
#[must_use]
pub fn is_cnf(e: &Expr) -> bool {
    match e {
        Expr::And(l, r) => is_cnf(l) && is_cnf(r),
        e => is_clause(e),
    }
}

fn is_clause(e: &Expr) -> bool {
    match e {
        Expr::Or(l, r) => is_clause(l) && is_clause(r),
        e => e.is_literal(),
    }
}

/// Runs all five passes in order.
#[must_use]
pub fn normalize(e: Expr) -> Option<Expr> {
    let e = eliminate_biconditional(e);
    trace!("without <=>: {e}");
    let e = eliminate_implication(e);
    trace!("without =>: {e}");
    let e = apply_de_morgan(e);
    trace!("after De Morgan: {e}");
    let e = remove_double_negation(e);
    trace!("without double negation: {e}");
    let e = distribute_or_over_and(e);
    if let Some(e) = &e {
        trace!("cnf: {e}");
    }
    e
}
