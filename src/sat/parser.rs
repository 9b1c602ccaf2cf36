#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A recursive-descent parser for infix propositional formulas.
//!
//! The accepted syntax is deliberately small:
//! - `<=>` biconditional, `=>` implication, `v` disjunction, `^` conjunction and
//!   `!` negation, in increasing order of precedence.
//! - Parentheses for grouping.
//! - Variables are either a single upper-case letter (`A`, `B`, ...) or a structured name
//!   starting with the reserved prefix `n`, such as `n5_r3_c2`.
//!
//! Binary operators are located by scanning the range right to left while
//! tracking parenthesis depth, so only operators at depth 0 split the range.
//! Splitting at the rightmost occurrence groups chains of the same operator from
//! the left: `AvBvC` parses as `(AvB)vC`.

use crate::error::ParseError;
use crate::sat::expr::Expr;

/// Prefix that marks a structured, multi-character variable name.
pub const COMPOUND_PREFIX: u8 = b'n';

/// Parses a whole formula, ignoring any whitespace in it.
///
/// # Errors
///
/// Returns a [`ParseError`] when the formula is empty, contains non-ASCII
/// characters, has unbalanced parentheses, is missing an operand or contains a
/// token that is neither an operator nor a variable.
pub fn parse_formula(text: &str) -> Result<Expr, ParseError> {
    let stripped: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Err(ParseError::EmptyFormula);
    }
    parse(&stripped, 0, stripped.len() - 1)
}

/// Parses the inclusive byte range `start..=end` of a space-free formula.
///
/// # Errors
///
/// See [`parse_formula`]. Additionally fails with [`ParseError::OutOfBounds`]
/// when the range does not fit inside `text`.
pub fn parse(text: &str, start: usize, end: usize) -> Result<Expr, ParseError> {
    if !text.is_ascii() {
        return Err(ParseError::NonAscii(text.to_string()));
    }
    if start > end || end >= text.len() {
        return Err(ParseError::OutOfBounds {
            start,
            end,
            len: text.len(),
        });
    }

    check_balance(text, start, end + 1)?;
    parse_range(text, start, end + 1)
}

fn check_balance(src: &str, lo: usize, hi: usize) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for (i, b) in src.bytes().enumerate().take(hi).skip(lo) {
        match b {
            b'(' => open.push(i),
            b')' => {
                if open.pop().is_none() {
                    return Err(ParseError::UnbalancedParens {
                        fragment: src[lo..hi].to_string(),
                        offset: i,
                    });
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some(offset) => Err(ParseError::UnbalancedParens {
            fragment: src[lo..hi].to_string(),
            offset,
        }),
        None => Ok(()),
    }
}

/// Parses the half-open range `lo..hi`. The range is known to be balanced.
fn parse_range(src: &str, lo: usize, hi: usize) -> Result<Expr, ParseError> {
    let bytes = src.as_bytes();
    let (lo, hi) = strip_parens(bytes, lo, hi);

    if lo >= hi {
        return Err(ParseError::EmptyOperand {
            fragment: src[lo.saturating_sub(1)..(hi + 1).min(src.len())].to_string(),
            offset: lo,
        });
    }

    if let Some(at) = rfind_top_level(bytes, lo, hi, b"<=>") {
        return binary(src, lo, hi, at, 3, Expr::iff);
    }

    if let Some(at) = rfind_top_level(bytes, lo, hi, b"=>") {
        return binary(src, lo, hi, at, 2, Expr::implies);
    }

    if let Some(at) = rfind_top_level(bytes, lo, hi, b"v") {
        return binary(src, lo, hi, at, 1, Expr::or);
    }

    if let Some(at) = rfind_top_level(bytes, lo, hi, b"^") {
        return binary(src, lo, hi, at, 1, Expr::and);
    }

    if bytes[lo] == b'!' {
        if lo + 1 == hi {
            return Err(ParseError::EmptyOperand {
                fragment: src[lo..hi].to_string(),
                offset: hi,
            });
        }
        return Ok(Expr::not(parse_range(src, lo + 1, hi)?));
    }

    let token = &src[lo..hi];

    if bytes[lo] == COMPOUND_PREFIX {
        if let Some(bad) = token
            .bytes()
            .position(|b| !(b.is_ascii_alphanumeric() || b == b'_'))
        {
            return Err(ParseError::UnexpectedToken {
                fragment: token.to_string(),
                offset: lo + bad,
            });
        }
        return Ok(Expr::var(token));
    }

    if hi - lo == 1 && bytes[lo].is_ascii_uppercase() {
        return Ok(Expr::var(token));
    }

    Err(ParseError::UnexpectedToken {
        fragment: token.to_string(),
        offset: lo,
    })
}

/// Removes layers of parentheses that enclose the whole range.
fn strip_parens(bytes: &[u8], mut lo: usize, mut hi: usize) -> (usize, usize) {
    while hi > lo + 1 && bytes[lo] == b'(' && bytes[hi - 1] == b')' {
        let mut depth = 0usize;
        let mut closes_at = hi;
        for (i, &b) in bytes.iter().enumerate().take(hi).skip(lo) {
            match b {
                b'(' => depth += 1,
                b')' => depth -= 1,
                _ => {}
            }
            if depth == 0 {
                closes_at = i;
                break;
            }
        }

        if closes_at != hi - 1 {
            break;
        }
        lo += 1;
        hi -= 1;
    }
    (lo, hi)
}

/// Finds the rightmost occurrence of `pattern` at parenthesis depth 0.
fn rfind_top_level(bytes: &[u8], lo: usize, hi: usize, pattern: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    for i in (lo..hi).rev() {
        match bytes[i] {
            b')' => depth += 1,
            b'(' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && i + pattern.len() <= hi && bytes[i..].starts_with(pattern) {
            return Some(i);
        }
    }
    None
}

fn binary(
    src: &str,
    lo: usize,
    hi: usize,
    at: usize,
    width: usize,
    build: fn(Expr, Expr) -> Expr,
) -> Result<Expr, ParseError> {
    if at == lo || at + width == hi {
        return Err(ParseError::EmptyOperand {
            fragment: src[lo..hi].to_string(),
            offset: if at == lo { lo } else { hi },
        });
    }

    let left = parse_range(src, lo, at)?;
    let right = parse_range(src, at + width, hi)?;
    Ok(build(left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn test_parse_single_variable() {
        assert_eq!(parse_formula("A").unwrap(), v("A"));
        assert_eq!(parse_formula("  ( (B) ) ").unwrap(), v("B"));
    }

    #[test]
    fn test_parse_precedence() {
        // ^ binds tighter than v, which binds tighter than =>.
        let e = parse_formula("A^BvC=>D").unwrap();
        assert_eq!(
            e,
            Expr::implies(Expr::or(Expr::and(v("A"), v("B")), v("C")), v("D"))
        );
    }

    #[test]
    fn test_parse_same_operator_groups_from_left() {
        let e = parse_formula("AvBvC").unwrap();
        assert_eq!(e, Expr::or(Expr::or(v("A"), v("B")), v("C")));
    }

    #[test]
    fn test_parse_biconditional_before_implication() {
        let e = parse_formula("A=>B<=>C").unwrap();
        assert_eq!(e, Expr::iff(Expr::implies(v("A"), v("B")), v("C")));
    }

    #[test]
    fn test_parse_negation() {
        assert_eq!(parse_formula("!A").unwrap(), Expr::not(v("A")));
        assert_eq!(
            parse_formula("!(AvB)").unwrap(),
            Expr::not(Expr::or(v("A"), v("B")))
        );
        assert_eq!(parse_formula("!!A").unwrap(), Expr::not(Expr::not(v("A"))));
        assert_eq!(
            parse_formula("!A^B").unwrap(),
            Expr::and(Expr::not(v("A")), v("B"))
        );
    }

    #[test]
    fn test_parse_parenthesised_groups_are_not_stripped_partially() {
        let e = parse_formula("(AvB)^(CvD)").unwrap();
        assert_eq!(
            e,
            Expr::and(Expr::or(v("A"), v("B")), Expr::or(v("C"), v("D")))
        );
    }

    #[test]
    fn test_parse_compound_variables() {
        let e = parse_formula("(n1_r1_c1 v !n2_r1_c1)").unwrap();
        assert_eq!(
            e,
            Expr::or(v("n1_r1_c1"), Expr::not(v("n2_r1_c1")))
        );
    }

    #[test]
    fn test_parse_rejects_lowercase_and_digit_variables() {
        assert_eq!(
            parse_formula("a^B"),
            Err(ParseError::UnexpectedToken {
                fragment: "a".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse_formula("1vB"),
            Err(ParseError::UnexpectedToken {
                fragment: "1".to_string(),
                offset: 0
            })
        );
        assert!(parse_formula("Av!z").is_err());
    }

    #[test]
    fn test_parse_inclusive_sub_range() {
        let text = "(AvB)^C";
        assert_eq!(parse(text, 1, 3).unwrap(), Expr::or(v("A"), v("B")));
        assert_eq!(parse(text, 6, 6).unwrap(), v("C"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_formula("   "), Err(ParseError::EmptyFormula));
        assert!(matches!(
            parse_formula("A^"),
            Err(ParseError::EmptyOperand { .. })
        ));
        assert!(matches!(
            parse_formula("=>B"),
            Err(ParseError::EmptyOperand { offset: 0, .. })
        ));
        assert!(matches!(
            parse_formula("!"),
            Err(ParseError::EmptyOperand { .. })
        ));
        assert!(matches!(
            parse_formula("()"),
            Err(ParseError::EmptyOperand { .. })
        ));
        assert_eq!(
            parse_formula("(A^B"),
            Err(ParseError::UnbalancedParens {
                fragment: "(A^B".to_string(),
                offset: 0
            })
        );
        assert_eq!(
            parse_formula("A)"),
            Err(ParseError::UnbalancedParens {
                fragment: "A)".to_string(),
                offset: 1
            })
        );
        assert_eq!(
            parse_formula("AB"),
            Err(ParseError::UnexpectedToken {
                fragment: "AB".to_string(),
                offset: 0
            })
        );
        assert!(matches!(
            parse_formula("Ä"),
            Err(ParseError::NonAscii(_))
        ));
        assert!(matches!(
            parse("A", 0, 3),
            Err(ParseError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_parse_display_round_trip() {
        for text in ["(A=>B)^A^!B", "A<=>B", "!(Av!(B^C))", "((AvB)vC)^D"] {
            let e = parse_formula(text).unwrap();
            assert_eq!(parse_formula(&e.to_string()).unwrap(), e, "{text}");
        }
    }
}
