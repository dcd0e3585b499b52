//! Digit-aware string ordering
//!
//! Runs of ASCII digits compare by numeric value so that `clang-9` sorts
//! before `clang-10`.

use std::cmp::Ordering;

/// Compare two strings treating embedded digit runs as numbers.
pub fn natural_cmp(left: &str, right: &str) -> Ordering {
    let mut l = left.as_bytes();
    let mut r = right.as_bytes();

    loop {
        match (l.first(), r.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) if a.is_ascii_digit() && b.is_ascii_digit() => {
                let (ln, lrest) = split_digits(l);
                let (rn, rrest) = split_digits(r);
                let ord = compare_digit_runs(ln, rn);
                if ord != Ordering::Equal {
                    return ord;
                }
                l = lrest;
                r = rrest;
            }
            (Some(a), Some(b)) => {
                let ord = a.cmp(b);
                if ord != Ordering::Equal {
                    return ord;
                }
                l = &l[1..];
                r = &r[1..];
            }
        }
    }
}

fn split_digits(s: &[u8]) -> (&[u8], &[u8]) {
    let end = s.iter().position(|c| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn compare_digit_runs(left: &[u8], right: &[u8]) -> Ordering {
    let left = trim_leading_zeros(left);
    let right = trim_leading_zeros(right);
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

fn trim_leading_zeros(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&c| c != b'0').unwrap_or(s.len());
    &s[start..]
}
