//! Snapshot comparison

use similar::{Algorithm, capture_diff_slices, get_diff_ratio};

/// Whether a method's code differs between two commits.
///
/// `None` means the method did not exist.
pub fn code_changed(old: Option<&[String]>, new: Option<&[String]>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(old), Some(new)) => old.len() != new.len() || old.iter().zip(new).any(|(a, b)| a != b),
    }
}

/// Line-level similarity in `[0.0, 1.0]`, `0.0` when either side is absent
pub fn line_similarity(old: Option<&[String]>, new: Option<&[String]>) -> f64 {
    match (old, new) {
        (Some(old), Some(new)) => {
            if !code_changed(Some(old), Some(new)) {
                return 1.0;
            }
            let ops = capture_diff_slices(Algorithm::Myers, old, new);
            f64::from(get_diff_ratio(&ops, old.len(), new.len())).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absence_cases() {
        let a = lines(&["int f() {", "}"]);
        assert!(!code_changed(None, None));
        assert!(code_changed(None, Some(&a)));
        assert!(code_changed(Some(&a), None));
    }

    #[test]
    fn test_same_and_different_bodies() {
        let a = lines(&["int f() {", "  return 1;", "}"]);
        let b = lines(&["int f() {", "  return 2;", "}"]);
        let shorter = lines(&["int f() {", "}"]);
        assert!(!code_changed(Some(&a), Some(&a.clone())));
        assert!(code_changed(Some(&a), Some(&b)));
        assert!(code_changed(Some(&a), Some(&shorter)));
    }

    #[test]
    fn test_similarity_bounds() {
        let a = lines(&["int f() {", "  return 1;", "}"]);
        let b = lines(&["int f() {", "  return 2;", "}"]);
        let c = lines(&["x", "y"]);
        assert_eq!(line_similarity(Some(&a), Some(&a)), 1.0);
        assert_eq!(line_similarity(None, Some(&a)), 0.0);
        assert_eq!(line_similarity(Some(&a), None), 0.0);
        let partial = line_similarity(Some(&a), Some(&b));
        assert!(partial > 0.0 && partial < 1.0, "{}", partial);
        assert_eq!(line_similarity(Some(&a), Some(&c)), 0.0);
    }
}
