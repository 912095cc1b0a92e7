//! Run configuration consumed by the pipeline

/// Inclusive range of commit positions, oldest commit being 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRange {
    pub from: usize,
    pub to: usize,
}

impl CommitRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Clamp the range onto a list of `len` commits
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        if self.from >= items.len() || self.to < self.from {
            return &[];
        }
        let end = self.to.min(items.len() - 1);
        &items[self.from..=end]
    }
}

/// One run of the pipeline: a label for its output and the commits it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub label: String,
    pub range: Option<CommitRange>,
}

impl RunPlan {
    /// The whole history
    pub fn full(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            range: None,
        }
    }

    pub fn range(label: impl Into<String>, from: usize, to: usize) -> Self {
        Self {
            label: label.into(),
            range: Some(CommitRange::new(from, to)),
        }
    }

    /// Paired `test<i>` / `result<i>` plans.
    ///
    /// `test<i>` stops `gap` commits before the end of window `i`, `result<i>`
    /// covers the whole window.
    pub fn windows(window_size: usize, windows: usize, gap: usize) -> Vec<(RunPlan, RunPlan)> {
        (0..windows)
            .filter_map(|i| {
                let start = window_size * i;
                let end = (window_size * (i + 1)).checked_sub(1)?;
                let test_end = end.checked_sub(gap).filter(|&t| t >= start)?;
                Some((
                    RunPlan::range(format!("test{}", i), start, test_end),
                    RunPlan::range(format!("result{}", i), start, end),
                ))
            })
            .collect()
    }

    /// Stable text describing what this plan covers, used as part of the cache key
    pub fn fingerprint(&self) -> String {
        match self.range {
            Some(r) => format!("{}..={}", r.from, r.to),
            None => "all".to_string(),
        }
    }
}

/// Settings shared by every run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Branch to walk, HEAD when `None`
    pub branch: Option<String>,
    /// Source file extensions handed to the parser
    pub extensions: Vec<String>,
    /// Length of bounded change histories
    pub history_capacity: usize,
    /// Commits with more source files are skipped
    pub max_files_per_commit: Option<usize>,
    /// Larger blobs are not read
    pub max_file_bytes: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            branch: None,
            extensions: vec!["java".to_string()],
            history_capacity: 10,
            max_files_per_commit: None,
            max_file_bytes: Some(1024 * 1024),
        }
    }
}

impl PipelineConfig {
    /// Stable text describing settings that influence feature values
    pub fn fingerprint(&self) -> String {
        format!(
            "cap={};ext={};files={:?};bytes={:?}",
            self.history_capacity,
            self.extensions.join(","),
            self.max_files_per_commit,
            self.max_file_bytes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_slice_clamps() {
        let items = [0, 1, 2, 3, 4];
        assert_eq!(CommitRange::new(1, 3).slice(&items), &[1, 2, 3]);
        assert_eq!(CommitRange::new(3, 99).slice(&items), &[3, 4]);
        assert!(CommitRange::new(7, 9).slice(&items).is_empty());
        assert!(CommitRange::new(3, 2).slice(&items).is_empty());
    }

    #[test]
    fn test_windows_follow_gap() {
        let plans = RunPlan::windows(110, 2, 10);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].0, RunPlan::range("test0", 0, 99));
        assert_eq!(plans[0].1, RunPlan::range("result0", 0, 109));
        assert_eq!(plans[1].0, RunPlan::range("test1", 110, 209));
        assert_eq!(plans[1].1, RunPlan::range("result1", 110, 219));
    }

    #[test]
    fn test_windows_smaller_than_gap_are_dropped() {
        assert!(RunPlan::windows(5, 3, 10).is_empty());
        assert!(RunPlan::windows(0, 3, 0).is_empty());
    }

    #[test]
    fn test_fingerprints_differ_by_setting() {
        let a = PipelineConfig::default();
        let b = PipelineConfig {
            history_capacity: 5,
            ..PipelineConfig::default()
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(RunPlan::full("x").fingerprint(), "all");
    }
}
