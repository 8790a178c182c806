/// Row range `[start, end)` belonging to one person in a worksheet.
///
/// `start` is the row holding the person's name, `end` the row holding the
/// "<name> TOTAL HOURS" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
    /// The name appears again between `start` and the sentinel.
    pub has_duplicate_start: bool,
}

impl Block {
    /// Rows that may hold an entry.
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }

    /// If the sentinel doesn't come after the name row.
    ///
    /// Happens with sentinels placed above the name.
    pub fn is_crossed(&self) -> bool {
        self.end <= self.start
    }
}

/// Find the block for `name` in the labels of column 1.
///
/// Labels are compared trimmed and lowercased. The first matching name row
/// and the first matching sentinel row are used, and scanning stops once
/// both are seen. A repeated name row before the sentinel is recorded in
/// `has_duplicate_start`. The returned block may be crossed.
pub fn find_block<S: AsRef<str>>(labels: &[S], name: &str) -> Option<Block> {
    let name_lower = name.to_lowercase();
    let sentinel = format!("{name} total hours").to_lowercase();

    let mut start = None;
    let mut end = None;
    let mut has_duplicate_start = false;

    for (idx, label) in labels.iter().enumerate() {
        let row = idx + 1;
        let label = label.as_ref().trim().to_lowercase();

        if label == name_lower {
            if start.is_none() {
                start = Some(row);
            } else if end.is_none() {
                has_duplicate_start = true;
            }
        }
        if end.is_none() && label == sentinel {
            end = Some(row);
        }
        if start.is_some() && end.is_some() {
            break;
        }
    }

    Some(Block {
        start: start?,
        end: end?,
        has_duplicate_start,
    })
}

/// If a cell counts as empty. Missing cells are empty.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique(start: usize, end: usize) -> Block {
        Block {
            start,
            end,
            has_duplicate_start: false,
        }
    }

    #[test]
    fn find_simple_block() {
        let labels = ["Dev", "Brian", "", "Brian TOTAL HOURS", "Other"];
        assert_eq!(Some(unique(2, 4)), find_block(&labels, "Brian"));
    }

    #[test]
    fn find_block_case_and_whitespace() {
        let labels = ["Lead", "  brian adhitya ", "", "BRIAN ADHITYA total hours"];
        assert_eq!(Some(unique(2, 4)), find_block(&labels, "Brian Adhitya"));
    }

    #[test]
    fn find_block_missing_sentinel() {
        let labels = ["Dev", "Brian", ""];
        assert_eq!(None, find_block(&labels, "Brian"));
        assert_eq!(None, find_block(&labels, "Alice"));
    }

    #[test]
    fn find_block_name_is_not_a_prefix_match() {
        let labels = ["Dev", "Brian Adhitya", "Brian Adhitya TOTAL HOURS"];
        assert_eq!(None, find_block(&labels, "Brian"));
    }

    #[test]
    fn find_block_uses_first_occurrences() {
        let labels = [
            "Dev",
            "Brian",
            "",
            "Brian TOTAL HOURS",
            "QA",
            "Brian",
            "",
            "Brian TOTAL HOURS",
        ];
        assert_eq!(Some(unique(2, 4)), find_block(&labels, "Brian"));
    }

    #[test]
    fn find_block_flags_repeated_name_before_sentinel() {
        let labels = ["Dev", "Brian", "x", "QA", "Brian", "", "Brian TOTAL HOURS"];
        let block = find_block(&labels, "Brian").unwrap();
        assert_eq!(2, block.start);
        assert_eq!(7, block.end);
        assert!(block.has_duplicate_start);
        assert!(!block.is_crossed());
    }

    #[test]
    fn find_block_crossed() {
        let labels = ["Brian TOTAL HOURS", "Dev", "Brian", ""];
        let block = find_block(&labels, "Brian").unwrap();
        assert_eq!(unique(3, 1), block);
        assert!(block.is_crossed());
        assert_eq!(0, block.rows().len());
    }

    #[test]
    fn blank_cells() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some("  \t")));
        assert!(!is_blank(Some("0")));
    }
}
