use log::info;

/// Track progress of a tournament sync run
pub struct SyncProgress {
    total: usize,
    imported: usize,
    skipped: usize,
    failed: usize,
}

impl SyncProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            imported: 0,
            skipped: 0,
            failed: 0,
        }
    }

    pub fn increment_imported(&mut self) {
        self.imported += 1;
        self.log_progress();
    }

    pub fn increment_skipped(&mut self) {
        self.skipped += 1;
        self.log_progress();
    }

    pub fn increment_failed(&mut self) {
        self.failed += 1;
        self.log_progress();
    }

    pub fn current_count(&self) -> usize {
        self.imported + self.skipped + self.failed
    }

    fn log_progress(&self) {
        let current = self.current_count();
        if should_log(current, self.total) {
            info!(
                "  → Progress: {}/{} ({} imported, {} already complete, {} failed)",
                current, self.total, self.imported, self.skipped, self.failed
            );
        }
    }
}

fn should_log(current: usize, total: usize) -> bool {
    is_milestone(current) || is_complete(current, total)
}

fn is_milestone(count: usize) -> bool {
    count % 10 == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_outcome() {
        let mut progress = SyncProgress::new(3);
        progress.increment_imported();
        progress.increment_skipped();
        progress.increment_failed();
        assert_eq!(progress.current_count(), 3);
    }

    #[test]
    fn test_log_milestones() {
        assert!(should_log(10, 25));
        assert!(should_log(25, 25));
        assert!(!should_log(7, 25));
    }
}
