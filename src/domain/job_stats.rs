use super::JobStatus;

/// Point-in-time job counts. `active` is queued plus downloading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub active: u64,
}

impl JobStats {
    pub fn from_statuses<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a JobStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |mut stats, status| {
                stats.total += 1;
                if status.is_active() {
                    stats.active += 1;
                } else if *status == JobStatus::Completed {
                    stats.completed += 1;
                } else {
                    stats.failed += 1;
                }
                stats
            })
    }
}
