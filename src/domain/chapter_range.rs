/// Inclusive chapter range handed to the downloader as `--start`/`--end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChapterRange {
    start: i32,
    end: i32,
}

impl ChapterRange {
    /// Both bounds must be present and non-zero, otherwise the downloader
    /// fetches every chapter.
    pub fn from_bounds(start: Option<i32>, end: Option<i32>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) if start != 0 && end != 0 => Some(Self { start, end }),
            _ => None,
        }
    }

    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn end(&self) -> i32 {
        self.end
    }
}
