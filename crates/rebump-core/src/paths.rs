use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Data directory constants
// ---------------------------------------------------------------------------

pub const DATA_DIR: &str = ".rebump";
pub const SCHEDULE_FILE: &str = ".rebump/schedule.json";
pub const RESPONSES_FILE: &str = ".rebump/responses.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn schedule_path(root: &Path) -> PathBuf {
    root.join(SCHEDULE_FILE)
}

pub fn responses_path(root: &Path) -> PathBuf {
    root.join(RESPONSES_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            schedule_path(root),
            PathBuf::from("/tmp/proj/.rebump/schedule.json")
        );
        assert_eq!(
            responses_path(root),
            PathBuf::from("/tmp/proj/.rebump/responses.json")
        );
    }
}
