use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Modification time of `path`, or `None` when the file cannot be stat'ed.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Newest modification time among the paths that exist.
pub fn latest_timestamp<I, P>(paths: I) -> Option<SystemTime>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .filter_map(|path| modified_time(path.as_ref()))
        .max()
}

/// Oldest modification time among the paths that exist.
pub fn earliest_timestamp<I, P>(paths: I) -> Option<SystemTime>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .filter_map(|path| modified_time(path.as_ref()))
        .min()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Staleness {
    pub latest_input: Option<SystemTime>,
    pub earliest_output: Option<SystemTime>,
}

impl Staleness {
    pub fn measure<I, O, P, Q>(inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = P>,
        O: IntoIterator<Item = Q>,
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        Self {
            latest_input: latest_timestamp(inputs),
            earliest_output: earliest_timestamp(outputs),
        }
    }

    /// Missing outputs always require a rebuild. Missing inputs never do on
    /// their own.
    pub fn requires_execution(&self) -> bool {
        match (self.latest_input, self.earliest_output) {
            (_, None) => true,
            (Some(input), Some(output)) => input > output,
            (None, Some(_)) => false,
        }
    }
}

pub fn render_timestamp(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn touch(path: &Path, time: SystemTime) {
        fs::write(path, "x").expect("write");
        fs::File::options()
            .write(true)
            .open(path)
            .and_then(|file| file.set_modified(time))
            .expect("set mtime");
    }

    #[test]
    fn missing_paths_are_ignored_by_both_bounds() {
        let dir = tempdir().expect("tempdir");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        touch(&a, base);
        touch(&b, base + Duration::from_secs(10));
        let missing = dir.path().join("missing");

        assert_eq!(
            latest_timestamp([&a, &b, &missing]),
            Some(base + Duration::from_secs(10))
        );
        assert_eq!(earliest_timestamp([&a, &b, &missing]), Some(base));
        assert_eq!(latest_timestamp([&missing]), None);
    }

    #[test]
    fn staleness_follows_the_boundary_rules() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(50);
        let later = t + Duration::from_secs(1);
        let cases = [
            (None, None, true),
            (Some(t), None, true),
            (None, Some(t), false),
            (Some(t), Some(t), false),
            (Some(later), Some(t), true),
            (Some(t), Some(later), false),
        ];
        for (latest_input, earliest_output, expected) in cases {
            let staleness = Staleness {
                latest_input,
                earliest_output,
            };
            assert_eq!(staleness.requires_execution(), expected, "{staleness:?}");
        }
    }

    #[test]
    fn rendered_timestamps_are_utc_rfc3339() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(render_timestamp(Some(t)), "1970-01-02T00:00:00.000Z");
        assert_eq!(render_timestamp(None), "none");
    }
}
