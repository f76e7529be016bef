//! Dotted numeric version comparison for release tags

use crate::AppError;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Empty version string")]
    Empty,

    #[error("Non-numeric version component {component:?} in {version:?}")]
    InvalidComponent { version: String, component: String },
}

impl From<VersionError> for AppError {
    fn from(e: VersionError) -> Self {
        AppError::Version(e.to_string())
    }
}

/// Strip any leading `v` from a release tag (`v1.2.3` -> `1.2.3`)
pub fn parse_version(tag: &str) -> &str {
    tag.trim_start_matches('v')
}

fn components(version: &str) -> Result<Vec<u64>, VersionError> {
    let version = version.trim();
    if version.is_empty() {
        return Err(VersionError::Empty);
    }

    version
        .split('.')
        .map(|part| {
            part.parse::<u64>().map_err(|_| VersionError::InvalidComponent {
                version: version.to_string(),
                component: part.to_string(),
            })
        })
        .collect()
}

/// Compare two dotted versions; missing trailing components count as zero
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    let left = components(a)?;
    let right = components(b)?;
    let len = left.len().max(right.len());

    let ordering = (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or(0);
            let r = right.get(i).copied().unwrap_or(0);
            l.cmp(&r)
        })
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal);

    Ok(ordering)
}

/// Is the release `remote_tag` newer than the running `current` version?
pub fn is_newer(remote_tag: &str, current: &str) -> Result<bool, VersionError> {
    Ok(compare_versions(parse_version(remote_tag), parse_version(current))? == Ordering::Greater)
}
