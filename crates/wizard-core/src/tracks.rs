//! Release tracks: coarse version families selecting the active modules

use crate::error::WizardError;
use std::fmt;

/// A version family and the modules it configures, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub modules: &'static [&'static str],
}

impl Track {
    pub fn has_module(&self, module: &str) -> bool {
        self.modules.contains(&module)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Map a chart version to its track id from the major component:
/// 1 and 2 map to `2.x`, 3 to `3.x`, anything higher to `{major}.x`.
/// Absent, unparseable or zero majors resolve to nothing.
pub fn resolve_track_id(chart_version: Option<&str>) -> Option<String> {
    let major: u64 = chart_version?.trim().split('.').next()?.trim().parse().ok()?;
    match major {
        0 => None,
        1 | 2 => Some("2.x".to_string()),
        3 => Some("3.x".to_string()),
        n => Some(format!("{}.x", n)),
    }
}

/// Look up a track by id
pub fn find_track<'t>(tracks: &'t [Track], id: &str) -> Option<&'t Track> {
    tracks.iter().find(|t| t.id == id)
}

/// Track for `chart_version`, or `None` when the version does not resolve
/// (the caller must then ask the operator). A version that resolves to a
/// track outside the catalog is an error.
pub fn track_for_version<'t>(tracks: &'t [Track], chart_version: &str) -> Result<Option<&'t Track>, WizardError> {
    let Some(id) = resolve_track_id(Some(chart_version)) else {
        tracing::debug!(chart_version, "chart version does not resolve to a track");
        return Ok(None);
    };
    match find_track(tracks, &id) {
        Some(track) => Ok(Some(track)),
        None => Err(WizardError::UnsupportedTrack {
            version: chart_version.to_string(),
            track: id,
            available: tracks.iter().map(|t| t.id).collect::<Vec<_>>().join(", "),
        }),
    }
}

/// Track named explicitly by the operator (`--track`)
pub fn track_by_id<'t>(tracks: &'t [Track], id: &str) -> Result<&'t Track, WizardError> {
    find_track(tracks, id).ok_or_else(|| WizardError::UnknownTrack(id.to_string()))
}
