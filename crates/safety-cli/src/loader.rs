//! Geofence and roster loading from JSON files

use crate::{LoaderError, Result};
use emergency_response::{ResponseTeam, TeamKind};
use geo_primitives::{is_valid_latitude, is_valid_longitude, Coordinate};
use geofencing::{Geofence, RiskKind};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Sanitize ID (ASCII alphanumeric, dash, underscore only)
fn sanitize_id(id: String) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .take(128)
        .collect()
}

/// Sanitized id, or the generated one when nothing usable is left
fn resolve_id(id: Option<String>, generated: impl FnOnce() -> String) -> String {
    id.map(sanitize_id)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(generated)
}

/// Sanitize name (allow more chars but still limit)
fn sanitize_name(name: String) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || " -_.,()&'".contains(*c))
        .take(256)
        .collect()
}

/// Flat `latitude`/`longitude` fields win over a nested coordinate
fn resolve_coordinate(
    latitude: Option<f64>,
    longitude: Option<f64>,
    nested: Option<Coordinate>,
) -> Option<Coordinate> {
    let (lat, lng) = match (latitude, longitude, nested) {
        (Some(lat), Some(lng), _) => (lat, lng),
        (_, _, Some(c)) => (c.latitude, c.longitude),
        _ => return None,
    };

    if is_valid_latitude(lat) && is_valid_longitude(lng) {
        Some(Coordinate {
            latitude: lat,
            longitude: lng,
        })
    } else {
        None
    }
}

/// Raw geofence from JSON
#[derive(Debug, Deserialize)]
struct RawGeofence {
    id: Option<String>,
    name: Option<String>,
    kind: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    center: Option<Coordinate>,
    radius_meters: Option<f64>,
}

/// Raw response team from JSON
#[derive(Debug, Deserialize)]
struct RawTeam {
    id: Option<String>,
    kind: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    base: Option<Coordinate>,
    available: Option<bool>,
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Load geofences from a JSON array, keeping file order
pub fn load_geofences(path: impl AsRef<Path>) -> Result<Vec<Geofence>> {
    let path = path.as_ref();
    info!("Loading geofences from {:?}", path);

    let raw = read_json(path)?;
    let entries: Vec<RawGeofence> = if let Some(list) = raw.get("geofences") {
        serde_json::from_value(list.clone())?
    } else if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        return Err(LoaderError::UnknownLayout(path.display().to_string()));
    };

    let mut fences = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for (i, entry) in entries.into_iter().enumerate() {
        let Some(center) = resolve_coordinate(entry.latitude, entry.longitude, entry.center) else {
            skipped += 1;
            continue;
        };
        let kind = match entry.kind.as_deref().map(str::parse::<RiskKind>) {
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                warn!("Skipping geofence #{}: {}", i, e);
                skipped += 1;
                continue;
            }
            None => {
                skipped += 1;
                continue;
            }
        };
        let radius = match entry.radius_meters {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let id = resolve_id(entry.id, || format!("gf-{}", i));
        if !seen.insert(id.clone()) {
            warn!("Skipping geofence #{}: duplicate id {}", i, id);
            skipped += 1;
            continue;
        }
        let name = sanitize_name(entry.name.unwrap_or_else(|| "Unnamed zone".to_string()));

        fences.push(Geofence::new(id, name, kind, center, radius));
    }

    info!(
        "Loaded {} geofences ({} skipped for missing, invalid or duplicate fields)",
        fences.len(),
        skipped
    );

    Ok(fences)
}

/// Load response teams from a JSON array or a `{"teams": [...]}` object
pub fn load_teams(path: impl AsRef<Path>) -> Result<Vec<ResponseTeam>> {
    let path = path.as_ref();
    info!("Loading response teams from {:?}", path);

    let raw = read_json(path)?;
    let entries: Vec<RawTeam> = if let Some(list) = raw.get("teams") {
        serde_json::from_value(list.clone())?
    } else if raw.is_array() {
        serde_json::from_value(raw)?
    } else {
        return Err(LoaderError::UnknownLayout(path.display().to_string()));
    };

    let mut teams = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for (i, entry) in entries.into_iter().enumerate() {
        let Some(base) = resolve_coordinate(entry.latitude, entry.longitude, entry.base) else {
            skipped += 1;
            continue;
        };
        let kind = match entry.kind.as_deref().map(str::parse::<TeamKind>) {
            Some(Ok(kind)) => kind,
            _ => {
                skipped += 1;
                continue;
            }
        };

        let id = resolve_id(entry.id, || format!("team-{}", i));
        if !seen.insert(id.clone()) {
            warn!("Skipping team #{}: duplicate id {}", i, id);
            skipped += 1;
            continue;
        }
        let mut team = ResponseTeam::new(id, kind, base);
        team.available = entry.available.unwrap_or(true);
        teams.push(team);
    }

    info!(
        "Loaded {} response teams ({} skipped for missing, invalid or duplicate fields)",
        teams.len(),
        skipped
    );

    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_geofences() {
        let file = write_temp(
            r#"[
                {"id": "gf-1", "name": "Old Market", "kind": "danger", "latitude": 28.65, "longitude": 77.23, "radius_meters": 300},
                {"id": "gf-2", "name": "No Coords", "kind": "safe", "radius_meters": 300},
                {"id": "gf-3", "name": "Bad Kind", "kind": "volcano", "latitude": 28.65, "longitude": 77.23, "radius_meters": 300},
                {"id": "gf-4", "name": "Zero Radius", "kind": "safe", "latitude": 28.65, "longitude": 77.23, "radius_meters": 0},
                {"id": "gf-5", "name": "Out of range", "kind": "safe", "latitude": 128.0, "longitude": 77.23, "radius_meters": 10}
            ]"#,
        );

        let fences = load_geofences(file.path()).unwrap();
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].id, "gf-1");
        assert_eq!(fences[0].kind, RiskKind::Danger);
    }

    #[test]
    fn test_load_geofences_nested_center() {
        let file = write_temp(
            r#"{"geofences": [
                {"id": "GF-DEMO-3", "name": "Construction Area", "kind": "danger",
                 "center": {"latitude": 28.62, "longitude": 77.21}, "radius_meters": 400.0}
            ]}"#,
        );

        let fences = load_geofences(file.path()).unwrap();
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].center.latitude, 28.62);
    }

    #[test]
    fn test_sanitizes_ids() {
        let file = write_temp(
            r#"[{"id": "gf-1'; DROP", "name": "<b>Zone</b>", "kind": "warning", "latitude": 1.0, "longitude": 2.0, "radius_meters": 50}]"#,
        );

        let fences = load_geofences(file.path()).unwrap();
        assert_eq!(fences[0].id, "gf-1DROP");
        assert_eq!(fences[0].name, "bZoneb");
    }

    #[test]
    fn test_ids_ascii_fallback_and_unique() {
        let file = write_temp(
            r#"[
                {"id": "zöne-1", "name": "A", "kind": "safe", "latitude": 1.0, "longitude": 2.0, "radius_meters": 50},
                {"id": "!!!", "name": "B", "kind": "safe", "latitude": 1.0, "longitude": 2.0, "radius_meters": 50},
                {"id": "zne-1", "name": "C", "kind": "safe", "latitude": 1.0, "longitude": 2.0, "radius_meters": 50}
            ]"#,
        );

        let fences = load_geofences(file.path()).unwrap();
        let ids: Vec<&str> = fences.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["zne-1", "gf-1"]);
        assert_eq!(fences[0].name, "A");
    }

    #[test]
    fn test_duplicate_team_ids_skipped() {
        let file = write_temp(
            r#"[
                {"id": "POLICE-001", "kind": "police", "latitude": 28.6, "longitude": 77.2},
                {"id": "POLICE-001", "kind": "medical", "latitude": 28.7, "longitude": 77.1},
                {"kind": "fire", "latitude": 28.7, "longitude": 77.1}
            ]"#,
        );

        let teams = load_teams(file.path()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].kind, TeamKind::Police);
        assert_eq!(teams[1].id, "team-2");
    }

    #[test]
    fn test_load_teams() {
        let file = write_temp(
            r#"{
                "teams": [
                    {"id": "POLICE-009", "kind": "Police", "latitude": 28.6, "longitude": 77.2},
                    {"id": "FIRE-009", "kind": "fire", "latitude": 28.7, "longitude": 77.1, "available": false},
                    {"id": "BOAT-001", "kind": "coast guard", "latitude": 28.7, "longitude": 77.1}
                ]
            }"#,
        );

        let teams = load_teams(file.path()).unwrap();
        assert_eq!(teams.len(), 2);
        assert!(teams[0].available);
        assert!(!teams[1].available);
        assert_eq!(teams[1].kind, TeamKind::Fire);
    }

    #[test]
    fn test_unknown_layout() {
        let file = write_temp(r#"{"zones": []}"#);
        assert!(matches!(
            load_geofences(file.path()),
            Err(LoaderError::UnknownLayout(_))
        ));
    }
}
