//! Nearest-team dispatch planning

use crate::{
    DispatchRecord, DispatchStatus, ResponseError, ResponseTeam, Result, TeamKind,
    AVERAGE_SPEED_KMH, MIN_ETA_MINUTES,
};
use geo_primitives::{distance_meters, Coordinate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Minutes to cover `distance_m` at the average city speed, floored at 2
pub fn eta_minutes(distance_m: f64) -> u32 {
    let hours = distance_m / 1000.0 / AVERAGE_SPEED_KMH;
    let minutes = (hours * 60.0).round();
    // NaN casts to 0 and lands on the floor
    (minutes as u32).max(MIN_ETA_MINUTES)
}

/// Dispatch every available team to `incident_location`, nearest first.
///
/// All teams are ranked by distance (stable for ties) before availability
/// is checked; unavailable teams produce no record. Each selected team is
/// marked unavailable in place. The roster order itself is left untouched.
pub fn dispatch(incident_location: Coordinate, teams: &mut [ResponseTeam]) -> Vec<DispatchRecord> {
    let mut ranked: Vec<(usize, f64)> = teams
        .iter()
        .enumerate()
        .map(|(idx, team)| (idx, distance_meters(incident_location, team.base)))
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut records = Vec::new();

    for (idx, distance) in ranked {
        let team = &mut teams[idx];
        if !team.available {
            debug!("Skipping {} (already dispatched)", team.id);
            continue;
        }

        let eta = eta_minutes(distance);
        debug!("Dispatching {} at {:.0}m, eta {} min", team.id, distance, eta);

        records.push(DispatchRecord {
            team_id: team.id.clone(),
            team_kind: team.kind,
            eta_minutes: eta,
            status: DispatchStatus::Dispatched,
        });
        team.available = false;
    }

    info!(
        "Dispatched {} team(s) to {:.6}, {:.6}",
        records.len(),
        incident_location.latitude,
        incident_location.longitude
    );

    records
}

/// Session roster of response teams
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseRoster {
    teams: Vec<ResponseTeam>,
}

impl ResponseRoster {
    pub fn new() -> Self {
        Self { teams: Vec::new() }
    }

    pub fn from_teams(teams: Vec<ResponseTeam>) -> Self {
        Self { teams }
    }

    /// The three city units available at session start
    pub fn default_roster() -> Self {
        let units = [
            ("POLICE-001", TeamKind::Police, 28.6139, 77.209),
            ("MEDICAL-001", TeamKind::Ambulance, 28.62, 77.215),
            ("FIRE-001", TeamKind::Fire, 28.61, 77.2),
        ];

        Self {
            teams: units
                .into_iter()
                .map(|(id, kind, latitude, longitude)| {
                    ResponseTeam::new(id, kind, Coordinate { latitude, longitude })
                })
                .collect(),
        }
    }

    pub fn add(&mut self, team: ResponseTeam) -> Result<()> {
        if self.get(&team.id).is_some() {
            return Err(ResponseError::DuplicateTeam(team.id));
        }
        self.teams.push(team);
        Ok(())
    }

    pub fn dispatch(&mut self, incident_location: Coordinate) -> Vec<DispatchRecord> {
        dispatch(incident_location, &mut self.teams)
    }

    pub fn get(&self, id: &str) -> Option<&ResponseTeam> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn teams(&self) -> &[ResponseTeam] {
        &self.teams
    }

    pub fn into_teams(self) -> Vec<ResponseTeam> {
        self.teams
    }

    pub fn available_count(&self) -> usize {
        self.teams.iter().filter(|t| t.available).count()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_primitives::EARTH_RADIUS_M;

    const INCIDENT: Coordinate = Coordinate {
        latitude: 28.6139,
        longitude: 77.209,
    };

    /// Point `meters` due north of the incident
    fn north_of(meters: f64) -> Coordinate {
        INCIDENT.offset((meters / EARTH_RADIUS_M).to_degrees(), 0.0)
    }

    fn team(id: &str, kind: TeamKind, meters: f64) -> ResponseTeam {
        ResponseTeam::new(id, kind, north_of(meters))
    }

    #[test]
    fn test_eta_examples() {
        assert_eq!(eta_minutes(500.0), 2);
        assert_eq!(eta_minutes(5000.0), 8);
        assert_eq!(eta_minutes(50_000.0), 75);
    }

    #[test]
    fn test_eta_floor() {
        assert_eq!(eta_minutes(0.0), 2);
        assert_eq!(eta_minutes(1000.0), 2);
        assert_eq!(eta_minutes(f64::NAN), 2);
    }

    #[test]
    fn test_colocated_team_eta_is_two() {
        let mut teams = vec![ResponseTeam::new("P", TeamKind::Police, INCIDENT)];
        let records = dispatch(INCIDENT, &mut teams);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].eta_minutes, 2);
    }

    #[test]
    fn test_dispatch_orders_by_distance() {
        let mut teams = vec![
            team("far", TeamKind::Fire, 50_000.0),
            team("near", TeamKind::Police, 500.0),
            team("mid", TeamKind::Ambulance, 5200.0),
        ];

        let records = dispatch(INCIDENT, &mut teams);
        let ids: Vec<&str> = records.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);

        let etas: Vec<u32> = records.iter().map(|r| r.eta_minutes).collect();
        assert_eq!(etas, vec![2, 8, 75]);

        // Roster order is untouched
        assert_eq!(teams[0].id, "far");
        assert!(teams.iter().all(|t| !t.available));
    }

    #[test]
    fn test_dispatch_exhaustion() {
        let mut roster = ResponseRoster::default_roster();
        let first = roster.dispatch(INCIDENT);
        assert_eq!(first.len(), 3);
        assert_eq!(roster.available_count(), 0);

        let second = roster.dispatch(INCIDENT);
        assert!(second.is_empty());
    }

    #[test]
    fn test_unavailable_teams_skipped_without_reordering() {
        let mut teams = vec![
            team("a", TeamKind::Police, 100.0),
            team("b", TeamKind::Ambulance, 2000.0),
            team("c", TeamKind::Fire, 9000.0),
        ];
        teams[1].available = false;

        let records = dispatch(INCIDENT, &mut teams);
        let ids: Vec<&str> = records.iter().map(|r| r.team_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_equal_distances_keep_roster_order() {
        let mut teams = vec![
            ResponseTeam::new("first", TeamKind::Fire, INCIDENT),
            ResponseTeam::new("second", TeamKind::Police, INCIDENT),
        ];
        let records = dispatch(INCIDENT, &mut teams);
        assert_eq!(records[0].team_id, "first");
        assert_eq!(records[1].team_id, "second");
    }

    #[test]
    fn test_empty_roster() {
        let mut roster = ResponseRoster::new();
        assert!(roster.dispatch(INCIDENT).is_empty());
    }

    #[test]
    fn test_default_roster_nearest_is_police() {
        let mut roster = ResponseRoster::default_roster();
        let records = roster.dispatch(INCIDENT);
        assert_eq!(records[0].team_id, "POLICE-001");
        assert_eq!(records[0].team_kind, TeamKind::Police);
    }

    #[test]
    fn test_roster_rejects_duplicate_team() {
        let mut roster = ResponseRoster::default_roster();
        let err = roster
            .add(ResponseTeam::new("FIRE-001", TeamKind::Fire, INCIDENT))
            .unwrap_err();
        assert_eq!(err, ResponseError::DuplicateTeam("FIRE-001".to_string()));
        assert_eq!(roster.len(), 3);
    }
}
