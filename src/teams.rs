use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{InsightsError, InsightsResult};

const FRANCHISE_HOME_CITIES: &[(&str, &str)] = &[
    ("Royal Challengers Bangalore", "Bangalore"),
    ("Punjab Kings", "Chandigarh"),
    ("Delhi Capitals", "Delhi"),
    ("Mumbai Indians", "Mumbai"),
    ("Kolkata Knight Riders", "Kolkata"),
    ("Rajasthan Royals", "Jaipur"),
    ("Deccan Chargers", "Hyderabad"),
    ("Chennai Super Kings", "Chennai"),
    ("Kochi Tuskers Kerala", "Kochi"),
    ("Pune Warriors", "Pune"),
    ("Sunrisers Hyderabad", "Hyderabad"),
    ("Gujarat Lions", "Rajkot"),
    ("Rising Pune Supergiants", "Pune"),
    ("Lucknow Super Giants", "Lucknow"),
    ("Gujarat Titans", "Ahmedabad"),
];

/// Historical franchise names folded into their current name.
const FRANCHISE_RENAMES: &[(&str, &str)] = &[
    ("Royal Challengers Bengaluru", "Royal Challengers Bangalore"),
    ("Kings XI Punjab", "Punjab Kings"),
    ("Rising Pune Supergiant", "Rising Pune Supergiants"),
    ("Delhi Daredevils", "Delhi Capitals"),
];

static HOME_CITIES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| FRANCHISE_HOME_CITIES.iter().copied().collect());

pub fn home_city(team: &str) -> InsightsResult<&'static str> {
    HOME_CITIES
        .get(team)
        .copied()
        .ok_or_else(|| InsightsError::UnknownHomeCity(team.to_string()))
}

pub fn canonical_team_name(raw: &str) -> String {
    let trimmed = raw.trim();
    FRANCHISE_RENAMES
        .iter()
        .find(|(old, _)| *old == trimmed)
        .map(|(_, new)| (*new).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
