//! Airports and airlines supported by the prediction service.

use serde::Serialize;

const SEARCH_LIMIT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub timezone: &'static str,
    /// Historical share of delayed departures, 0..=1.
    pub delay_rate: f64,
    pub is_hub: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirlineInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub delay_rate: f64,
}

macro_rules! airport {
    ($code:literal, $name:literal, $city:literal, $tz:literal, $rate:literal, $hub:literal) => {
        AirportInfo {
            code: $code,
            name: $name,
            city: $city,
            timezone: $tz,
            delay_rate: $rate,
            is_hub: $hub,
        }
    };
}

pub const AIRPORTS: &[AirportInfo] = &[
    airport!("ATL", "Hartsfield-Jackson Atlanta International", "Atlanta", "America/New_York", 0.21, true),
    airport!("AUS", "Austin-Bergstrom International", "Austin", "America/Chicago", 0.19, false),
    airport!("BNA", "Nashville International", "Nashville", "America/Chicago", 0.20, false),
    airport!("BOS", "Logan International", "Boston", "America/New_York", 0.23, true),
    airport!("BWI", "Baltimore/Washington International", "Baltimore", "America/New_York", 0.20, false),
    airport!("CLT", "Charlotte Douglas International", "Charlotte", "America/New_York", 0.21, true),
    airport!("DCA", "Ronald Reagan Washington National", "Washington D.C.", "America/New_York", 0.22, false),
    airport!("DEN", "Denver International", "Denver", "America/Denver", 0.22, true),
    airport!("DFW", "Dallas/Fort Worth International", "Dallas", "America/Chicago", 0.20, true),
    airport!("DTW", "Detroit Metropolitan Wayne County", "Detroit", "America/Detroit", 0.20, true),
    airport!("EWR", "Newark Liberty International", "Newark", "America/New_York", 0.27, true),
    airport!("FLL", "Fort Lauderdale-Hollywood International", "Fort Lauderdale", "America/New_York", 0.21, false),
    airport!("IAH", "George Bush Intercontinental", "Houston", "America/Chicago", 0.21, true),
    airport!("JFK", "John F. Kennedy International", "New York", "America/New_York", 0.26, true),
    airport!("LAS", "Harry Reid International", "Las Vegas", "America/Los_Angeles", 0.19, true),
    airport!("LAX", "Los Angeles International", "Los Angeles", "America/Los_Angeles", 0.19, true),
    airport!("LGA", "LaGuardia Airport", "New York", "America/New_York", 0.26, true),
    airport!("MCO", "Orlando International", "Orlando", "America/New_York", 0.20, true),
    airport!("MDW", "Chicago Midway International", "Chicago", "America/Chicago", 0.22, false),
    airport!("MIA", "Miami International", "Miami", "America/New_York", 0.21, true),
    airport!("MSP", "Minneapolis-Saint Paul International", "Minneapolis", "America/Chicago", 0.21, true),
    airport!("ORD", "O'Hare International", "Chicago", "America/Chicago", 0.25, true),
    airport!("PDX", "Portland International", "Portland", "America/Los_Angeles", 0.19, false),
    airport!("PHL", "Philadelphia International", "Philadelphia", "America/New_York", 0.24, true),
    airport!("PHX", "Phoenix Sky Harbor International", "Phoenix", "America/Phoenix", 0.18, true),
    airport!("SAN", "San Diego International", "San Diego", "America/Los_Angeles", 0.17, false),
    airport!("SEA", "Seattle-Tacoma International", "Seattle", "America/Los_Angeles", 0.20, true),
    airport!("SFO", "San Francisco International", "San Francisco", "America/Los_Angeles", 0.24, true),
    airport!("SLC", "Salt Lake City International", "Salt Lake City", "America/Denver", 0.18, false),
    airport!("TPA", "Tampa International", "Tampa", "America/New_York", 0.19, false),
];

pub const AIRLINES: &[AirlineInfo] = &[
    AirlineInfo { code: "AA", name: "American Airlines", delay_rate: 0.21 },
    AirlineInfo { code: "AS", name: "Alaska Airlines", delay_rate: 0.17 },
    AirlineInfo { code: "B6", name: "JetBlue Airways", delay_rate: 0.24 },
    AirlineInfo { code: "DL", name: "Delta Air Lines", delay_rate: 0.18 },
    AirlineInfo { code: "F9", name: "Frontier Airlines", delay_rate: 0.27 },
    AirlineInfo { code: "G4", name: "Allegiant Air", delay_rate: 0.26 },
    AirlineInfo { code: "HA", name: "Hawaiian Airlines", delay_rate: 0.16 },
    AirlineInfo { code: "NK", name: "Spirit Airlines", delay_rate: 0.28 },
    AirlineInfo { code: "SY", name: "Sun Country Airlines", delay_rate: 0.25 },
    AirlineInfo { code: "UA", name: "United Airlines", delay_rate: 0.22 },
    AirlineInfo { code: "WN", name: "Southwest Airlines", delay_rate: 0.23 },
];

/// Well-known routes offered as search shortcuts.
pub const POPULAR_ROUTES: &[(&str, &str)] = &[
    ("JFK", "LAX"),
    ("SFO", "JFK"),
    ("ORD", "ATL"),
    ("LAX", "ORD"),
    ("DFW", "LAX"),
    ("ATL", "MIA"),
    ("BOS", "DCA"),
    ("SEA", "SFO"),
    ("DEN", "PHX"),
    ("EWR", "ATL"),
];

/// Matches on code prefix, or city/name substring, case-insensitively.
pub fn search_airports(query: &str) -> Vec<&'static AirportInfo> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    AIRPORTS
        .iter()
        .filter(|a| {
            a.code.to_lowercase().starts_with(&q)
                || a.city.to_lowercase().contains(&q)
                || a.name.to_lowercase().contains(&q)
        })
        .take(SEARCH_LIMIT)
        .collect()
}

pub fn search_airlines(query: &str) -> Vec<&'static AirlineInfo> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return Vec::new();
    }

    AIRLINES
        .iter()
        .filter(|a| a.code.to_lowercase().starts_with(&q) || a.name.to_lowercase().contains(&q))
        .take(SEARCH_LIMIT)
        .collect()
}

pub fn airport(code: &str) -> Option<&'static AirportInfo> {
    let code = code.trim();
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

pub fn airline(code: &str) -> Option<&'static AirlineInfo> {
    let code = code.trim();
    AIRLINES.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_nothing() {
        assert!(search_airports("   ").is_empty());
        assert!(search_airlines("").is_empty());
    }

    #[test]
    fn airport_search_matches_code_city_and_name() {
        let codes: Vec<_> = search_airports("new york").iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["JFK", "LGA"]);

        let codes: Vec<_> = search_airports("san f").iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["SFO"]);

        let codes: Vec<_> = search_airports("midway").iter().map(|a| a.code).collect();
        assert_eq!(codes, vec!["MDW"]);
    }

    #[test]
    fn search_is_capped() {
        // "International" appears in most airport names.
        assert_eq!(search_airports("international").len(), SEARCH_LIMIT);
    }

    #[test]
    fn lookups_ignore_case() {
        assert_eq!(airport("ord").map(|a| a.city), Some("Chicago"));
        assert_eq!(airline("b6").map(|a| a.name), Some("JetBlue Airways"));
        assert!(airline("ZZ").is_none());
    }

    #[test]
    fn popular_routes_use_listed_airports() {
        for (from, to) in POPULAR_ROUTES {
            assert!(airport(from).is_some(), "{from} missing");
            assert!(airport(to).is_some(), "{to} missing");
        }
    }
}
