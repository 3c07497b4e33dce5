use crate::model::{Coordinate, Location};

/// Built-in places a user can pick by name.
const CITIES: &[(&str, f64, f64)] = &[
    ("Milano", 45.4642, 9.1900),
    ("Roma", 41.9028, 12.4964),
    ("Napoli", 40.8518, 14.2681),
    ("Torino", 45.0703, 7.6869),
    ("Bologna", 44.4949, 11.3426),
    ("Firenze", 43.7696, 11.2558),
    ("Venezia", 45.4384, 12.3265),
    ("Palermo", 38.1157, 13.3615),
    ("Catania", 37.5079, 15.0830),
    ("Genova", 44.4056, 8.9463),
];

pub fn all() -> Vec<Location> {
    CITIES
        .iter()
        .filter_map(|(name, lat, lon)| {
            Coordinate::new(*lat, *lon).ok().map(|c| Location::new(*name, c))
        })
        .collect()
}

/// Case-insensitive substring match on the city name.
pub fn search(query: &str) -> Vec<Location> {
    let needle = query.trim().to_lowercase();
    all().into_iter().filter(|loc| loc.name.to_lowercase().contains(&needle)).collect()
}

/// Exact (case-insensitive) name match, falling back to a unique substring match.
pub fn find(name: &str) -> Option<Location> {
    let wanted = name.trim();
    if let Some(exact) = all().into_iter().find(|loc| loc.name.eq_ignore_ascii_case(wanted)) {
        return Some(exact);
    }

    let mut matches = search(wanted);
    if matches.len() == 1 { matches.pop() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_is_valid() {
        assert_eq!(all().len(), CITIES.len());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let names: Vec<_> = search("NA").into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["Napoli", "Bologna"]);
    }

    #[test]
    fn find_exact_and_unique_prefix() {
        assert_eq!(find("milano").unwrap().coordinate.latitude(), 45.4642);
        assert_eq!(find("Ven").unwrap().name, "Venezia");
        // "o" matches several cities
        assert!(find("o").is_none());
        assert!(find("Paris").is_none());
    }
}
