// Flight and passenger source feeds.
//
// Both feeds are comma separated, one record per line:
//   flights:    code,destination,carrier,capacity,maxVolume,maxWeight,feeMultiplier
//   passengers: bookingRef,firstName,lastName,flightCode,alreadyCheckedIn
// A bad flight record aborts the load. A bad passenger record is noted and skipped.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use tracing::{info, warn};

use crate::{
    error::{CheckInError, FeedError, FeedIssue, FeedIssueKind},
    flight::{Flight, FlightCatalog, FlightLimits},
    passenger::{Passenger, PassengerRegistry},
};

const FLIGHT_FIELDS: usize = 7;
const PASSENGER_FIELDS: usize = 5;

// Outcome of a passenger feed load
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassengerLoadReport {
    pub pending: usize,
    pub checked_in: usize,
    pub issues: Vec<FeedIssue>,
}

impl PassengerLoadReport {
    pub fn loaded(&self) -> usize {
        self.pending + self.checked_in
    }

    pub fn duplicates(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter_map(|issue| match &issue.kind {
                FeedIssueKind::DuplicateReference(r) => Some(r.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn split_record(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn parse_field<T: FromStr>(value: &str, name: &str, line: usize) -> Result<T, FeedError> {
    value.parse().map_err(|_| FeedError::Malformed {
        line,
        reason: format!("invalid {name} '{value}'"),
    })
}

fn parse_flight(record: &str, line: usize) -> Result<Flight, FeedError> {
    let parts = split_record(record);
    if parts.len() != FLIGHT_FIELDS {
        return Err(FeedError::Malformed {
            line,
            reason: format!("expected {FLIGHT_FIELDS} fields, found {}", parts.len()),
        });
    }

    let limits = FlightLimits {
        passenger_capacity: parse_field(parts[3], "passenger capacity", line)?,
        max_baggage_volume: parse_field(parts[4], "max baggage volume", line)?,
        max_baggage_weight: parse_field(parts[5], "max baggage weight", line)?,
        fee_multiplier: parse_field(parts[6], "fee multiplier", line)?,
    };
    limits
        .validate()
        .map_err(|reason| FeedError::Malformed { line, reason })?;

    if parts[0].is_empty() {
        return Err(FeedError::Malformed {
            line,
            reason: "empty flight code".to_string(),
        });
    }

    Ok(Flight::new(parts[0], parts[1], parts[2], limits))
}

// Reads a flight feed into a catalog. Any malformed record or repeated flight
// code fails the whole load.
pub fn read_flights(reader: impl BufRead) -> Result<FlightCatalog, FeedError> {
    let mut flights = vec![];

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        flights.push(parse_flight(&line, i + 1)?);
    }

    let catalog = FlightCatalog::new(flights)?;
    info!(flights = catalog.len(), "flight feed loaded");
    Ok(catalog)
}

pub fn load_flights(path: impl AsRef<Path>) -> Result<FlightCatalog, FeedError> {
    read_flights(BufReader::new(File::open(path)?))
}

pub fn parse_flights(input: &str) -> Result<FlightCatalog, FeedError> {
    read_flights(input.as_bytes())
}

fn parse_passenger(
    record: &str,
    catalog: &FlightCatalog,
) -> Result<(Passenger, bool), FeedIssueKind> {
    let parts = split_record(record);
    if parts.len() != PASSENGER_FIELDS {
        return Err(FeedIssueKind::Malformed(format!(
            "expected {PASSENGER_FIELDS} fields, found {}",
            parts.len()
        )));
    }

    let checked_in = match parts[4].to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(FeedIssueKind::Malformed(format!(
                "invalid checked-in flag '{other}'"
            )))
        }
    };

    let flight = catalog
        .get(parts[3])
        .map_err(|_| FeedIssueKind::UnknownFlight(parts[3].to_string()))?;

    let passenger = Passenger::new(parts[0], parts[1], parts[2], flight)
        .map_err(|_| FeedIssueKind::InvalidReference(parts[0].to_string()))?;

    Ok((passenger, checked_in))
}

// Loads a passenger feed into `registry`, collecting every bad record instead of
// stopping at the first one. The first occurrence of a duplicated reference wins.
// Only I/O failures are fatal.
pub fn read_passengers(
    reader: impl BufRead,
    catalog: &FlightCatalog,
    registry: &PassengerRegistry,
) -> Result<PassengerLoadReport, FeedError> {
    let mut report = PassengerLoadReport::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }

        let outcome = parse_passenger(&line, catalog).and_then(|(passenger, checked_in)| {
            match registry.add(passenger, checked_in) {
                Ok(()) => Ok(checked_in),
                Err(CheckInError::DuplicateReference(r)) => {
                    Err(FeedIssueKind::DuplicateReference(r))
                }
                Err(e) => Err(FeedIssueKind::Malformed(e.to_string())),
            }
        });

        match outcome {
            Ok(true) => report.checked_in += 1,
            Ok(false) => report.pending += 1,
            Err(kind) => {
                let issue = FeedIssue {
                    line: line_no,
                    kind,
                };
                warn!(%issue, "skipping passenger record");
                report.issues.push(issue);
            }
        }
    }

    info!(
        pending = report.pending,
        checked_in = report.checked_in,
        issues = report.issues.len(),
        "passenger feed loaded"
    );
    Ok(report)
}

pub fn load_passengers(
    path: impl AsRef<Path>,
    catalog: &FlightCatalog,
    registry: &PassengerRegistry,
) -> Result<PassengerLoadReport, FeedError> {
    read_passengers(BufReader::new(File::open(path)?), catalog, registry)
}

pub fn parse_passengers(
    input: &str,
    catalog: &FlightCatalog,
    registry: &PassengerRegistry,
) -> Result<PassengerLoadReport, FeedError> {
    read_passengers(input.as_bytes(), catalog, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FLIGHTS: &str = "\
BA123,Paris,British Airways,2,2.0,40.0,10.0
AF001,Rome,Air France,180,90.5,3600,1.5
";

    #[test]
    fn test_parse_flights() {
        let catalog = parse_flights(FLIGHTS).unwrap();
        assert_eq!(catalog.codes(), vec!["BA123", "AF001"]);

        let af = catalog.get("AF001").unwrap();
        assert_eq!(af.carrier(), "Air France");
        assert_eq!(af.limits().passenger_capacity, 180);
        assert_eq!(af.limits().max_baggage_volume, 90.5);
        assert_eq!(af.limits().max_baggage_weight, 3600.0);
    }

    #[test]
    fn test_malformed_flight_is_fatal() {
        let short = parse_flights("BA123,Paris,British Airways,2,2.0,40.0\n");
        assert!(matches!(short, Err(FeedError::Malformed { line: 1, .. })));

        let bad_number = parse_flights("BA123,Paris,BA,2,2.0,40.0,10.0\nAF001,Rome,AF,many,1,1,1\n");
        assert!(matches!(bad_number, Err(FeedError::Malformed { line: 2, .. })));

        let zero_capacity = parse_flights("BA123,Paris,BA,0,2.0,40.0,10.0\n");
        assert!(matches!(zero_capacity, Err(FeedError::Malformed { .. })));

        let duplicate = parse_flights("BA123,Paris,BA,2,2,40,10\nBA123,Oslo,BA,2,2,40,10\n");
        assert!(matches!(duplicate, Err(FeedError::DuplicateFlight(_))));
    }

    #[test]
    fn test_clean_passenger_feed() {
        let catalog = parse_flights(FLIGHTS).unwrap();
        let registry = PassengerRegistry::new();
        let feed = "\
abc1234,Ada,Lovelace,BA123,false
def5678,Alan,Turing,BA123,true

ghi9012,Grace,Hopper,AF001,FALSE
jkl3456,Edsger,Dijkstra,AF001,false
mno7890,Barbara,Liskov,AF001,True
";

        let report = parse_passengers(feed, &catalog, &registry).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.loaded(), 5);
        assert_eq!(report.pending, 3);
        assert_eq!(registry.num_pending(), 3);
        assert_eq!(registry.num_checked_in(), 2);
        assert_eq!(catalog.get("AF001").unwrap().totals().passengers, 1);
    }

    #[test]
    fn test_passenger_feed_collects_issues() {
        let catalog = parse_flights(FLIGHTS).unwrap();
        let registry = PassengerRegistry::new();
        let feed = "\
abc1234,Ada,Lovelace,BA123,false
abc1234,Impostor,Lovelace,AF001,false
ABC9999,Bad,Case,BA123,false
def5678,Alan,Turing,ZZ999,false
ghi9012,Grace,Hopper
jkl3456,Edsger,Dijkstra,AF001,maybe
mno7890,Barbara,Liskov,AF001,false
";

        let report = parse_passengers(feed, &catalog, &registry).unwrap();
        assert_eq!(report.pending, 2);
        assert_eq!(report.duplicates(), vec!["abc1234"]);

        let kinds: Vec<_> = report.issues.iter().map(|i| (i.line, i.kind.clone())).collect();
        assert_eq!(kinds[0], (2, FeedIssueKind::DuplicateReference("abc1234".to_string())));
        assert_eq!(kinds[1], (3, FeedIssueKind::InvalidReference("ABC9999".to_string())));
        assert_eq!(kinds[2], (4, FeedIssueKind::UnknownFlight("ZZ999".to_string())));
        assert!(matches!(kinds[3], (5, FeedIssueKind::Malformed(_))));
        assert!(matches!(kinds[4], (6, FeedIssueKind::Malformed(_))));
        assert_eq!(
            report.issues[4].to_string(),
            "line 6: malformed record: invalid checked-in flag 'maybe'"
        );

        // first occurrence is the one kept
        let kept = registry.get("abc1234").unwrap();
        assert_eq!(kept.first_name(), "Ada");
        assert_eq!(kept.flight().code(), "BA123");
    }

    #[test]
    fn test_load_from_files() {
        let mut flights = tempfile::NamedTempFile::new().unwrap();
        flights.write_all(FLIGHTS.as_bytes()).unwrap();
        let mut passengers = tempfile::NamedTempFile::new().unwrap();
        passengers
            .write_all(b"abc1234,Ada,Lovelace,BA123,false\n")
            .unwrap();

        let catalog = load_flights(flights.path()).unwrap();
        let registry = PassengerRegistry::new();
        let report = load_passengers(passengers.path(), &catalog, &registry).unwrap();
        assert_eq!(report.pending, 1);

        assert!(matches!(
            load_flights("/definitely/not/here/flights.csv"),
            Err(FeedError::Io(_))
        ));
    }
}
