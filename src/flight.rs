// Flights and the catalog that owns them.
// A flight's limits are fixed at load time; its running totals sit behind one lock
// so every check-in lands as a single indivisible update.

use std::{cmp::Ordering, collections::HashMap, fmt::Write as _, sync::Arc};

use parking_lot::RwLock;

use crate::error::{CheckInError, FeedError};

// Per-flight limits, read-only for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightLimits {
    pub passenger_capacity: u32,
    pub max_baggage_volume: f64,
    pub max_baggage_weight: f64,
    pub fee_multiplier: f64,
}

impl FlightLimits {
    // Checks capacity is positive and the remaining limits are non-negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.passenger_capacity == 0 {
            return Err("passenger capacity must be greater than zero".to_string());
        }
        if !(self.max_baggage_volume >= 0.0) {
            return Err(format!("invalid max baggage volume {}", self.max_baggage_volume));
        }
        if !(self.max_baggage_weight >= 0.0) {
            return Err(format!("invalid max baggage weight {}", self.max_baggage_weight));
        }
        if !(self.fee_multiplier >= 0.0) {
            return Err(format!("invalid fee multiplier {}", self.fee_multiplier));
        }
        Ok(())
    }
}

// Running totals for one flight. Only ever grow during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightTotals {
    pub passengers: u32,
    pub baggage_volume: f64,
    pub baggage_weight: f64,
    pub fees: f64,
}

impl FlightTotals {
    pub fn exceeds(&self, limits: &FlightLimits) -> bool {
        self.passengers > limits.passenger_capacity
            || self.baggage_volume > limits.max_baggage_volume
            || self.baggage_weight > limits.max_baggage_weight
    }
}

#[derive(Debug)]
pub struct Flight {
    code: String,
    destination: String,
    carrier: String,
    limits: FlightLimits,
    totals: RwLock<FlightTotals>,
}

impl Flight {
    pub fn new(code: &str, destination: &str, carrier: &str, limits: FlightLimits) -> Self {
        Self {
            code: code.to_string(),
            destination: destination.to_string(),
            carrier: carrier.to_string(),
            limits,
            totals: RwLock::new(FlightTotals::default()),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    pub fn limits(&self) -> &FlightLimits {
        &self.limits
    }

    // Adds one passenger and their baggage to the running totals.
    //
    // All four fields change under a single write guard, so readers never
    // see the headcount of a call without its weight, volume and fee.
    pub fn add_passenger_and_baggage(&self, volume: f64, weight: f64, fee: f64) {
        let mut totals = self.totals.write();
        totals.passengers += 1;
        totals.baggage_volume += volume;
        totals.baggage_weight += weight;
        totals.fees += fee;
    }

    // Consistent copy of the running totals.
    pub fn totals(&self) -> FlightTotals {
        *self.totals.read()
    }

    // Capacity check is derived from a snapshot, never stored
    pub fn is_exceeded(&self) -> bool {
        self.totals().exceeds(&self.limits)
    }

    pub fn generate_report(&self) -> String {
        let totals = self.totals();
        let exceeded = if totals.exceeds(&self.limits) { "yes" } else { "no" };

        let mut report = String::new();
        // Writing into a String cannot fail
        let _ = writeln!(report, "Flight code: {}", self.code);
        let _ = writeln!(report, "Number of Passengers: {}", totals.passengers);
        let _ = writeln!(report, "Total Baggage Weight: {:.2}", totals.baggage_weight);
        let _ = writeln!(report, "Total Baggage Volume: {:.2}", totals.baggage_volume);
        let _ = writeln!(report, "Total Excess Fees: {:.2}", totals.fees);
        let _ = writeln!(report, "Exceeded: {}", exceeded);
        report
    }
}

// Flight codes compare case-insensitively
impl PartialEq for Flight {
    fn eq(&self, other: &Self) -> bool {
        self.code.eq_ignore_ascii_case(&other.code)
    }
}

impl Eq for Flight {}

impl PartialOrd for Flight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Flight {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code
            .to_ascii_uppercase()
            .cmp(&other.code.to_ascii_uppercase())
    }
}

// Read-only after construction. Iteration follows the order flights were supplied in.
#[derive(Debug, Default)]
pub struct FlightCatalog {
    flights: Vec<Arc<Flight>>,
    index: HashMap<String, usize>,
}

impl FlightCatalog {
    pub fn new(flights: impl IntoIterator<Item = Flight>) -> Result<Self, FeedError> {
        let mut catalog = Self::default();

        for flight in flights {
            let key = flight.code.to_ascii_uppercase();
            if catalog.index.contains_key(&key) {
                return Err(FeedError::DuplicateFlight(flight.code));
            }
            if let Err(reason) = flight.limits.validate() {
                return Err(FeedError::InvalidFlight {
                    code: flight.code,
                    reason,
                });
            }
            catalog.index.insert(key, catalog.flights.len());
            catalog.flights.push(Arc::new(flight));
        }

        Ok(catalog)
    }

    pub fn get(&self, flight_code: &str) -> Result<Arc<Flight>, CheckInError> {
        self.index
            .get(&flight_code.to_ascii_uppercase())
            .map(|&i| self.flights[i].clone())
            .ok_or_else(|| CheckInError::UnknownFlight(flight_code.to_string()))
    }

    pub fn all(&self) -> &[Arc<Flight>] {
        &self.flights
    }

    pub fn codes(&self) -> Vec<&str> {
        self.flights.iter().map(|f| f.code()).collect()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
