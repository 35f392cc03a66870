// Passengers and the registry that tracks who is still to check in.
//
// The registry keeps one entry per booking reference, tagged with the partition it
// currently belongs to. Since a reference maps to exactly one entry, it can never sit
// in both partitions. Moving an entry from pending to checked-in happens under that
// entry's shard lock, which is what makes concurrent check-ins of one reference
// produce a single winner.

use std::{
    cmp::Ordering as CmpOrdering,
    fmt,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, LazyLock,
    },
};

use dashmap::{mapref::entry::Entry, DashMap};
use regex::Regex;
use tracing::debug;

use crate::{error::CheckInError, flight::Flight};

static BOOKING_REF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3}[0-9]{4}$").expect("booking ref pattern compiles"));

// A validated booking reference: three lowercase letters followed by four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookingRef(String);

impl BookingRef {
    pub fn parse(code: &str) -> Result<Self, CheckInError> {
        if BOOKING_REF_PATTERN.is_match(code) {
            Ok(Self(code.to_string()))
        } else {
            Err(CheckInError::InvalidReferenceFormat(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Lookups are case-insensitive; stored references are always lowercase
pub fn normalize_ref(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct Passenger {
    booking_ref: BookingRef,
    first_name: String,
    last_name: String,
    flight: Arc<Flight>,
}

impl Passenger {
    pub fn new(
        booking_ref: &str,
        first_name: &str,
        last_name: &str,
        flight: Arc<Flight>,
    ) -> Result<Self, CheckInError> {
        Ok(Self {
            booking_ref: BookingRef::parse(booking_ref)?,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            flight,
        })
    }

    pub fn booking_ref(&self) -> &BookingRef {
        &self.booking_ref
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn flight(&self) -> &Arc<Flight> {
        &self.flight
    }
}

impl PartialEq for Passenger {
    fn eq(&self, other: &Self) -> bool {
        self.booking_ref
            .as_str()
            .eq_ignore_ascii_case(other.booking_ref.as_str())
    }
}

impl Eq for Passenger {}

impl PartialOrd for Passenger {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for Passenger {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        normalize_ref(self.booking_ref.as_str()).cmp(&normalize_ref(other.booking_ref.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInStatus {
    Pending,
    CheckedIn,
}

#[derive(Debug)]
struct RegistryEntry {
    passenger: Arc<Passenger>,
    status: CheckInStatus,
}

#[derive(Debug, Default)]
pub struct PassengerRegistry {
    entries: DashMap<String, RegistryEntry>,
    // Both maintained while holding the affected entry's shard lock
    pending: AtomicUsize,
    checked_in: AtomicUsize,
}

impl PassengerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Fails with `DuplicateReference` if the reference is in either partition. A
    // passenger inserted as already checked in bumps their flight's headcount.
    pub fn add(&self, passenger: Passenger, checked_in: bool) -> Result<(), CheckInError> {
        let key = normalize_ref(passenger.booking_ref.as_str());

        match self.entries.entry(key) {
            Entry::Occupied(occupied) => {
                Err(CheckInError::DuplicateReference(occupied.key().clone()))
            }
            Entry::Vacant(vacant) => {
                let passenger = Arc::new(passenger);
                if checked_in {
                    passenger.flight.add_passenger_and_baggage(0.0, 0.0, 0.0);
                    vacant.insert(RegistryEntry {
                        passenger,
                        status: CheckInStatus::CheckedIn,
                    });
                    self.checked_in.fetch_add(1, Ordering::SeqCst);
                } else {
                    vacant.insert(RegistryEntry {
                        passenger,
                        status: CheckInStatus::Pending,
                    });
                    self.pending.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
        }
    }

    pub fn get(&self, booking_ref: &str) -> Result<Arc<Passenger>, CheckInError> {
        self.lookup(booking_ref).map(|(passenger, _)| passenger)
    }

    // Passenger and partition, read together under the entry's lock
    pub fn lookup(&self, booking_ref: &str) -> Result<(Arc<Passenger>, CheckInStatus), CheckInError> {
        self.entries
            .get(&normalize_ref(booking_ref))
            .map(|entry| (entry.passenger.clone(), entry.status))
            .ok_or_else(|| CheckInError::UnknownReference(booking_ref.to_string()))
    }

    pub fn check_in(&self, booking_ref: &str) -> Result<Arc<Passenger>, CheckInError> {
        self.check_in_with(booking_ref, |_| ()).map(|(passenger, _)| passenger)
    }

    // Of any number of concurrent calls for one reference exactly one succeeds and
    // runs `on_transition`. A reference that is no longer pending is unknown here.
    pub fn check_in_with<R>(
        &self,
        booking_ref: &str,
        on_transition: impl FnOnce(&Passenger) -> R,
    ) -> Result<(Arc<Passenger>, R), CheckInError> {
        let key = normalize_ref(booking_ref);
        let mut entry = match self.entries.get_mut(&key) {
            Some(entry) if entry.status == CheckInStatus::Pending => entry,
            _ => return Err(CheckInError::UnknownReference(booking_ref.to_string())),
        };

        let outcome = on_transition(entry.passenger.as_ref());
        entry.status = CheckInStatus::CheckedIn;
        self.pending.fetch_sub(1, Ordering::SeqCst);
        self.checked_in.fetch_add(1, Ordering::SeqCst);
        debug!(booking_ref = %key, "passenger checked in");

        Ok((entry.passenger.clone(), outcome))
    }

    // Flight totals are left untouched
    pub fn remove(&self, booking_ref: &str) -> Result<Arc<Passenger>, CheckInError> {
        let key = normalize_ref(booking_ref);
        let removed = self.entries.remove_if(&key, |_, entry| {
            match entry.status {
                CheckInStatus::Pending => self.pending.fetch_sub(1, Ordering::SeqCst),
                CheckInStatus::CheckedIn => self.checked_in.fetch_sub(1, Ordering::SeqCst),
            };
            true
        });

        removed
            .map(|(_, entry)| entry.passenger)
            .ok_or_else(|| CheckInError::UnknownReference(booking_ref.to_string()))
    }

    pub fn num_pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn num_checked_in(&self) -> usize {
        self.checked_in.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending(&self) -> Vec<Arc<Passenger>> {
        self.snapshot(CheckInStatus::Pending)
    }

    pub fn checked_in(&self) -> Vec<Arc<Passenger>> {
        self.snapshot(CheckInStatus::CheckedIn)
    }

    pub fn pending_refs(&self) -> Vec<String> {
        self.refs(CheckInStatus::Pending)
    }

    pub fn checked_in_refs(&self) -> Vec<String> {
        self.refs(CheckInStatus::CheckedIn)
    }

    fn snapshot(&self, status: CheckInStatus) -> Vec<Arc<Passenger>> {
        let mut passengers: Vec<Arc<Passenger>> = self
            .entries
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.passenger.clone())
            .collect();
        passengers.sort();
        passengers
    }

    fn refs(&self, status: CheckInStatus) -> Vec<String> {
        self.snapshot(status)
            .iter()
            .map(|p| p.booking_ref.to_string())
            .collect()
    }
}
