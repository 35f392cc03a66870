// Check-in coordinator: validates a booking, prices the baggage and records the check-in
// against the passenger's flight.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    error::CheckInError,
    fees::{self, Baggage, FeeAssessment},
    flight::FlightCatalog,
    passenger::{CheckInStatus, PassengerRegistry},
    report::ReportSink,
};

#[derive(Clone)]
pub struct CheckInCoordinator {
    catalog: Arc<FlightCatalog>,
    registry: Arc<PassengerRegistry>,
    sink: Option<Arc<dyn ReportSink>>,
}

impl CheckInCoordinator {
    pub fn new(catalog: Arc<FlightCatalog>, registry: Arc<PassengerRegistry>) -> Self {
        Self {
            catalog,
            registry,
            sink: None,
        }
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn catalog(&self) -> &Arc<FlightCatalog> {
        &self.catalog
    }

    pub fn registry(&self) -> &Arc<PassengerRegistry> {
        &self.registry
    }

    // Returns whether `last_name` matches the pending passenger's last name exactly.
    //
    // Fails with `AlreadyCheckedIn` for a checked-in reference and with
    // `UnknownReference` for one that is not on record. Never mutates state.
    pub fn check_details(&self, booking_ref: &str, last_name: &str) -> Result<bool, CheckInError> {
        let (passenger, status) = self.registry.lookup(booking_ref)?;

        match status {
            CheckInStatus::CheckedIn => Err(CheckInError::AlreadyCheckedIn(
                passenger.booking_ref().to_string(),
            )),
            CheckInStatus::Pending => Ok(passenger.last_name() == last_name),
        }
    }

    // Checks the passenger in and returns the excess baggage fee due.
    pub fn process_passenger(
        &self,
        booking_ref: &str,
        dimensions: [f64; 3],
        weight: f64,
    ) -> Result<f64, CheckInError> {
        self.process_baggage(booking_ref, &Baggage::new(dimensions, weight))
            .map(|assessment| assessment.fee)
    }

    // Prices the baggage and moves the passenger to checked-in as one step.
    //
    // The flight's totals only change if the transition succeeds; a lost race
    // or an unknown reference comes back as `CheckInFailed` with nothing recorded.
    pub fn process_baggage(
        &self,
        booking_ref: &str,
        baggage: &Baggage,
    ) -> Result<FeeAssessment, CheckInError> {
        let (passenger, assessment) = self
            .registry
            .check_in_with(booking_ref, |passenger| {
                let flight = passenger.flight();
                let assessment = fees::assess(baggage, flight.limits());
                flight.add_passenger_and_baggage(
                    assessment.volume,
                    assessment.weight,
                    assessment.fee,
                );
                assessment
            })
            .map_err(|e| CheckInError::CheckInFailed {
                reference: booking_ref.to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            booking_ref = %passenger.booking_ref(),
            flight = passenger.flight().code(),
            fee = assessment.fee,
            "baggage processed"
        );

        Ok(assessment)
    }

    pub fn num_to_check_in(&self) -> usize {
        self.registry.num_pending()
    }

    // Builds the per-flight report, one block per flight separated by a blank line,
    // and hands it to the report sink if one is attached.
    pub fn generate_report(&self) -> String {
        let report = self
            .catalog
            .all()
            .iter()
            .map(|flight| flight.generate_report())
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(sink) = &self.sink {
            match sink.write_report(&report) {
                Ok(()) => info!(flights = self.catalog.len(), "report written"),
                Err(e) => warn!(error = %e, "failed to persist report"),
            }
        }

        report
    }
}
