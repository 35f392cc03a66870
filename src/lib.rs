// Concurrent airport check-in desks over a shared passenger and flight registry

pub mod config;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod fees;
pub mod flight;
pub mod passenger;
pub mod report;
pub mod simulation;

// Re-export key types for convenience
pub use config::SimulationConfig;
pub use coordinator::CheckInCoordinator;
pub use error::{CheckInError, FeedError, FeedIssue, FeedIssueKind};
pub use feed::PassengerLoadReport;
pub use fees::{Baggage, FeeAssessment};
pub use flight::{Flight, FlightCatalog, FlightLimits, FlightTotals};
pub use passenger::{BookingRef, CheckInStatus, Passenger, PassengerRegistry};
pub use report::{FileReportSink, MemoryReportSink, ReportSink};
pub use simulation::{DeskSimulation, DeskStats, SimulationSummary, WorkItem};
