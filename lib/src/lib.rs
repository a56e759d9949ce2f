// lib/src/lib.rs
//
// Core of the hostel backend: the persistence gateway and its backends, the
// occupancy manager, the billing/stats aggregator, and reminder text
// generation. Everything here is UI-free and exercised directly by the REST
// layer and the test suite.

pub mod gateway;
pub mod occupancy;
pub mod reminders;
pub mod stats;

pub use gateway::{HostelGateway, MemoryGateway, SledGateway};
pub use occupancy::OccupancyManager;
pub use reminders::{HttpTextGenerator, TextGenerator};
pub use stats::compute_stats;
