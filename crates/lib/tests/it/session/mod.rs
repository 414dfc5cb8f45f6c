//! SessionManager integration tests
//!
//! Organized by operation family:
//! - lifecycle: construction, snapshots, subscription, disposal
//! - credentials: register, login, logout
//! - rehydration: startup restore, reconciliation, refresh
//! - profile: profile updates
//! - concurrency: overlapping operations and in-flight disposal

mod concurrency;
