//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **firebase**: identity toolkit and realtime database over REST
//! - **device**: the on-device reminder list and the local alarm scheduler
//! - **memory**: in-process stand-ins used offline and in tests
//!
//! Adapters translate between domain types and wire or storage formats.
//! They contain no business logic.

pub mod device;
pub mod firebase;
pub mod memory;
