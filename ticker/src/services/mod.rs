pub mod display_service;
pub mod poll_service;
pub mod snapshot_service;
