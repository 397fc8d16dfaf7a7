pub mod agents;
pub mod comms;
pub mod memory;
