pub mod audit;
pub mod directory;
pub mod inactive;
pub mod snapshot;
pub mod ticket;
