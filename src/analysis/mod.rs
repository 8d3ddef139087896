pub mod dedup;
pub mod network;
pub mod report;
