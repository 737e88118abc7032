pub mod branch;
pub mod change;
pub mod pull_request;
pub mod ticket;
