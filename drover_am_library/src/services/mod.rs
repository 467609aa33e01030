pub mod blacklist;
pub mod containers;
pub mod executors;
pub mod roles;
pub mod schedule;
