// Library module for hashcompare
// Re-exports modules for use in integration tests and the command line front end

pub mod config;
pub mod hash;
