/// Terminal logger setup shared by binaries and long test runs.
pub mod logger;
