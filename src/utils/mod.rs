pub mod csv_io;
pub mod error;
pub mod logger;
pub mod monitor;
pub mod notice;
pub mod validation;
