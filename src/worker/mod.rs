//! Background workers

pub mod overdue;

pub use overdue::OverdueScanner;
