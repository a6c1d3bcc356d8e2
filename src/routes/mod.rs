//! Route modules for Strata Server

pub mod analyze;
pub mod documents;
pub mod health;
