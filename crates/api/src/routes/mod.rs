//! API Routes

pub mod alerts;
