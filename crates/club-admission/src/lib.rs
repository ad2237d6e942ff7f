//! Club admission control: medical-fitness validity, member entry eligibility, daily guest
//! lists and birthday-guest quotas.

pub mod admission;
pub mod config;
pub mod error;
pub mod telemetry;
