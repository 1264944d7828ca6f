//! Shared contract checks for lookups and stages.

pub mod lookup_contract;
pub mod stage_contract;
