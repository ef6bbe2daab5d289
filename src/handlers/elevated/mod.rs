// handlers/elevated/mod.rs - Elevated handlers (superadmin only)
//
// Same middleware as the protected tier; every handler here requires an
// action only a superadmin holds.

pub mod coordinators;
pub mod schedule;
