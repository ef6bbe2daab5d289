// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT auth, role checked per action)
// → Elevated (superadmin actions)
//
// Handlers stay thin: extract, authorize, call into `services`, wrap the
// result in `ApiResponse`.

pub mod elevated;
pub mod protected;
pub mod public;
