//! Background tasks for the auth service.
//!
//! - `revocation_sweep` - prunes revocation entries whose tokens have expired

pub mod revocation_sweep;

pub use revocation_sweep::{start_revocation_sweep, RevocationSweepConfig};
