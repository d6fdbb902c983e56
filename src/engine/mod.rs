//! Simulation engine: the world registry and its tick loop.
//!
//! [`Simulation`] owns every unit record, the clock and the seeded damage
//! stream. Hosts drive it with explicit `tick(dt)` calls, either directly
//! or through [`SimulationPlugin`] inside a bevy `App`, and read results back
//! through queries and drained [`SimEvent`]s.

pub mod config;
pub mod events;
pub mod plugin;
pub mod replay;
pub mod simulation;
pub mod spatial;

pub use config::SimConfig;
pub use events::{EventQueue, SimEvent};
pub use plugin::{SimEventMessage, SimulationPlugin, SimulationResource};
pub use replay::{Replay, ReplayEntry, ReplayInput};
pub use simulation::{SimClock, Simulation};
pub use spatial::{Snapshot, UnitView};

/// First eight bytes of a SHA3 digest as a little-endian integer
pub(crate) fn digest_to_u64(digest: &[u8]) -> u64 {
    let mut bytes = [0u8; 8];
    let len = digest.len().min(8);
    bytes[..len].copy_from_slice(&digest[..len]);
    u64::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha3::{Digest, Sha3_256};

    #[test]
    fn test_digest_to_u64_uses_leading_bytes() {
        let digest = Sha3_256::digest(b"skirmish");
        let value = digest_to_u64(&digest);
        assert_eq!(value.to_le_bytes(), digest[..8]);
        assert_eq!(digest_to_u64(&[1]), 1);
    }
}
