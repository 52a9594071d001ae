//! Diancha — gesture sampling and hit testing.
//!
//! The leaves of the engine: samplers convert pointer streams into bounded
//! progress behind a completion latch, and the hit tester decides whether a
//! pointer lands on a target region.

pub mod sampler;

pub use hit_test::{FixedRegion, HitZone, LiveRegion, RegionSource, TargetBindings};
pub use sampler::{Accumulation, GestureSampler};
