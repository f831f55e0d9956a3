//! # Synchronizer configuration.
//!
//! Provides [`Config`], the settings fixed at construction time.
//!
//! ## Clamping
//! - `streams = 0` → 1
//! - `capacity`: into `1..=Config::MAX_CAPACITY`
//! - `bus_capacity`: into `1..=Config::MAX_BUS_CAPACITY`
//!
//! The sink and subscribers are not part of `Config`; they are attached through
//! [`SynchronizerBuilder`](crate::SynchronizerBuilder).

use crate::events::Bus;

/// Configuration for a [`Synchronizer`](crate::Synchronizer).
///
/// ## Field semantics
/// - `streams`: number of streams `N`; every round holds one item per stream
/// - `capacity`: per-stream queue size; a full queue rejects `produce` immediately
/// - `bus_capacity`: event bus ring buffer size
///
/// ## Notes
/// All fields are public for flexibility. Prefer the clamping accessors over
/// reading the fields directly.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of streams interleaved per round.
    pub streams: usize,

    /// Maximum number of messages buffered per stream.
    ///
    /// Immutable once the synchronizer is built.
    pub capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,
}

impl Config {
    /// Largest per-stream capacity a tokio bounded channel accepts.
    pub const MAX_CAPACITY: usize = usize::MAX >> 3;

    /// Largest event bus capacity; the broadcast ring buffer is allocated up front.
    pub const MAX_BUS_CAPACITY: usize = Bus::MAX_CAPACITY;

    /// Creates a config for `streams` streams with default capacities.
    pub fn with_streams(streams: usize) -> Self {
        Self {
            streams,
            ..Self::default()
        }
    }

    /// Returns the stream count clamped to a minimum of 1.
    #[inline]
    pub fn streams_clamped(&self) -> usize {
        self.streams.max(1)
    }

    /// Returns the per-stream capacity clamped into `1..=MAX_CAPACITY`.
    #[inline]
    pub fn capacity_clamped(&self) -> usize {
        self.capacity.clamp(1, Self::MAX_CAPACITY)
    }

    /// Returns a bus capacity clamped into `1..=MAX_BUS_CAPACITY`.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.clamp(1, Self::MAX_BUS_CAPACITY)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `streams = 3`
    /// - `capacity = 512`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            streams: 3,
            capacity: 512,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.streams, 3);
        assert_eq!(cfg.capacity, 512);
        assert_eq!(cfg.bus_capacity, 1024);
    }

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = Config {
            streams: 0,
            capacity: 0,
            bus_capacity: 0,
        };
        assert_eq!(cfg.streams_clamped(), 1);
        assert_eq!(cfg.capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_oversized_capacities_are_clamped() {
        let cfg = Config {
            streams: 2,
            capacity: usize::MAX,
            bus_capacity: usize::MAX,
        };
        assert_eq!(cfg.capacity_clamped(), Config::MAX_CAPACITY);
        assert_eq!(cfg.bus_capacity_clamped(), Config::MAX_BUS_CAPACITY);

        let cfg = Config::default();
        assert_eq!(cfg.capacity_clamped(), 512);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn test_with_streams_keeps_default_capacity() {
        let cfg = Config::with_streams(5);
        assert_eq!(cfg.streams, 5);
        assert_eq!(cfg.capacity, 512);
    }
}
