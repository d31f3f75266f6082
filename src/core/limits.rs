/*!
 * Allocator Limits and Constants
 *
 * Centralized location for the allocator's limits, thresholds, and magic numbers.
 */

// =============================================================================
// HEADER POOL
// =============================================================================

/// Number of block headers in a pool unless configured otherwise
pub const DEFAULT_HEADER_POOL_CAPACITY: usize = 128;

/// Upper bound accepted by configuration
pub const MAX_HEADER_POOL_CAPACITY: usize = u16::MAX as usize;

/// Bytes a block header occupies inside the arena.
/// Headers are kept in the pool, never in the arena itself.
pub const BLOCK_HEADER_OVERHEAD: usize = 0;

// =============================================================================
// MEMORY PRESSURE
// =============================================================================

/// Usage ratio at which pressure is reported as medium
pub const MEDIUM_PRESSURE_THRESHOLD: f64 = 0.60;

/// Usage ratio at which pressure is reported as high
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Usage ratio at which pressure is reported as critical
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Bytes rendered per hexdump line
pub const HEXDUMP_BYTES_PER_LINE: usize = 16;
