//! Default policy constants for souschef.
//!
//! This module provides shared constants used across settings and engine
//! components to ensure consistency and eliminate duplication.

/// Tick interval for countdown timers in milliseconds.
///
/// Every active, unpaused timer loses exactly one second of remaining time
/// per tick. One second matches what cooking timers display to the user.
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Default duration in seconds for a timer requested by voice without an
/// explicit duration ("criar timer" with no number).
///
/// Five minutes is a sensible middle ground for most stovetop tasks.
pub const DEFAULT_TIMER_SECONDS: u32 = 300;

/// Minimum recognition confidence for a voice command to be acted upon.
///
/// Below this the utterance is treated as unrecognized, even on a text
/// match. Protects destructive actions (completing a step) from noisy
/// recognition results.
pub const VOICE_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Delay in milliseconds before auto-advancing to the next step after a
/// step is marked complete.
///
/// 1500ms leaves room for the spoken confirmation to finish before the
/// next instruction is read out. Any manual command cancels the pending
/// advance.
pub const AUTO_ADVANCE_DELAY_MS: u64 = 1500;

/// Maximum number of generated tips per analyzed step.
pub const MAX_TIPS_PER_STEP: usize = 3;

/// Buffer size for the outward engine event channel.
///
/// Events are sent non-blocking; when the host stops draining, new events
/// are dropped rather than stalling timer ticks or session commands.
pub const EVENT_BUFFER: usize = 256;

/// Maximum session rating accepted by `complete`.
pub const MAX_RATING: u8 = 5;

/// Locale of the default voice command table.
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// Confidence a timer candidate needs before step pre-annotation will copy
/// its duration onto a step that has none.
pub const ANNOTATION_CONFIDENCE: f32 = 0.5;
