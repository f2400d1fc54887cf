//! Adaptive quality search.
//!
//! The ladder is a small state machine driven by measured output sizes:
//!
//! ```text
//! Encoding(q) -> observe(size) -> Accept
//!                              -> AcceptBestEffort   (floor or attempt cap)
//!                              -> Retry(q')          (q' < q, q' >= floor)
//! ```
//!
//! It never touches the encoder, so the step policy and the termination
//! rules are tested here with plain numbers.

use serde::Serialize;

/// Largest accepted sticker, in bytes (headroom under a 1 MB transport cap).
pub const SIZE_BUDGET: u64 = 966_367;
/// Upper bound on encoder invocations per conversion.
pub const MAX_ATTEMPTS: u32 = 8;

const ANIMATED_START: u8 = 45;
const ANIMATED_FLOOR: u8 = 15;
const STATIC_START: u8 = 75;
const STATIC_FLOOR: u8 = 25;

/// One measured encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EncodeAttempt {
    /// Zero-based.
    pub attempt_index: u32,
    pub quality: u8,
    pub output_size: u64,
}

/// Decision after measuring an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderStep {
    /// Output fits the budget.
    Accept,
    /// Output is over budget but no further step is allowed.
    AcceptBestEffort,
    /// Encode again at this quality.
    Retry(u8),
}

#[derive(Debug, Clone)]
pub struct QualityLadder {
    quality: u8,
    floor: u8,
    budget: u64,
    attempts: u32,
    max_attempts: u32,
}

impl QualityLadder {
    /// Ladder with the default start and floor for the source type.
    pub fn for_source(animated: bool) -> Self {
        let (start, floor) = if animated {
            (ANIMATED_START, ANIMATED_FLOOR)
        } else {
            (STATIC_START, STATIC_FLOOR)
        };
        Self::new(start, floor, SIZE_BUDGET)
    }

    /// Custom ladder. A start below the floor is raised to the floor.
    pub fn new(start: u8, floor: u8, budget: u64) -> Self {
        Self {
            quality: start.max(floor),
            floor,
            budget,
            attempts: 0,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Quality for the next encode.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn floor(&self) -> u8 {
        self.floor
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Attempts observed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record the size produced at [`quality`](Self::quality) and decide what
    /// happens next.
    pub fn observe(&mut self, output_size: u64) -> LadderStep {
        self.attempts += 1;

        if output_size <= self.budget {
            return LadderStep::Accept;
        }
        if self.quality <= self.floor || self.attempts >= self.max_attempts {
            return LadderStep::AcceptBestEffort;
        }

        self.quality = next_quality(self.quality, self.floor, output_size, self.budget);
        LadderStep::Retry(self.quality)
    }
}

/// Tiered step-down: large overages cut quality multiplicatively, small ones
/// subtract a flat 10. Always strictly below `current` unless already at
/// `floor`, never below `floor`.
fn next_quality(current: u8, floor: u8, output_size: u64, budget: u64) -> u8 {
    let overage = output_size as f64 / budget.max(1) as f64;
    let stepped = if overage > 1.5 {
        (f64::from(current) * 0.6).floor() as u8
    } else if overage > 1.2 {
        (f64::from(current) * 0.75).floor() as u8
    } else {
        current.saturating_sub(10)
    };
    stepped.max(floor)
}
