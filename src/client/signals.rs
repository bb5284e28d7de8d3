use crate::resilience::LimiterSnapshot;

/// A lightweight snapshot of runtime "signals" for orchestration.
///
/// This is intentionally *facts only* (no policy). Applications can decide
/// for themselves what to do with a closed global gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalsSnapshot {
    pub rate_limiter: LimiterSnapshot,
}
