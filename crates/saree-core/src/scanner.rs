//! # Scan Debouncer
//!
//! A camera scanner reports the same code many times per second while it is
//! in frame. This state machine turns that stream into one accepted scan per
//! code per cooldown window.
//!
//! ## State Machine
//! ```text
//!              start()                 on_detect(p)
//!   ┌──────┐ ─────────► ┌──────────┐ ──────────────► ┌────────────────────┐
//!   │ Idle │            │ Scanning │                 │ Cooldown { p, t }  │
//!   └──────┘ ◄───────── └──────────┘ ◄────────────── └────────────────────┘
//!       ▲       stop()                 now >= t           │   │
//!       │                                                 │   │ same p, now < t
//!       └─────────────────── stop() ──────────────────────┘   └──► Ignored(Duplicate)
//!
//!   different payload while in Cooldown → Accepted, cooldown restarts
//! ```
//!
//! Time is passed in by the caller so the machine never reads a clock.

use std::time::{Duration, Instant};

/// Where the scanner currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Camera is off; detections are ignored.
    #[default]
    Idle,
    /// Camera is on and the next detection will be accepted.
    Scanning,
    /// A code was just accepted; repeats of it are suppressed until `expires_at`.
    /// `None` when the window reaches past what `Instant` can represent.
    Cooldown {
        last_payload: String,
        expires_at: Option<Instant>,
    },
}

/// Why a detection was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotScanning,
    Duplicate,
    Empty,
}

/// Outcome of feeding one detection to the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanDecision {
    /// Hand the payload to the caller (cart lookup, etc.).
    Accepted(String),
    Ignored(IgnoreReason),
}

impl ScanDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ScanDecision::Accepted(_))
    }
}

/// Debounces scanner detections.
#[derive(Debug, Clone)]
pub struct ScanDebouncer {
    cooldown: Duration,
    state: ScanState,
}

impl ScanDebouncer {
    /// Creates an idle debouncer.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Turns the scanner on. A no-op if it is already on.
    pub fn start(&mut self) {
        if self.state == ScanState::Idle {
            self.state = ScanState::Scanning;
        }
    }

    /// Turns the scanner off, discarding any cooldown.
    pub fn stop(&mut self) {
        self.state = ScanState::Idle;
    }

    /// Leaves `Cooldown` once its window has passed.
    pub fn tick(&mut self, now: Instant) {
        if let ScanState::Cooldown {
            expires_at: Some(expires_at),
            ..
        } = &self.state
        {
            if now >= *expires_at {
                self.state = ScanState::Scanning;
            }
        }
    }

    /// Feeds one detection.
    pub fn on_detect(&mut self, payload: &str, now: Instant) -> ScanDecision {
        let payload = payload.trim();

        if self.state == ScanState::Idle {
            return ScanDecision::Ignored(IgnoreReason::NotScanning);
        }
        if payload.is_empty() {
            return ScanDecision::Ignored(IgnoreReason::Empty);
        }

        self.tick(now);

        if let ScanState::Cooldown { last_payload, .. } = &self.state {
            if last_payload == payload {
                return ScanDecision::Ignored(IgnoreReason::Duplicate);
            }
        }

        self.state = ScanState::Cooldown {
            last_payload: payload.to_string(),
            expires_at: now.checked_add(self.cooldown),
        };
        ScanDecision::Accepted(payload.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(1500);

    fn scanning() -> (ScanDebouncer, Instant) {
        let mut d = ScanDebouncer::new(COOLDOWN);
        d.start();
        (d, Instant::now())
    }

    #[test]
    fn test_idle_ignores_detections() {
        let mut d = ScanDebouncer::new(COOLDOWN);
        assert_eq!(
            d.on_detect("SAR-KAN-0042", Instant::now()),
            ScanDecision::Ignored(IgnoreReason::NotScanning)
        );
        assert_eq!(d.state(), &ScanState::Idle);
    }

    #[test]
    fn test_repeat_within_cooldown_is_duplicate() {
        let (mut d, t0) = scanning();
        assert!(d.on_detect("SAR-KAN-0042", t0).is_accepted());
        assert_eq!(
            d.on_detect("SAR-KAN-0042", t0 + Duration::from_millis(200)),
            ScanDecision::Ignored(IgnoreReason::Duplicate)
        );
    }

    #[test]
    fn test_repeat_after_cooldown_is_accepted() {
        let (mut d, t0) = scanning();
        d.on_detect("SAR-KAN-0042", t0);
        assert_eq!(
            d.on_detect("SAR-KAN-0042", t0 + COOLDOWN),
            ScanDecision::Accepted("SAR-KAN-0042".to_string())
        );
    }

    #[test]
    fn test_different_code_restarts_cooldown() {
        let (mut d, t0) = scanning();
        d.on_detect("SAR-KAN-0042", t0);
        let t1 = t0 + Duration::from_millis(300);
        assert!(d.on_detect("SAR-BAN-0007", t1).is_accepted());
        assert_eq!(
            d.state(),
            &ScanState::Cooldown {
                last_payload: "SAR-BAN-0007".to_string(),
                expires_at: Some(t1 + COOLDOWN),
            }
        );
    }

    #[test]
    fn test_unbounded_cooldown_never_expires() {
        let mut d = ScanDebouncer::new(Duration::MAX);
        d.start();
        let t0 = Instant::now();
        assert!(d.on_detect("SAR-KAN-0042", t0).is_accepted());
        assert_eq!(
            d.state(),
            &ScanState::Cooldown {
                last_payload: "SAR-KAN-0042".to_string(),
                expires_at: None,
            }
        );

        let later = t0 + Duration::from_secs(86_400);
        d.tick(later);
        assert_eq!(
            d.on_detect("SAR-KAN-0042", later),
            ScanDecision::Ignored(IgnoreReason::Duplicate)
        );
        assert!(d.on_detect("SAR-BAN-0007", later).is_accepted());
    }

    #[test]
    fn test_tick_returns_to_scanning() {
        let (mut d, t0) = scanning();
        d.on_detect("SAR-KAN-0042", t0);
        d.tick(t0 + Duration::from_millis(100));
        assert!(matches!(d.state(), ScanState::Cooldown { .. }));
        d.tick(t0 + COOLDOWN);
        assert_eq!(d.state(), &ScanState::Scanning);
    }

    #[test]
    fn test_blank_and_stop() {
        let (mut d, t0) = scanning();
        assert_eq!(d.on_detect("   ", t0), ScanDecision::Ignored(IgnoreReason::Empty));
        d.on_detect("SAR-KAN-0042", t0);
        d.stop();
        assert_eq!(d.state(), &ScanState::Idle);
        d.start();
        assert!(d.on_detect("SAR-KAN-0042", t0).is_accepted());
    }
}
