//! Single-slot error banner bookkeeping
//!
//! Showing a banner replaces whatever banner was up. Timers started for an
//! older banner check [`BannerSlot::is_current`] before touching the page, so a
//! late auto-dismiss never removes its replacement.

use std::cell::Cell;
use std::time::Duration;

use crate::config::BannerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerId(u64);

#[derive(Debug, Default)]
pub struct BannerSlot {
    next: Cell<u64>,
    current: Cell<Option<BannerId>>,
}

impl BannerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for a new banner, returning the replaced one
    pub fn show(&self) -> (BannerId, Option<BannerId>) {
        let id = BannerId(self.next.get());
        self.next.set(self.next.get().wrapping_add(1));
        let replaced = self.current.replace(Some(id));
        (id, replaced)
    }

    /// Release the slot if `id` still holds it
    pub fn dismiss(&self, id: BannerId) -> bool {
        if self.is_current(id) {
            self.current.set(None);
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, id: BannerId) -> bool {
        self.current.get() == Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.current.get().is_none()
    }
}

/// When an unattended banner starts fading and when it is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerTiming {
    pub display: Option<Duration>,
    pub fade: Duration,
}

impl From<&BannerConfig> for BannerTiming {
    fn from(config: &BannerConfig) -> Self {
        Self {
            display: (config.display_ms > 0).then(|| Duration::from_millis(config.display_ms)),
            fade: Duration::from_millis(config.fade_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_banner_replaces_old() {
        let slot = BannerSlot::new();
        let (first, replaced) = slot.show();
        assert_eq!(replaced, None);

        let (second, replaced) = slot.show();
        assert_eq!(replaced, Some(first));
        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));
    }

    #[test]
    fn test_stale_dismiss_is_ignored() {
        let slot = BannerSlot::new();
        let (first, _) = slot.show();
        let (second, _) = slot.show();

        assert!(!slot.dismiss(first));
        assert!(slot.is_current(second));
        assert!(slot.dismiss(second));
        assert!(slot.is_empty());
        assert!(!slot.dismiss(second));
    }

    #[test]
    fn test_timing_from_config() {
        let timing = BannerTiming::from(&BannerConfig::default());
        assert_eq!(timing.display, Some(Duration::from_secs(5)));
        assert_eq!(timing.fade, Duration::from_millis(300));

        let sticky = BannerTiming::from(&BannerConfig {
            display_ms: 0,
            fade_ms: 300,
        });
        assert_eq!(sticky.display, None);
    }
}
