// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{DashboardError, DashboardResult};

/// Apply button and filter selectors of one chart card.
#[derive(Debug, Clone, Default)]
pub struct FilterControls {
    busy: Arc<AtomicBool>,
}

impl FilterControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        !self.busy.load(Ordering::Acquire)
    }

    /// Disables the controls until the returned guard is dropped.
    pub fn try_acquire(&self, target: &str) -> DashboardResult<ControlGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| DashboardError::FilterInFlight {
                target: target.to_string(),
            })?;
        Ok(ControlGuard {
            busy: Arc::clone(&self.busy),
        })
    }
}

#[derive(Debug)]
pub struct ControlGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for ControlGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_until_guard_dropped() {
        let controls = FilterControls::new();
        let guard = controls.try_acquire("chart_1").unwrap();
        assert!(!controls.is_enabled());
        assert!(matches!(
            controls.try_acquire("chart_1"),
            Err(DashboardError::FilterInFlight { .. })
        ));
        drop(guard);
        assert!(controls.is_enabled());
        assert!(controls.try_acquire("chart_1").is_ok());
    }

    #[test]
    fn early_return_releases_controls() {
        fn failing(controls: &FilterControls) -> Result<(), &'static str> {
            let _guard = controls.try_acquire("chart_2").map_err(|_| "busy")?;
            Err("request failed")
        }
        let controls = FilterControls::new();
        assert_eq!(failing(&controls), Err("request failed"));
        assert!(controls.is_enabled());
    }
}
