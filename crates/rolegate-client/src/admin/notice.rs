// Rolegate
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Toasts and banners

use std::time::{Duration, Instant};

/// How long a toast stays up
pub const TOAST_DURATION: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    raised_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.raised_at) >= ttl
    }
}

/// Error surfaces of a tab: one auto-dismissing toast and one sticky banner
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    toast: Option<Toast>,
    banner: Option<String>,
    toast_ttl: Duration,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(TOAST_DURATION)
    }
}

impl NoticeBoard {
    pub fn new(toast_ttl: Duration) -> Self {
        Self {
            toast: None,
            banner: None,
            toast_ttl,
        }
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_at(message, Instant::now());
    }

    pub fn toast_at(&mut self, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast {
            message: message.into(),
            raised_at: now,
        });
    }

    pub fn banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
    }

    /// Drop the toast once its time is up; called on every UI tick
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now, self.toast_ttl)) {
            self.toast = None;
        }
    }

    pub fn current_toast(&self) -> Option<&str> {
        self.toast.as_ref().map(|t| t.message.as_str())
    }

    pub fn current_banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn clear(&mut self) {
        self.toast = None;
        self.banner = None;
    }
}
