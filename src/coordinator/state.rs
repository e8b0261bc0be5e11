// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coordinator lifecycle state.

use std::fmt;

/// Lifecycle of a coordinator.
///
/// ```text
/// Initializing ──ok──▶ Polling ◀──ok── Degraded
///       │                 │               ▲
///       └──── N transient failures ───────┘
///
/// any ── shutdown / auth failure ──▶ Stopped
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    /// No poll has succeeded yet.
    #[default]
    Initializing,
    /// The last poll succeeded.
    Polling,
    /// The last polls failed with transient errors; backoff applies.
    Degraded,
    /// Terminal. No further polls are made.
    Stopped(StopReason),
}

impl CoordinatorState {
    /// Returns `true` if the coordinator has stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }

    /// Returns the stop reason, if stopped.
    #[must_use]
    pub fn stop_reason(&self) -> Option<&StopReason> {
        match self {
            Self::Stopped(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::Polling => f.write_str("polling"),
            Self::Degraded => f.write_str("degraded"),
            Self::Stopped(reason) => write!(f, "stopped ({reason})"),
        }
    }
}

/// Why a coordinator stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// `shutdown()` was called.
    Shutdown,
    /// The device rejected the credentials; the connection needs
    /// reconfiguration.
    AuthFailed(String),
}

impl StopReason {
    /// Returns `true` if the host should prompt for new credentials.
    #[must_use]
    pub fn needs_reconfiguration(&self) -> bool {
        matches!(self, Self::AuthFailed(_))
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => f.write_str("shutdown"),
            Self::AuthFailed(msg) => write!(f, "authentication failed: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(CoordinatorState::Polling.to_string(), "polling");
        assert_eq!(
            CoordinatorState::Stopped(StopReason::AuthFailed("HTTP 401".into())).to_string(),
            "stopped (authentication failed: HTTP 401)"
        );
    }

    #[test]
    fn stop_reason_accessors() {
        let state = CoordinatorState::Stopped(StopReason::Shutdown);
        assert!(state.is_stopped());
        assert!(!state.stop_reason().unwrap().needs_reconfiguration());
        assert!(CoordinatorState::Degraded.stop_reason().is_none());
        assert_eq!(CoordinatorState::default(), CoordinatorState::Initializing);
    }
}
