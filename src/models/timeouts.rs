//! Per-phase connection setup timeouts

use crate::defaults;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which connection of a trial a timeout or measurement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRound {
    /// Initial connection, normally over Bluetooth
    First,
    /// Reconnection that performs the medium upgrade
    Second,
}

impl ConnectionRound {
    pub fn default_discovery_timeout(self) -> Duration {
        match self {
            Self::First => defaults::FIRST_DISCOVERY_TIMEOUT,
            Self::Second => defaults::SECOND_DISCOVERY_TIMEOUT,
        }
    }

    pub fn default_connection_init_timeout(self) -> Duration {
        match self {
            Self::First => defaults::FIRST_CONNECTION_INIT_TIMEOUT,
            Self::Second => defaults::SECOND_CONNECTION_INIT_TIMEOUT,
        }
    }

    pub fn default_connection_result_timeout(self) -> Duration {
        match self {
            Self::First => defaults::FIRST_CONNECTION_RESULT_TIMEOUT,
            Self::Second => defaults::SECOND_CONNECTION_RESULT_TIMEOUT,
        }
    }
}

/// Timeouts for one connection setup.
///
/// An unset phase falls back to the round's default, never to zero or
/// infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSetupTimeouts {
    discovery_timeout: Option<Duration>,
    connection_init_timeout: Option<Duration>,
    connection_result_timeout: Option<Duration>,
}

impl ConnectionSetupTimeouts {
    pub fn new(
        discovery_timeout: Option<Duration>,
        connection_init_timeout: Option<Duration>,
        connection_result_timeout: Option<Duration>,
    ) -> Self {
        Self {
            discovery_timeout,
            connection_init_timeout,
            connection_result_timeout,
        }
    }

    /// Fully populated timeouts holding the defaults for `round`
    pub fn for_round(round: ConnectionRound) -> Self {
        Self::new(
            Some(round.default_discovery_timeout()),
            Some(round.default_connection_init_timeout()),
            Some(round.default_connection_result_timeout()),
        )
    }

    pub fn with_discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = Some(timeout);
        self
    }

    pub fn with_connection_init_timeout(mut self, timeout: Duration) -> Self {
        self.connection_init_timeout = Some(timeout);
        self
    }

    pub fn with_connection_result_timeout(mut self, timeout: Duration) -> Self {
        self.connection_result_timeout = Some(timeout);
        self
    }

    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.discovery_timeout
    }

    pub fn connection_init_timeout(&self) -> Option<Duration> {
        self.connection_init_timeout
    }

    pub fn connection_result_timeout(&self) -> Option<Duration> {
        self.connection_result_timeout
    }

    pub fn resolved_discovery_timeout(&self, round: ConnectionRound) -> Duration {
        self.discovery_timeout
            .unwrap_or_else(|| round.default_discovery_timeout())
    }

    pub fn resolved_connection_init_timeout(&self, round: ConnectionRound) -> Duration {
        self.connection_init_timeout
            .unwrap_or_else(|| round.default_connection_init_timeout())
    }

    pub fn resolved_connection_result_timeout(&self, round: ConnectionRound) -> Duration {
        self.connection_result_timeout
            .unwrap_or_else(|| round.default_connection_result_timeout())
    }

    /// Longest a connection may take: the init wait followed by the result wait.
    /// Saturates at `Duration::MAX`.
    pub fn connection_budget(&self, round: ConnectionRound) -> Duration {
        self.resolved_connection_init_timeout(round)
            .saturating_add(self.resolved_connection_result_timeout(round))
    }
}
