//! Host clock, uptime, and telemetry placeholders.

use time::OffsetDateTime;

/// Battery state. Retrieval is an external collaborator's job; this host
/// reports unknown and the payload shape is the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerStatus {
    pub level: Option<i64>,
    pub charging: Option<bool>,
}

/// Connectivity state, same unknown-placeholder contract as power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    pub online: Option<bool>,
    pub connection_type: Option<String>,
}

pub struct SystemInfo {
    booted_at: OffsetDateTime,
}

impl SystemInfo {
    pub fn new() -> Self {
        SystemInfo {
            booted_at: local_now(),
        }
    }

    pub fn now(&self) -> OffsetDateTime {
        local_now()
    }

    pub fn uptime_seconds(&self) -> i64 {
        (self.now() - self.booted_at).whole_seconds()
    }

    pub fn power_status(&self) -> PowerStatus {
        PowerStatus {
            level: None,
            charging: None,
        }
    }

    pub fn network_status(&self) -> NetworkStatus {
        NetworkStatus {
            online: None,
            connection_type: None,
        }
    }

    /// Offset-based zone label: `UTC` or `UTC+09:00` style.
    pub fn timezone(&self) -> String {
        let offset = self.now().offset();
        if offset.is_utc() {
            return "UTC".to_string();
        }
        let (hours, minutes, _) = offset.as_hms();
        format!("UTC{:+03}:{:02}", hours, minutes.abs())
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        SystemInfo::new()
    }
}

/// Local time, falling back to UTC when the local offset cannot be
/// determined (some sandboxed environments).
fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
