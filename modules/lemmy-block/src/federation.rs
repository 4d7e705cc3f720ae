use std::collections::HashSet;

use tracing::{info, warn};

use crate::instance::Instance;
use crate::target::normalize_host;
use crate::traits::SiteSession;

/// How many times the federated instance list is requested before giving up.
pub const FEDERATION_FETCH_ATTEMPTS: u32 = 3;

/// What an account's home site has blocked at the federation level.
///
/// `Indeterminate` means the list could not be fetched. It is not an empty
/// set: callers lose the instance-level shortcut, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FederationBlocks {
    Known(HashSet<String>),
    Indeterminate,
}

impl FederationBlocks {
    pub fn known<I, T>(hosts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        FederationBlocks::Known(hosts.into_iter().map(|h| normalize_host(h.as_ref())).collect())
    }

    pub fn is_known(&self) -> bool {
        matches!(self, FederationBlocks::Known(_))
    }

    /// True only when the list was fetched and contains `host`.
    pub fn blocks(&self, host: &str) -> bool {
        match self {
            FederationBlocks::Known(hosts) => hosts.contains(&normalize_host(host)),
            FederationBlocks::Indeterminate => false,
        }
    }
}

/// Fetches the federation block list for one logged-in instance, retrying
/// immediately on failure up to a fixed number of attempts.
#[derive(Debug, Clone, Copy)]
pub struct FederationGuard {
    attempts: u32,
}

impl FederationGuard {
    pub fn new() -> Self {
        Self {
            attempts: FEDERATION_FETCH_ATTEMPTS,
        }
    }

    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    pub async fn fetch<S: SiteSession>(&self, instance: &Instance<'_, S>) -> FederationBlocks {
        let site = instance.account().site.as_str();

        for attempt in 1..=self.attempts {
            info!(site, attempt, max_attempts = self.attempts, "Pulling federated instance list");
            match instance.blocked_instances().await {
                Ok(hosts) => {
                    let set: HashSet<String> = hosts.iter().map(|h| normalize_host(h)).collect();
                    info!(site, blocked_instances = set.len(), "Federated instance list pulled");
                    return FederationBlocks::Known(set);
                }
                Err(e) => {
                    warn!(site, attempt, max_attempts = self.attempts, error = %e, "Couldn't get federated instance list");
                }
            }
        }

        warn!(site, "Failed to pull federated instance list, continuing without instance-level skips");
        FederationBlocks::Indeterminate
    }
}

impl Default for FederationGuard {
    fn default() -> Self {
        Self::new()
    }
}
