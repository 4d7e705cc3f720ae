use std::fmt;

use serde::Deserialize;
use tracing::info;

use crate::instance::Instance;
use crate::traits::SiteSession;

/// One credential set from the accounts file.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Account {
    /// Local alias, only used in logs.
    pub name: String,
    pub site: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("site", &self.site)
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// The roster of accounts, in processing order. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
}

impl AccountRegistry {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Bind every account to a fresh session, one `Instance` each.
    pub fn bind<S: SiteSession>(
        &self,
        mut connect: impl FnMut(&Account) -> S,
    ) -> Vec<Instance<'_, S>> {
        self.accounts
            .iter()
            .map(|account| Instance::new(account, connect(account)))
            .collect()
    }

    pub fn log_redacted(&self) {
        info!(count = self.accounts.len(), "Loaded accounts");
        for account in &self.accounts {
            info!(
                account = account.name.as_str(),
                site = account.site.as_str(),
                user = account.user.as_str(),
                "Account"
            );
        }
    }
}
