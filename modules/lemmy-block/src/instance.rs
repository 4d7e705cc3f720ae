use lemmy_client::{BlockConfirmation, CommunityView, Result};
use tracing::{info, warn};

use crate::account::Account;
use crate::target::BlockTarget;
use crate::traits::SiteSession;

/// One account bound to a live session on its home site.
///
/// Borrows its `Account` from the registry; lives for the whole run.
/// Only `login` mutates it. Calls made before a successful login fail
/// with whatever the session reports (`NotLoggedIn` for the real client).
pub struct Instance<'a, S> {
    account: &'a Account,
    session: S,
}

impl<'a, S: SiteSession> Instance<'a, S> {
    pub fn new(account: &'a Account, session: S) -> Self {
        Self { account, session }
    }

    pub fn account(&self) -> &'a Account {
        self.account
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub async fn login(&mut self) -> Result<()> {
        match self
            .session
            .login(&self.account.user, &self.account.password)
            .await
        {
            Ok(()) => {
                info!(
                    account = self.account.name.as_str(),
                    user = self.account.user.as_str(),
                    site = self.account.site.as_str(),
                    "Login successful"
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    account = self.account.name.as_str(),
                    user = self.account.user.as_str(),
                    site = self.account.site.as_str(),
                    error = %e,
                    "Unsuccessful login attempt"
                );
                Err(e)
            }
        }
    }

    pub async fn community(&self, target: &BlockTarget) -> Result<CommunityView> {
        self.session.community(&target.qualified_name()).await
    }

    pub async fn block_community(&self, community_id: i64, block: bool) -> Result<BlockConfirmation> {
        self.session.block_community(community_id, block).await
    }

    pub async fn blocked_instances(&self) -> Result<Vec<String>> {
        self.session.blocked_instances().await
    }
}
