// Test mocks for the block engine.
//
// Two mocks matching the two trait boundaries:
// - MockDirectory (CommunityDirectory) — scripted listing pages per host
// - MockSession (SiteSession) — stateful in-memory home site
//
// Both record every call so tests can assert on what was (not) requested.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use lemmy_client::{BlockConfirmation, CommunitySummary, CommunityView, LemmyError, Result};

use crate::account::Account;
use crate::traits::{CommunityDirectory, SiteSession};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn account(name: &str, site: &str, user: &str) -> Account {
    Account {
        name: name.to_string(),
        site: site.to_string(),
        user: user.to_string(),
        password: format!("{user}-password"),
    }
}

/// `count` communities named `{prefix}0..`, with ids starting at `first_id`.
pub fn communities(prefix: &str, first_id: i64, count: usize) -> Vec<CommunitySummary> {
    (0..count)
        .map(|i| CommunitySummary {
            id: Some(first_id + i as i64),
            name: format!("{prefix}{i}"),
        })
        .collect()
}

fn unavailable(what: &str) -> LemmyError {
    LemmyError::Api {
        status: 502,
        message: format!("mock: {what} unavailable"),
    }
}

// ---------------------------------------------------------------------------
// MockDirectory
// ---------------------------------------------------------------------------

enum PageScript {
    Page(Vec<CommunitySummary>),
    Fail,
}

/// Scripted community listings. Pages are served in the order they were
/// registered; any page past the script is empty.
pub struct MockDirectory {
    pages: HashMap<String, Vec<PageScript>>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on_page(mut self, host: &str, communities: Vec<CommunitySummary>) -> Self {
        self.pages
            .entry(host.to_string())
            .or_default()
            .push(PageScript::Page(communities));
        self
    }

    pub fn on_failed_page(mut self, host: &str) -> Self {
        self.pages
            .entry(host.to_string())
            .or_default()
            .push(PageScript::Fail);
        self
    }

    /// Every `(host, page)` requested, in order.
    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, host: &str) -> Vec<u32> {
        self.requests()
            .into_iter()
            .filter(|(h, _)| h == host)
            .map(|(_, page)| page)
            .collect()
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommunityDirectory for MockDirectory {
    async fn local_communities(
        &self,
        host: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CommunitySummary>> {
        self.requests.lock().unwrap().push((host.to_string(), page));

        let script = self
            .pages
            .get(host)
            .and_then(|pages| pages.get(page.saturating_sub(1) as usize));
        match script {
            Some(PageScript::Page(communities)) => {
                Ok(communities.iter().take(limit as usize).cloned().collect())
            }
            Some(PageScript::Fail) => Err(unavailable(&format!("{host} page {page}"))),
            None => Ok(Vec::new()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Login,
    Lookup(String),
    Block { community_id: i64, block: bool },
    FederationList,
}

struct MockCommunity {
    id: i64,
    omit_flag: bool,
}

/// In-memory home site. Communities are keyed by `name@instance`; block
/// calls update the per-account blocked set so a second pass sees them.
pub struct MockSession {
    login_fails: bool,
    logged_in: bool,
    communities: HashMap<String, MockCommunity>,
    failing_lookups: HashSet<String>,
    failing_blocks: HashSet<i64>,
    federation: Option<Vec<String>>,
    federation_failures: Mutex<u32>,
    blocked: Mutex<HashSet<i64>>,
    calls: Mutex<Vec<SessionCall>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            login_fails: false,
            logged_in: false,
            communities: HashMap::new(),
            failing_lookups: HashSet::new(),
            failing_blocks: HashSet::new(),
            federation: Some(Vec::new()),
            federation_failures: Mutex::new(0),
            blocked: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_community(mut self, qualified_name: &str, id: i64) -> Self {
        self.communities.insert(
            qualified_name.to_string(),
            MockCommunity {
                id,
                omit_flag: false,
            },
        );
        self
    }

    /// Register a community the account already blocks.
    pub fn with_blocked_community(self, qualified_name: &str, id: i64) -> Self {
        self.blocked.lock().unwrap().insert(id);
        self.with_community(qualified_name, id)
    }

    /// Register a community whose lookup omits the blocked flag.
    pub fn with_flagless_community(mut self, qualified_name: &str, id: i64) -> Self {
        self.communities.insert(
            qualified_name.to_string(),
            MockCommunity { id, omit_flag: true },
        );
        self
    }

    pub fn failing_login(mut self) -> Self {
        self.login_fails = true;
        self
    }

    pub fn failing_lookup(mut self, qualified_name: &str) -> Self {
        self.failing_lookups.insert(qualified_name.to_string());
        self
    }

    pub fn failing_block(mut self, community_id: i64) -> Self {
        self.failing_blocks.insert(community_id);
        self
    }

    pub fn federation_blocks(mut self, hosts: &[&str]) -> Self {
        self.federation = Some(hosts.iter().map(|h| h.to_string()).collect());
        self
    }

    /// Fail the first `failures` federation list requests, then succeed.
    pub fn federation_failures(self, failures: u32) -> Self {
        *self.federation_failures.lock().unwrap() = failures;
        self
    }

    /// Fail every federation list request.
    pub fn federation_unavailable(mut self) -> Self {
        self.federation = None;
        self
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SessionCall::Lookup(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn block_calls(&self) -> Vec<i64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SessionCall::Block { community_id, .. } => Some(community_id),
                _ => None,
            })
            .collect()
    }

    pub fn federation_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SessionCall::FederationList))
            .count()
    }

    pub fn is_blocked(&self, community_id: i64) -> bool {
        self.blocked.lock().unwrap().contains(&community_id)
    }

    fn record(&self, call: SessionCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn require_login(&self) -> Result<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(LemmyError::NotLoggedIn)
        }
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteSession for MockSession {
    async fn login(&mut self, _user: &str, _password: &str) -> Result<()> {
        self.record(SessionCall::Login);
        if self.login_fails {
            return Err(LemmyError::Api {
                status: 400,
                message: "incorrect_login".to_string(),
            });
        }
        self.logged_in = true;
        Ok(())
    }

    async fn community(&self, qualified_name: &str) -> Result<CommunityView> {
        self.record(SessionCall::Lookup(qualified_name.to_string()));
        self.require_login()?;

        if self.failing_lookups.contains(qualified_name) {
            return Err(unavailable(qualified_name));
        }

        let community = self.communities.get(qualified_name).ok_or_else(|| LemmyError::Api {
            status: 404,
            message: "couldnt_find_community".to_string(),
        })?;
        let blocked = self.blocked.lock().unwrap().contains(&community.id);
        let name = qualified_name
            .split('@')
            .next()
            .unwrap_or(qualified_name)
            .to_string();

        Ok(CommunityView {
            id: community.id,
            name,
            blocked: if community.omit_flag { None } else { Some(blocked) },
        })
    }

    async fn block_community(&self, community_id: i64, block: bool) -> Result<BlockConfirmation> {
        self.record(SessionCall::Block {
            community_id,
            block,
        });
        self.require_login()?;

        if self.failing_blocks.contains(&community_id) {
            return Err(unavailable(&format!("block {community_id}")));
        }

        let mut blocked = self.blocked.lock().unwrap();
        if block {
            blocked.insert(community_id);
        } else {
            blocked.remove(&community_id);
        }
        Ok(BlockConfirmation { blocked: block })
    }

    async fn blocked_instances(&self) -> Result<Vec<String>> {
        self.record(SessionCall::FederationList);
        self.require_login()?;

        let mut remaining = self.federation_failures.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(unavailable("federated_instances"));
        }
        drop(remaining);

        self.federation
            .clone()
            .ok_or_else(|| unavailable("federated_instances"))
    }
}
