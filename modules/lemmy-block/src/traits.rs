// Trait seams between the block engine and the Lemmy HTTP API.
//
// CommunityDirectory — unauthenticated listing of any instance's local communities.
// SiteSession — one account's authenticated session against its home site.
//
// The engine only ever talks to these traits, so tests swap in
// MockDirectory / MockSession from `testing` and never touch the network.

use async_trait::async_trait;
use lemmy_client::{
    BlockConfirmation, CommunitySummary, CommunityView, LemmyClient, ListingType, Result,
};

// ---------------------------------------------------------------------------
// CommunityDirectory
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CommunityDirectory: Send + Sync {
    /// One page (1-based) of communities hosted on `host`.
    async fn local_communities(
        &self,
        host: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CommunitySummary>>;
}

/// Directory backed by the public listing endpoint of each source instance.
pub struct PublicDirectory {
    http: reqwest::Client,
}

impl PublicDirectory {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl CommunityDirectory for PublicDirectory {
    async fn local_communities(
        &self,
        host: &str,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CommunitySummary>> {
        LemmyClient::with_client(self.http.clone(), host)
            .list_communities(ListingType::Local, page, limit)
            .await
    }
}

// ---------------------------------------------------------------------------
// SiteSession
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SiteSession: Send + Sync {
    async fn login(&mut self, user: &str, password: &str) -> Result<()>;

    /// Resolve `name@instance` as seen by the logged-in account.
    async fn community(&self, qualified_name: &str) -> Result<CommunityView>;

    async fn block_community(&self, community_id: i64, block: bool) -> Result<BlockConfirmation>;

    /// Hostnames the home site has federation-blocked.
    async fn blocked_instances(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl SiteSession for LemmyClient {
    async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        LemmyClient::login(self, user, password).await
    }

    async fn community(&self, qualified_name: &str) -> Result<CommunityView> {
        self.get_community(qualified_name).await
    }

    async fn block_community(&self, community_id: i64, block: bool) -> Result<BlockConfirmation> {
        LemmyClient::block_community(self, community_id, block).await
    }

    async fn blocked_instances(&self) -> Result<Vec<String>> {
        self.federated_instances().await
    }
}
