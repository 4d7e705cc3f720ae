use futures::stream::{self, Stream, StreamExt};
use lemmy_client::MAX_PAGE_SIZE;
use tracing::{debug, info, warn};

use crate::target::{normalize_host, BlockTarget};
use crate::throttle::Throttle;
use crate::traits::CommunityDirectory;

/// Upper bound on pages requested from one source. A server that ignores
/// `page` keeps answering with the same non-empty page.
pub const DEFAULT_MAX_PAGES: u32 = 10_000;

/// Pages through a source instance's local communities and turns each one
/// into a `BlockTarget`.
pub struct CommunityDiscoverer<'d, D> {
    directory: &'d D,
    page_size: u32,
    max_pages: u32,
    throttle: Throttle,
}

impl<'d, D: CommunityDirectory> CommunityDiscoverer<'d, D> {
    pub fn new(directory: &'d D, throttle: Throttle) -> Self {
        Self {
            directory,
            page_size: MAX_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            throttle,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Lazily walk every page of `host`, starting at page 1.
    ///
    /// Ends at the first empty page, the first failed request or the page limit; a failure
    /// is logged and whatever was already yielded stands. Each call starts
    /// over from page 1.
    pub fn discover(&self, host: &str) -> impl Stream<Item = BlockTarget> + 'd {
        let directory = self.directory;
        let page_size = self.page_size;
        let max_pages = self.max_pages;
        let throttle = self.throttle;
        let host = normalize_host(host);
        info!(instance = host.as_str(), "Gathering communities, this could take a while");

        stream::unfold(1u32, move |page| {
            let host = host.clone();
            async move {
                if page > max_pages {
                    warn!(instance = host.as_str(), max_pages, "Page limit reached, stopping discovery");
                    return None;
                }
                info!(instance = host.as_str(), page, "Retrieving communities");

                match directory.local_communities(&host, page, page_size).await {
                    Ok(communities) if communities.is_empty() => {
                        info!(instance = host.as_str(), page, "No more communities to get");
                        None
                    }
                    Ok(communities) => {
                        let targets: Vec<BlockTarget> = communities
                            .into_iter()
                            .filter_map(|c| match c.id {
                                Some(_) => Some(BlockTarget::new(c.name, &host)),
                                None => {
                                    debug!(instance = host.as_str(), community = c.name.as_str(), "Skipping community without id");
                                    None
                                }
                            })
                            .collect();
                        throttle.pause().await;
                        Some((stream::iter(targets), page + 1))
                    }
                    Err(e) => {
                        warn!(instance = host.as_str(), page, error = %e, "Issue gathering communities");
                        None
                    }
                }
            }
        })
        .flatten()
    }
}

/// Runs discovery over every source instance, in order, and concatenates
/// the results into one target list.
pub struct TargetListBuilder<'d, D> {
    discoverer: CommunityDiscoverer<'d, D>,
}

impl<'d, D: CommunityDirectory> TargetListBuilder<'d, D> {
    pub fn new(discoverer: CommunityDiscoverer<'d, D>) -> Self {
        Self { discoverer }
    }

    pub async fn build<I, T>(&self, sources: I) -> Vec<BlockTarget>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut targets = Vec::new();
        for source in sources {
            let source = source.as_ref();
            let found: Vec<BlockTarget> = self.discoverer.discover(source).collect().await;
            info!(instance = source, communities = found.len(), "Gathered communities");
            targets.extend(found);
        }
        targets
    }
}
