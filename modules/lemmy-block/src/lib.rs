pub mod account;
pub mod config;
pub mod discovery;
pub mod federation;
pub mod instance;
pub mod orchestrator;
pub mod target;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod throttle;
pub mod traits;

pub use account::{Account, AccountRegistry};
pub use discovery::{CommunityDiscoverer, TargetListBuilder};
pub use federation::{FederationBlocks, FederationGuard};
pub use instance::Instance;
pub use orchestrator::{
    AccountReport, AccountStatus, BlockOrchestrator, RunSummary, TargetOutcome, TargetResult,
};
pub use target::BlockTarget;
pub use throttle::Throttle;
