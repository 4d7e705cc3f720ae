use std::fmt;

use tracing::{debug, info, warn};

use crate::federation::{FederationBlocks, FederationGuard};
use crate::instance::Instance;
use crate::target::BlockTarget;
use crate::throttle::Throttle;
use crate::traits::SiteSession;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What happened to one target for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The account's home site federation-blocks the target's instance.
    SkippedFederated,
    AlreadyBlocked,
    /// Block call issued; `confirmed` is the state the server reported back.
    Blocked { confirmed: bool },
    LookupFailed,
    BlockFailed,
}

#[derive(Debug, Clone)]
pub struct TargetResult {
    pub target: BlockTarget,
    pub outcome: TargetOutcome,
}

#[derive(Debug, Clone)]
pub enum AccountStatus {
    /// Login failed; no target was looked at.
    LoginFailed,
    Done {
        /// Whether the federation block list was available for this account.
        federation_known: bool,
        results: Vec<TargetResult>,
    },
}

#[derive(Debug, Clone)]
pub struct AccountReport {
    pub account: String,
    pub user: String,
    pub status: AccountStatus,
}

impl AccountReport {
    pub fn results(&self) -> &[TargetResult] {
        match &self.status {
            AccountStatus::Done { results, .. } => results,
            AccountStatus::LoginFailed => &[],
        }
    }

    pub fn outcomes(&self) -> Vec<TargetOutcome> {
        self.results().iter().map(|r| r.outcome).collect()
    }
}

/// Totals across every account of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts: usize,
    pub login_failures: usize,
    pub federation_unknown: usize,
    pub blocked: usize,
    pub already_blocked: usize,
    pub skipped_federated: usize,
    pub lookup_failures: usize,
    pub block_failures: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[AccountReport]) -> Self {
        let mut summary = RunSummary {
            accounts: reports.len(),
            ..Default::default()
        };

        for report in reports {
            match &report.status {
                AccountStatus::LoginFailed => summary.login_failures += 1,
                AccountStatus::Done {
                    federation_known,
                    results,
                } => {
                    if !federation_known {
                        summary.federation_unknown += 1;
                    }
                    for result in results {
                        match result.outcome {
                            TargetOutcome::SkippedFederated => summary.skipped_federated += 1,
                            TargetOutcome::AlreadyBlocked => summary.already_blocked += 1,
                            TargetOutcome::Blocked { .. } => summary.blocked += 1,
                            TargetOutcome::LookupFailed => summary.lookup_failures += 1,
                            TargetOutcome::BlockFailed => summary.block_failures += 1,
                        }
                    }
                }
            }
        }

        summary
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accounts={} login_failures={} federation_unknown={} blocked={} already_blocked={} \
             skipped_federated={} lookup_failures={} block_failures={}",
            self.accounts,
            self.login_failures,
            self.federation_unknown,
            self.blocked,
            self.already_blocked,
            self.skipped_federated,
            self.lookup_failures,
            self.block_failures,
        )
    }
}

// ---------------------------------------------------------------------------
// BlockOrchestrator
// ---------------------------------------------------------------------------

/// Applies one target list to every account, one account and one target at
/// a time. Failures never escape: login failure ends that account, lookup or
/// block failure ends that target.
pub struct BlockOrchestrator {
    guard: FederationGuard,
    throttle: Throttle,
}

impl BlockOrchestrator {
    pub fn new(throttle: Throttle) -> Self {
        Self {
            guard: FederationGuard::new(),
            throttle,
        }
    }

    pub fn with_guard(mut self, guard: FederationGuard) -> Self {
        self.guard = guard;
        self
    }

    pub async fn run<S: SiteSession>(
        &self,
        instances: &mut [Instance<'_, S>],
        targets: &[BlockTarget],
    ) -> Vec<AccountReport> {
        info!(count = targets.len(), "Number of communities to block");
        if targets.is_empty() {
            warn!("Target list is empty, nothing will be blocked");
        }

        let mut reports = Vec::with_capacity(instances.len());
        for instance in instances.iter_mut() {
            reports.push(self.process_account(instance, targets).await);
        }
        reports
    }

    pub async fn process_account<S: SiteSession>(
        &self,
        instance: &mut Instance<'_, S>,
        targets: &[BlockTarget],
    ) -> AccountReport {
        let account = instance.account();
        info!(account = account.name.as_str(), user = account.user.as_str(), "Login");

        let login = instance.login().await;
        self.throttle.pause().await;

        if login.is_err() {
            return AccountReport {
                account: account.name.clone(),
                user: account.user.clone(),
                status: AccountStatus::LoginFailed,
            };
        }

        let federation = self.guard.fetch(instance).await;
        self.throttle.pause().await;

        let total = targets.len();
        let mut results = Vec::with_capacity(total);
        for (index, target) in targets.iter().enumerate() {
            let outcome = self
                .process_target(instance, &federation, target, index + 1, total)
                .await;
            results.push(TargetResult {
                target: target.clone(),
                outcome,
            });
        }

        info!(account = account.name.as_str(), user = account.user.as_str(), "Finished account");
        AccountReport {
            account: account.name.clone(),
            user: account.user.clone(),
            status: AccountStatus::Done {
                federation_known: federation.is_known(),
                results,
            },
        }
    }

    async fn process_target<S: SiteSession>(
        &self,
        instance: &Instance<'_, S>,
        federation: &FederationBlocks,
        target: &BlockTarget,
        position: usize,
        total: usize,
    ) -> TargetOutcome {
        let user = instance.account().user.as_str();
        let community = target.qualified_name();

        if federation.blocks(&target.instance) {
            info!(
                position,
                total,
                user,
                community = community.as_str(),
                "Skipping, instance is federation-blocked"
            );
            return TargetOutcome::SkippedFederated;
        }

        info!(position, total, user, community = community.as_str(), "Blocking");

        let view = instance.community(target).await;
        self.throttle.pause().await;
        let view = match view {
            Ok(view) => view,
            Err(e) => {
                warn!(user, community = community.as_str(), error = %e, "Unsuccessful get community attempt");
                return TargetOutcome::LookupFailed;
            }
        };

        // A missing flag counts as not blocked.
        match view.blocked {
            Some(true) => {
                info!(user, community = community.as_str(), "Already blocked");
                return TargetOutcome::AlreadyBlocked;
            }
            Some(false) => {}
            None => debug!(community = community.as_str(), "Server omitted blocked flag, treating as not blocked"),
        }

        let confirmation = instance.block_community(view.id, target.block).await;
        self.throttle.pause().await;
        match confirmation {
            Ok(confirmation) => {
                info!(
                    user,
                    community = community.as_str(),
                    blocked = confirmation.blocked,
                    "Community block state confirmed"
                );
                TargetOutcome::Blocked {
                    confirmed: confirmation.blocked,
                }
            }
            Err(e) => {
                warn!(user, community_id = view.id, community = community.as_str(), error = %e, "Unsuccessful block attempt");
                TargetOutcome::BlockFailed
            }
        }
    }
}
