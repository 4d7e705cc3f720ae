use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use lemmy_client::MAX_PAGE_SIZE;

use crate::account::{Account, AccountRegistry};
use crate::target::BlockTarget;
use crate::throttle::Throttle;

// ---------------------------------------------------------------------------
// Accounts file
// ---------------------------------------------------------------------------

/// `accounts.toml`: one `[[accounts]]` table per account, processed in file order.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsFile {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountsFile {
    pub fn parse(content: &str) -> Result<Self> {
        let file: AccountsFile = toml::from_str(content).context("Failed to parse accounts")?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            bail!("No accounts configured");
        }
        for account in &self.accounts {
            if account.site.trim().is_empty() {
                bail!("Account {} has an empty site", account.name);
            }
            if account.user.trim().is_empty() {
                bail!("Account {} has an empty user", account.name);
            }
        }
        Ok(())
    }

    pub fn into_registry(self) -> AccountRegistry {
        AccountRegistry::new(self.accounts)
    }
}

// ---------------------------------------------------------------------------
// Block list file
// ---------------------------------------------------------------------------

/// `blocklist.toml`: source instances to discover from, explicit targets,
/// and throttle settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlocklistFile {
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    #[serde(default)]
    pub targets: Vec<TargetEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    pub instance: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    pub name: String,
    pub instance: String,
    #[serde(default = "default_block")]
    pub block: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThrottleConfig {
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            pause_ms: default_pause_ms(),
            page_size: default_page_size(),
        }
    }
}

fn default_block() -> bool {
    true
}

fn default_pause_ms() -> u64 {
    Throttle::DEFAULT_PAUSE.as_millis() as u64
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl BlocklistFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse block list")
    }

    pub fn source_instances(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.instance.trim().to_string()).collect()
    }

    pub fn explicit_targets(&self) -> Vec<BlockTarget> {
        self.targets
            .iter()
            .map(|t| BlockTarget::with_state(t.name.as_str(), &t.instance, t.block))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.targets.is_empty()
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::new(Duration::from_millis(self.throttle.pause_ms))
    }

    pub fn page_size(&self) -> u32 {
        self.throttle.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn check_config_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Config file \"{}\" is not a file", path.display());
    }
    Ok(())
}

fn read_config_file(path: &Path) -> Result<String> {
    check_config_file(path)?;
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))
}

pub fn load_accounts(path: &Path) -> Result<AccountRegistry> {
    let content = read_config_file(path)?;
    let file = AccountsFile::parse(&content)
        .with_context(|| format!("Invalid accounts file: {}", path.display()))?;
    Ok(file.into_registry())
}

pub fn load_blocklist(path: &Path) -> Result<BlocklistFile> {
    let content = read_config_file(path)?;
    BlocklistFile::parse(&content)
        .with_context(|| format!("Invalid block list file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ACCOUNTS: &str = r#"
[[accounts]]
name = "main"
site = "https://lemmy.world"
user = "alice"
password = "hunter2"

[[accounts]]
name = "alt"
site = "sh.itjust.works"
user = "bob"
password = "correct horse"
"#;

    #[test]
    fn accounts_keep_file_order() {
        let registry = AccountsFile::parse(ACCOUNTS).unwrap().into_registry();
        let users: Vec<&str> = registry.iter().map(|a| a.user.as_str()).collect();
        assert_eq!(users, vec!["alice", "bob"]);
    }

    #[test]
    fn empty_accounts_file_is_rejected() {
        assert!(AccountsFile::parse("").is_err());
    }

    #[test]
    fn account_missing_password_is_rejected() {
        let err = AccountsFile::parse(
            r#"
[[accounts]]
name = "main"
site = "lemmy.world"
user = "alice"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn account_with_blank_user_is_rejected() {
        let err = AccountsFile::parse(
            r#"
[[accounts]]
name = "main"
site = "lemmy.world"
user = "  "
password = "x"
"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn blocklist_defaults() {
        let blocklist = BlocklistFile::parse(
            r#"
[[sources]]
instance = "exploding-heads.com"

[[targets]]
name = "memes"
instance = "Lemmy.ML"

[[targets]]
name = "news"
instance = "lemmy.ml"
block = false
"#,
        )
        .unwrap();

        assert_eq!(blocklist.source_instances(), vec!["exploding-heads.com"]);
        assert_eq!(blocklist.throttle().duration(), Duration::from_millis(250));
        assert_eq!(blocklist.page_size(), 50);

        let targets = blocklist.explicit_targets();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].qualified_name(), "memes@lemmy.ml");
        assert!(targets[0].block);
        assert!(!targets[1].block);
    }

    #[test]
    fn blocklist_throttle_overrides() {
        let blocklist = BlocklistFile::parse(
            r#"
[throttle]
pause_ms = 1000
page_size = 500
"#,
        )
        .unwrap();

        assert!(blocklist.is_empty());
        assert_eq!(blocklist.throttle().duration(), Duration::from_secs(1));
        assert_eq!(blocklist.page_size(), 50);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(BlocklistFile::parse("[[sources]]\nhost = \"lemmy.ml\"\n").is_err());
    }

    #[test]
    fn example_files_parse() {
        let accounts = AccountsFile::parse(include_str!("../config/accounts.example.toml")).unwrap();
        let blocklist =
            BlocklistFile::parse(include_str!("../config/blocklist.example.toml")).unwrap();

        assert_eq!(accounts.accounts.len(), 2);
        assert_eq!(blocklist.source_instances().len(), 2);
        assert_eq!(blocklist.explicit_targets().len(), 1);
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ACCOUNTS.as_bytes()).unwrap();

        let registry = load_accounts(file.path()).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("accounts.toml");

        assert!(load_accounts(&missing).is_err());
        assert!(load_blocklist(dir.path()).is_err());
    }
}
