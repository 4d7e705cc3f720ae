use serde::{Deserialize, Serialize};

use crate::error::{LemmyError, Result};

// --- Public result types ---

/// One entry of a community listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunitySummary {
    pub id: Option<i64>,
    pub name: String,
}

/// Live state of a single community as seen by the logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommunityView {
    pub id: i64,
    pub name: String,
    /// `None` when the server omitted the flag.
    pub blocked: Option<bool>,
}

/// State reported back by the server after a block request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockConfirmation {
    pub blocked: bool,
}

/// `type_` parameter of the community listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingType {
    All,
    Local,
    Subscribed,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::All => "All",
            ListingType::Local => "Local",
            ListingType::Subscribed => "Subscribed",
        }
    }
}

// --- Request bodies ---

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginForm<'a> {
    pub username_or_email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BlockCommunityForm {
    pub community_id: i64,
    pub block: bool,
}

// --- Response bodies ---

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub jwt: Option<String>,
    #[serde(default)]
    pub registration_created: bool,
    #[serde(default)]
    pub verify_email_sent: bool,
}

impl LoginResponse {
    /// Servers answer without a token while registration is pending.
    pub fn into_token(self) -> Result<String> {
        self.jwt.ok_or(LemmyError::MissingToken)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ListCommunitiesResponse {
    #[serde(default)]
    pub communities: Vec<CommunityViewWire>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GetCommunityResponse {
    pub community_view: CommunityViewWire,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BlockCommunityResponse {
    pub blocked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GetFederatedInstancesResponse {
    pub federated_instances: Option<FederatedInstances>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FederatedInstances {
    #[serde(default)]
    pub blocked: Vec<InstanceEntry>,
}

/// Servers before 0.18 list bare domains, later ones full instance objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum InstanceEntry {
    Domain(String),
    Instance { domain: String },
}

impl InstanceEntry {
    pub fn into_domain(self) -> String {
        match self {
            InstanceEntry::Domain(domain) | InstanceEntry::Instance { domain } => domain,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommunityViewWire {
    pub community: CommunityWire,
    pub blocked: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommunityWire {
    pub id: Option<i64>,
    pub name: String,
}

impl CommunityViewWire {
    pub fn into_summary(self) -> CommunitySummary {
        CommunitySummary {
            id: self.community.id,
            name: self.community.name,
        }
    }

    /// A lookup result is only usable if the server told us the community id.
    pub fn into_view(self) -> Option<CommunityView> {
        Some(CommunityView {
            id: self.community.id?,
            name: self.community.name,
            blocked: self.blocked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn federated_instances_accept_both_shapes() {
        let legacy: GetFederatedInstancesResponse = serde_json::from_str(
            r#"{"federated_instances":{"linked":[],"allowed":[],"blocked":["bad.example"]}}"#,
        )
        .unwrap();
        let current: GetFederatedInstancesResponse = serde_json::from_str(
            r#"{"federated_instances":{"linked":[],"allowed":[],
                "blocked":[{"id":3,"domain":"worse.example","published":"2023-06-01T00:00:00Z"}]}}"#,
        )
        .unwrap();

        let legacy: Vec<String> = legacy
            .federated_instances
            .unwrap()
            .blocked
            .into_iter()
            .map(InstanceEntry::into_domain)
            .collect();
        let current: Vec<String> = current
            .federated_instances
            .unwrap()
            .blocked
            .into_iter()
            .map(InstanceEntry::into_domain)
            .collect();

        assert_eq!(legacy, vec!["bad.example"]);
        assert_eq!(current, vec!["worse.example"]);
    }

    #[test]
    fn login_response_without_jwt_has_no_token() {
        let pending: LoginResponse =
            serde_json::from_str(r#"{"registration_created":true,"verify_email_sent":false}"#)
                .unwrap();
        let issued: LoginResponse = serde_json::from_str(r#"{"jwt":"abc.def.ghi"}"#).unwrap();

        assert!(pending.registration_created);
        assert!(matches!(pending.into_token(), Err(LemmyError::MissingToken)));
        assert_eq!(issued.into_token().unwrap(), "abc.def.ghi");
    }

    #[test]
    fn community_view_keeps_missing_blocked_flag() {
        let resp: GetCommunityResponse = serde_json::from_str(
            r#"{"community_view":{"community":{"id":42,"name":"rust","title":"Rust"},
                "subscribed":"NotSubscribed"},"moderators":[]}"#,
        )
        .unwrap();

        let view = resp.community_view.into_view().unwrap();
        assert_eq!(view.id, 42);
        assert_eq!(view.name, "rust");
        assert_eq!(view.blocked, None);
    }

    #[test]
    fn community_without_id_has_no_view() {
        let wire: CommunityViewWire =
            serde_json::from_str(r#"{"community":{"id":null,"name":"ghost"},"blocked":false}"#)
                .unwrap();

        assert!(wire.clone().into_view().is_none());
        assert_eq!(wire.into_summary().id, None);
    }
}
