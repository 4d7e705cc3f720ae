pub mod error;
pub mod types;

pub use error::{LemmyError, Result};
pub use types::{BlockConfirmation, CommunitySummary, CommunityView, ListingType};

use std::time::Duration;

use serde::de::DeserializeOwned;
use types::{
    BlockCommunityForm, BlockCommunityResponse, GetCommunityResponse,
    GetFederatedInstancesResponse, InstanceEntry, ListCommunitiesResponse, LoginForm,
    LoginResponse,
};

const API_PATH: &str = "/api/v3";

/// Largest page the community listing endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Turn a configured site (`lemmy.ml`, `https://lemmy.ml/`) into a base URL.
pub fn site_url(site: &str) -> String {
    let site = site.trim().trim_end_matches('/');
    if site.starts_with("http://") || site.starts_with("https://") {
        site.to_string()
    } else {
        format!("https://{site}")
    }
}

/// HTTP client with the timeout and user agent every Lemmy call uses.
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("lemmy-client/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

fn page_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

/// Non-2xx responses become `Api` errors carrying the body text.
fn decode<T: DeserializeOwned>(status: reqwest::StatusCode, body: &[u8]) -> Result<T> {
    if !status.is_success() {
        return Err(LemmyError::Api {
            status: status.as_u16(),
            message: String::from_utf8_lossy(body).into_owned(),
        });
    }
    Ok(serde_json::from_slice(body)?)
}

pub struct LemmyClient {
    client: reqwest::Client,
    base_url: String,
    jwt: Option<String>,
}

impl LemmyClient {
    pub fn new(site: &str) -> Result<Self> {
        Ok(Self::with_client(http_client()?, site))
    }

    /// Build on a shared `reqwest::Client` (connection pool reuse across sites).
    pub fn with_client(client: reqwest::Client, site: &str) -> Self {
        Self {
            client,
            base_url: site_url(site),
            jwt: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_logged_in(&self) -> bool {
        self.jwt.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH, path)
    }

    fn token(&self) -> Result<&str> {
        self.jwt.as_deref().ok_or(LemmyError::NotLoggedIn)
    }

    async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        decode(status, &bytes)
    }

    /// Log in and keep the issued token for subsequent authenticated calls.
    pub async fn login(&mut self, username_or_email: &str, password: &str) -> Result<()> {
        let form = LoginForm {
            username_or_email,
            password,
        };

        let resp = self
            .client
            .post(self.endpoint("/user/login"))
            .json(&form)
            .send()
            .await?;

        let login: LoginResponse = Self::read(resp).await?;
        if login.jwt.is_none() {
            tracing::debug!(
                site = %self.base_url,
                registration_created = login.registration_created,
                verify_email_sent = login.verify_email_sent,
                "Login response carried no token"
            );
        }
        self.jwt = Some(login.into_token()?);
        Ok(())
    }

    /// One page of the public community listing. Does not require login.
    pub async fn list_communities(
        &self,
        listing_type: ListingType,
        page: u32,
        limit: u32,
    ) -> Result<Vec<CommunitySummary>> {
        let limit = page_limit(limit);
        let resp = self
            .client
            .get(self.endpoint("/community/list"))
            .query(&[
                ("type_", listing_type.as_str().to_string()),
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let listing: ListCommunitiesResponse = Self::read(resp).await?;
        Ok(listing
            .communities
            .into_iter()
            .map(|c| c.into_summary())
            .collect())
    }

    /// Look up a community by `name` or `name@instance`.
    pub async fn get_community(&self, name: &str) -> Result<CommunityView> {
        let token = self.token()?;
        let resp = self
            .client
            .get(self.endpoint("/community"))
            .bearer_auth(token)
            .query(&[("name", name)])
            .send()
            .await?;

        let found: GetCommunityResponse = Self::read(resp).await?;
        found
            .community_view
            .into_view()
            .ok_or_else(|| LemmyError::Parse(format!("community {name} has no id")))
    }

    pub async fn block_community(&self, community_id: i64, block: bool) -> Result<BlockConfirmation> {
        let token = self.token()?;
        let resp = self
            .client
            .post(self.endpoint("/community/block"))
            .bearer_auth(token)
            .json(&BlockCommunityForm {
                community_id,
                block,
            })
            .send()
            .await?;

        let confirmed: BlockCommunityResponse = Self::read(resp).await?;
        Ok(BlockConfirmation {
            blocked: confirmed.blocked,
        })
    }

    /// Hostnames this site has federation-blocked.
    pub async fn federated_instances(&self) -> Result<Vec<String>> {
        let token = self.token()?;
        let resp = self
            .client
            .get(self.endpoint("/federated_instances"))
            .bearer_auth(token)
            .send()
            .await?;

        let federated: GetFederatedInstancesResponse = Self::read(resp).await?;
        Ok(federated
            .federated_instances
            .map(|f| f.blocked.into_iter().map(InstanceEntry::into_domain).collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_url_adds_scheme_to_bare_hosts() {
        assert_eq!(site_url("lemmy.ml"), "https://lemmy.ml");
        assert_eq!(site_url("https://lemmy.world/"), "https://lemmy.world");
        assert_eq!(site_url(" http://localhost:8536 "), "http://localhost:8536");
    }

    #[test]
    fn page_limit_is_clamped() {
        assert_eq!(page_limit(500), MAX_PAGE_SIZE);
        assert_eq!(page_limit(0), 1);
        assert_eq!(page_limit(20), 20);
    }

    #[test]
    fn error_status_becomes_api_error() {
        let result: Result<LoginResponse> = decode(
            reqwest::StatusCode::BAD_REQUEST,
            br#"{"error":"incorrect_login"}"#,
        );

        match result {
            Err(LemmyError::Api { status, message }) => {
                assert_eq!(status, 400);
                assert!(message.contains("incorrect_login"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn success_with_bad_body_is_parse_error() {
        let result: Result<BlockCommunityResponse> =
            decode(reqwest::StatusCode::OK, b"<html>maintenance</html>");
        assert!(matches!(result, Err(LemmyError::Parse(_))));
    }

    #[test]
    fn login_without_jwt_is_missing_token() {
        let login: LoginResponse = decode(
            reqwest::StatusCode::OK,
            br#"{"jwt":null,"registration_created":false,"verify_email_sent":true}"#,
        )
        .unwrap();

        assert!(matches!(login.into_token(), Err(LemmyError::MissingToken)));
    }

    #[tokio::test]
    async fn authenticated_calls_require_login() {
        let client = LemmyClient::with_client(reqwest::Client::new(), "lemmy.invalid");

        assert!(!client.is_logged_in());
        assert!(matches!(
            client.get_community("rust@lemmy.ml").await,
            Err(LemmyError::NotLoggedIn)
        ));
        assert!(matches!(
            client.block_community(1, true).await,
            Err(LemmyError::NotLoggedIn)
        ));
        assert!(matches!(
            client.federated_instances().await,
            Err(LemmyError::NotLoggedIn)
        ));
    }
}
