//! Client of the AWSEd REST API, the directory holding users, teams and
//! quotas of the DSMLP cluster.

use async_trait::async_trait;
use dsmlp_policy_engine::{
    clients::{IdentityProvider, Team, User},
    errors::ClientError,
};
use reqwest::{header, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use url::Url;

use crate::config::AwsedConfig;

#[derive(Deserialize)]
struct UserResponse {
    uid: i64,
    #[serde(default)]
    enrollments: Vec<String>,
}

#[derive(Deserialize)]
struct TeamJson {
    gid: i64,
}

#[derive(Deserialize)]
struct ListTeamsResponse {
    #[serde(default)]
    teams: Vec<TeamJson>,
}

#[derive(Deserialize)]
struct QuotaJson {
    gpu: Option<i64>,
}

#[derive(Deserialize)]
struct QuotaResponse {
    quota: Option<QuotaJson>,
}

pub struct AwsedClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl AwsedClient {
    pub fn new(config: &AwsedConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut authorization =
            header::HeaderValue::from_str(&format!("AWSEd api_key={}", config.api_key))?;
        authorization.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, authorization);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(AwsedClient {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Build `{endpoint}/{segments}`, each segment is percent encoded
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Request(format!("invalid AWSEd endpoint {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET the resource at `url`, `None` when it does not exist
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, ClientError> {
        debug!(url = url.as_str(), "AWSEd request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for AwsedClient {
    async fn describe_user(&self, username: &str) -> Result<Option<User>, ClientError> {
        let url = self.url(&["users", username])?;
        let user = self.get::<UserResponse>(url).await?;

        Ok(user.map(|user| User {
            uid: user.uid,
            enrollments: user.enrollments,
        }))
    }

    async fn list_user_teams(&self, username: &str) -> Result<Vec<Team>, ClientError> {
        let mut url = self.url(&["teams"])?;
        url.query_pairs_mut().append_pair("username", username);
        let teams = self.get::<ListTeamsResponse>(url).await?;

        Ok(teams
            .map(|response| {
                response
                    .teams
                    .into_iter()
                    .map(|team| Team { gid: team.gid })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_user_gpu_quota(&self, username: &str) -> Result<Option<i64>, ClientError> {
        let url = self.url(&["quotas", username])?;
        let quota = self.get::<QuotaResponse>(url).await?;

        Ok(quota
            .and_then(|response| response.quota)
            .and_then(|quota| quota.gpu))
    }
}
