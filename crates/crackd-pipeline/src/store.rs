//! Row-store client for caption listing and voting.
//!
//! Talks to a PostgREST-style REST surface: captions are plain rows, votes
//! are one row per (caption, profile) with upsert-on-revote semantics. Auth
//! is the store api key plus the caller's bearer token.

use anyhow::{Context, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crackd_core::models::{CaptionRow, CaptionVoteRow};
use crackd_core::Config;

/// HTTP client for the caption/vote row store.
#[derive(Clone, Debug)]
pub struct CaptionStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CaptionStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build from config; requires CRACKD_STORE_URL and CRACKD_STORE_API_KEY.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config
            .store_url
            .as_deref()
            .context("CRACKD_STORE_URL is not set")?;
        let api_key = config
            .store_api_key
            .as_deref()
            .context("CRACKD_STORE_API_KEY is not set")?;
        Self::new(base_url, api_key)
    }

    fn request(&self, method: Method, path: &str, bearer: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", self.api_key.as_str())
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn read_rows<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<Vec<T>> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Store request for {} failed with status {}: {}",
                what,
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} rows", what))
    }

    /// All captions, newest first.
    pub async fn list_captions(&self, bearer: &str) -> Result<Vec<CaptionRow>> {
        let response = self
            .request(Method::GET, "/rest/v1/captions", bearer)
            .query(&[
                ("select", "id,content,created_datetime_utc"),
                ("order", "created_datetime_utc.desc"),
            ])
            .send()
            .await
            .context("Failed to send caption list request")?;

        Self::read_rows(response, "captions").await
    }

    /// All votes for the given captions. Totals are summed by the caller.
    pub async fn list_votes(
        &self,
        bearer: &str,
        caption_ids: &[Uuid],
    ) -> Result<Vec<CaptionVoteRow>> {
        if caption_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = caption_ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .request(Method::GET, "/rest/v1/caption_votes", bearer)
            .query(&[
                ("select", "id,caption_id,profile_id,vote_value".to_string()),
                ("caption_id", format!("in.({})", ids)),
            ])
            .send()
            .await
            .context("Failed to send vote list request")?;

        Self::read_rows(response, "caption_votes").await
    }

    /// The caller's existing vote on a caption, if any.
    pub async fn find_vote(
        &self,
        bearer: &str,
        caption_id: Uuid,
        profile_id: Uuid,
    ) -> Result<Option<CaptionVoteRow>> {
        let response = self
            .request(Method::GET, "/rest/v1/caption_votes", bearer)
            .query(&[
                ("select", "id,caption_id,profile_id,vote_value".to_string()),
                ("caption_id", format!("eq.{}", caption_id)),
                ("profile_id", format!("eq.{}", profile_id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await
            .context("Failed to send vote lookup request")?;

        let mut rows: Vec<CaptionVoteRow> = Self::read_rows(response, "caption_votes").await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    /// Record a +1/-1 vote, one per user per caption: an existing row is
    /// updated in place, otherwise a new row is inserted.
    pub async fn cast_vote(
        &self,
        bearer: &str,
        caption_id: Uuid,
        profile_id: Uuid,
        vote_value: i32,
    ) -> Result<()> {
        anyhow::ensure!(
            vote_value == 1 || vote_value == -1,
            "vote value must be +1 or -1, got {}",
            vote_value
        );

        let existing = self.find_vote(bearer, caption_id, profile_id).await?;

        let response = match &existing {
            Some(vote) => self
                .request(Method::PATCH, "/rest/v1/caption_votes", bearer)
                .query(&[("id", format!("eq.{}", vote.id))])
                .header("Prefer", "return=minimal")
                .json(&json!({ "vote_value": vote_value }))
                .send()
                .await
                .context("Failed to send vote update")?,
            None => self
                .request(Method::POST, "/rest/v1/caption_votes", bearer)
                .header("Prefer", "return=minimal")
                .json(&json!({
                    "caption_id": caption_id,
                    "profile_id": profile_id,
                    "vote_value": vote_value,
                }))
                .send()
                .await
                .context("Failed to send vote insert")?,
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Vote write failed with status {}: {}",
                status,
                error_text
            ));
        }

        tracing::debug!(
            caption_id = %caption_id,
            vote_value,
            updated = existing.is_some(),
            "Vote recorded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn store_for(server: &mockito::ServerGuard) -> CaptionStore {
        CaptionStore::new(&server.url(), "anon-key").unwrap()
    }

    #[tokio::test]
    async fn lists_captions_with_store_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/captions")
            .match_query(Matcher::Any)
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer user-token")
            .with_status(200)
            .with_body(
                r#"[{"id":"8c5f8a9e-3f49-4f6f-9f39-31a1a8ec6d5f",
                     "content":"first caption",
                     "created_datetime_utc":"2026-01-02T03:04:05Z"}]"#,
            )
            .create_async()
            .await;

        let store = store_for(&server);
        let rows = store.list_captions("user-token").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "first caption");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_caption_set_skips_vote_request() {
        let server = mockito::Server::new_async().await;
        // No mock registered: any request would fail the test via error.
        let store = store_for(&server);
        let votes = store.list_votes("user-token", &[]).await.unwrap();
        assert!(votes.is_empty());
        drop(server);
    }

    #[tokio::test]
    async fn revote_updates_the_existing_row() {
        let mut server = mockito::Server::new_async().await;
        let caption_id = Uuid::new_v4();
        let profile_id = Uuid::new_v4();
        let vote_id = Uuid::new_v4();

        server
            .mock("GET", "/rest/v1/caption_votes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(format!(
                r#"[{{"id":"{vote_id}","caption_id":"{caption_id}","profile_id":"{profile_id}","vote_value":1}}]"#
            ))
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", "/rest/v1/caption_votes")
            .match_query(Matcher::UrlEncoded("id".into(), format!("eq.{vote_id}")))
            .match_body(Matcher::Json(json!({ "vote_value": -1 })))
            .with_status(204)
            .create_async()
            .await;

        let store = store_for(&server);
        store
            .cast_vote("user-token", caption_id, profile_id, -1)
            .await
            .unwrap();
        patch.assert_async().await;
    }

    #[tokio::test]
    async fn first_vote_inserts_a_row() {
        let mut server = mockito::Server::new_async().await;
        let caption_id = Uuid::new_v4();
        let profile_id = Uuid::new_v4();

        server
            .mock("GET", "/rest/v1/caption_votes")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let post = server
            .mock("POST", "/rest/v1/caption_votes")
            .match_body(Matcher::Json(json!({
                "caption_id": caption_id,
                "profile_id": profile_id,
                "vote_value": 1,
            })))
            .with_status(201)
            .create_async()
            .await;

        let store = store_for(&server);
        store
            .cast_vote("user-token", caption_id, profile_id, 1)
            .await
            .unwrap();
        post.assert_async().await;
    }

    #[tokio::test]
    async fn rejects_out_of_range_vote_values() {
        let server = mockito::Server::new_async().await;
        let store = store_for(&server);
        let err = store
            .cast_vote("user-token", Uuid::new_v4(), Uuid::new_v4(), 2)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("+1 or -1"));
    }
}
