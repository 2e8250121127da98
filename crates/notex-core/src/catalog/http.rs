//! PostgREST-style catalog client.
//!
//! Speaks the REST dialect of the original backend: one endpoint per table,
//! `select`/`order` query params, `{column}=eq.{value}` filters, `apikey`
//! plus bearer auth headers. Notes live in a `topic_notes` table keyed by
//! `topic_id` with an optional `exam_id` scope; upserts ride on
//! `Prefer: resolution=merge-duplicates`.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use super::{CatalogError, NoteMeta};
use crate::config::{CatalogConfig, resolve_api_key};
use crate::hierarchy::{Level, Node};

const QUESTIONS_TABLE: &str = "questions_topic_wise";
const NOTES_TABLE: &str = "topic_notes";

/// Connection settings for the HTTP catalog.
#[derive(Debug, Clone)]
pub struct HttpCatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl HttpCatalogConfig {
    /// Builds settings from the `[catalog]` config section and environment.
    ///
    /// The API key resolves config-first with `NOTEX_CATALOG_KEY` as
    /// fallback; the base URL resolves `NOTEX_CATALOG_URL` first, then
    /// config. There is no default URL: the backend is the user's project.
    pub fn from_env(config: &CatalogConfig) -> Result<Self> {
        let api_key = resolve_api_key(config.api_key.as_deref(), "NOTEX_CATALOG_KEY", "catalog")?;

        let env_url = std::env::var("NOTEX_CATALOG_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let base_url = env_url
            .or_else(|| {
                config
                    .base_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
            })
            .context(
                "No catalog base URL configured. Set NOTEX_CATALOG_URL or base_url in [catalog].",
            )?;
        url::Url::parse(&base_url)
            .with_context(|| format!("Invalid catalog base URL: {base_url}"))?;

        Ok(Self { base_url, api_key })
    }
}

/// Catalog client over one PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    config: HttpCatalogConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct QuestionRow {
    #[serde(default)]
    question_statement: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteRow {
    body: String,
    #[serde(default)]
    exam_id: Option<String>,
}

impl HttpCatalog {
    pub fn new(config: HttpCatalogConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Fetches the root rows (exams), ordered by name.
    pub async fn fetch_root(&self) -> Result<Vec<Node>, CatalogError> {
        let rows: Vec<NameRow> = self
            .get_rows(
                Level::Exam.table(),
                &[("select", "id,name"), ("order", "name")],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Node::root(row.id, row.name))
            .collect())
    }

    /// Fetches `level` rows under `parent_id`, ordered by name.
    pub async fn fetch_children(
        &self,
        level: Level,
        parent_id: &str,
    ) -> Result<Vec<Node>, CatalogError> {
        let Some(parent_key) = level.parent_key() else {
            return self.fetch_root().await;
        };
        let filter = format!("eq.{parent_id}");
        let rows: Vec<NameRow> = self
            .get_rows(
                level.table(),
                &[
                    ("select", "id,name"),
                    (parent_key, filter.as_str()),
                    ("order", "name"),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| Node::child(row.id, row.name, parent_id))
            .collect())
    }

    /// Fetches question statements tied to a topic, null rows dropped.
    pub async fn fetch_related_questions(
        &self,
        topic_id: &str,
    ) -> Result<Vec<String>, CatalogError> {
        let filter = format!("eq.{topic_id}");
        let rows: Vec<QuestionRow> = self
            .get_rows(
                QUESTIONS_TABLE,
                &[
                    ("select", "question_statement"),
                    ("topic_id", filter.as_str()),
                    ("question_statement", "not.is.null"),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.question_statement)
            .filter(|q| !q.trim().is_empty())
            .collect())
    }

    /// Reads saved notes for a topic; the exam-scoped row wins when both a
    /// scoped and a generic row exist.
    pub async fn read_notes(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
    ) -> Result<Option<String>, CatalogError> {
        let filter = format!("eq.{topic_id}");
        let rows: Vec<NoteRow> = self
            .get_rows(
                NOTES_TABLE,
                &[("select", "body,exam_id"), ("topic_id", filter.as_str())],
            )
            .await?;

        let scoped = exam_id.and_then(|exam| {
            rows.iter()
                .find(|row| row.exam_id.as_deref() == Some(exam))
        });
        let chosen = scoped.or_else(|| rows.iter().find(|row| row.exam_id.is_none()));
        Ok(chosen.map(|row| row.body.clone()))
    }

    /// Upserts a note row for the topic/exam scope.
    pub async fn write_notes(
        &self,
        topic_id: &str,
        exam_id: Option<&str>,
        text: &str,
        meta: &NoteMeta,
    ) -> Result<(), CatalogError> {
        let url = self.table_url(NOTES_TABLE);
        let body = json!({
            "topic_id": topic_id,
            "exam_id": exam_id,
            "body": text,
            "saved_at": meta.saved_at,
            "revision": meta.revision,
        });

        let response = self
            .http
            .post(&url)
            .headers(self.headers())
            .header("prefer", "resolution=merge-duplicates")
            .json(&body)
            .send()
            .await
            .map_err(|e| CatalogError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CatalogError::http_status(status.as_u16(), &error_body));
        }
        Ok(())
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, CatalogError> {
        let url = self.table_url(table);
        let response = self
            .http
            .get(&url)
            .headers(self.headers())
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CatalogError::http_status(status.as_u16(), &error_body));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::parse(format!("Invalid {table} response: {e}")))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.config.base_url.trim_end_matches('/'))
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.config.api_key)
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        let bearer = format!("Bearer {}", self.config.api_key);
        headers.insert(
            "authorization",
            HeaderValue::from_str(&bearer).unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert("user-agent", HeaderValue::from_static(crate::USER_AGENT));
        headers
    }
}
