//! HTTP implementation of [`TaskBackend`] against the Orbit API.

use std::time::Duration;

use async_trait::async_trait;
use ob_domain::error::{Error, FieldError, Result};
use ob_domain::{Energy, FocusSession, Mode, NewReflection, NewTask, Reflection, Task, TaskPatch};
use ob_messaging::{ContextualMessageRequest, ContextualMessageResponse};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::TaskBackend;

/// Page size requested when walking the reflection list.
const REFLECTION_PAGE: usize = 100;

#[derive(Deserialize)]
struct TaskList {
    tasks: Vec<Task>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReflectionPage {
    reflections: Vec<Reflection>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartSessionBody {
    mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    energy: Option<Energy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<Uuid>,
}

#[derive(Serialize)]
struct EndSessionBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    energy: Option<Energy>,
}

#[derive(Deserialize)]
struct SessionEnvelope {
    session: Option<FocusSession>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    fields: Vec<FieldError>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn send<T: DeserializeOwned>(&self, rb: RequestBuilder) -> Result<T> {
        let resp = self.authed(rb).send().await.map_err(from_reqwest)?;
        let resp = check(resp).await?;
        resp.json::<T>().await.map_err(from_reqwest)
    }
}

fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Map non-2xx responses onto the shared error type.
async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let message = body
        .as_ref()
        .map(|b| b.error.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("{status}"));

    Err(match status {
        StatusCode::BAD_REQUEST => match body {
            Some(b) if !b.fields.is_empty() => Error::Validation(b.fields),
            _ => Error::invalid("body", message),
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Http(format!("{status}: {message}")),
    })
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn list_tasks(&self) -> Result<Vec<Task>> {
        let list: TaskList = self.send(self.http.get(self.url("/api/tasks"))).await?;
        Ok(list.tasks)
    }

    async fn create_task(&self, input: &NewTask) -> Result<Task> {
        self.send(self.http.post(self.url("/api/tasks")).json(input))
            .await
    }

    async fn update_task(&self, id: Uuid, patch: &TaskPatch) -> Result<Task> {
        self.send(
            self.http
                .patch(self.url(&format!("/api/tasks/{id}")))
                .json(patch),
        )
        .await
    }

    async fn list_reflections(&self) -> Result<Vec<Reflection>> {
        let mut all = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut rb = self
                .http
                .get(self.url("/api/reflections"))
                .query(&[("limit", REFLECTION_PAGE.to_string())]);
            if let Some(ref c) = cursor {
                rb = rb.query(&[("cursor", c)]);
            }
            let page: ReflectionPage = self.send(rb).await?;
            all.extend(page.reflections);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => return Ok(all),
            }
        }
    }

    async fn create_reflection(&self, input: &NewReflection) -> Result<Reflection> {
        self.send(self.http.post(self.url("/api/reflections")).json(input))
            .await
    }

    async fn start_session(
        &self,
        mode: Mode,
        energy: Option<Energy>,
        task_id: Option<Uuid>,
    ) -> Result<FocusSession> {
        let body = StartSessionBody {
            mode,
            energy,
            task_id,
        };
        self.send(self.http.post(self.url("/api/sessions")).json(&body))
            .await
    }

    async fn end_session(&self, energy: Option<Energy>) -> Result<Option<FocusSession>> {
        let ended: SessionEnvelope = self
            .send(
                self.http
                    .post(self.url("/api/sessions/end"))
                    .json(&EndSessionBody { energy }),
            )
            .await?;
        Ok(ended.session)
    }

    async fn contextual_message(
        &self,
        req: &ContextualMessageRequest,
    ) -> Result<ContextualMessageResponse> {
        self.send(
            self.http
                .post(self.url("/api/contextual-message"))
                .json(req),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = ApiClient::new("http://localhost:4000/", None, Duration::from_secs(1)).unwrap();
        assert_eq!(c.url("/api/tasks"), "http://localhost:4000/api/tasks");
    }

    #[test]
    fn error_body_shape_parses() {
        let b: ErrorBody = serde_json::from_str(
            r#"{"error":"validation failed","fields":[{"field":"title","message":"required"}]}"#,
        )
        .unwrap();
        assert_eq!(b.fields[0].field, "title");
    }

    #[test]
    fn session_bodies_match_the_api() {
        let body = StartSessionBody {
            mode: Mode::Flow,
            energy: Energy::new(40).ok(),
            task_id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "mode": "flow", "energy": 40 })
        );

        let ended: SessionEnvelope = serde_json::from_str(r#"{"session":null}"#).unwrap();
        assert!(ended.session.is_none());
    }
}
