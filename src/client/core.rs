use crate::client::decode::{decode, decode_empty};
use crate::client::endpoint::Endpoint;
use crate::client::execution::{CallStats, Executor};
use crate::client::validation::{UploadDescriptor, UploadValidator};
use crate::config::ClientConfig;
use crate::session::AnswerFileProvider;
use crate::transport::ProgressFn;
use crate::types::{
    Article, ArticleData, ArticlePreview, ArticlesPreviewData, CreateSessionRequest,
    RecordingSession, SessionData, SpeakingAssessmentResults, Topic, TopicsData,
};
use crate::Result;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// Typed client for the EnglishApp backend.
///
/// Cheap to clone; clones share the connection pool and retry strategy.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) executor: Executor,
    pub(crate) validator: Arc<UploadValidator>,
    pub(crate) cancel: CancellationToken,
}

impl ApiClient {
    /// Client for the profile selected by the process environment.
    pub fn from_env() -> Result<Self> {
        crate::client::builder::ApiClientBuilder::new()
            .config(ClientConfig::from_env()?)
            .build()
    }

    pub fn builder() -> crate::client::builder::ApiClientBuilder {
        crate::client::builder::ApiClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A handle whose calls abort once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            cancel: token,
            ..self.clone()
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Execute an endpoint and decode its `data` payload.
    pub async fn call<T: DeserializeOwned>(&self, endpoint: Endpoint<T>) -> Result<T> {
        self.call_with_stats(endpoint).await.map(|(value, _)| value)
    }

    pub async fn call_with_stats<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint<T>,
    ) -> Result<(T, CallStats)> {
        let (raw, stats) = self
            .executor
            .execute(endpoint.spec(), None, &self.cancel)
            .await?;
        let value = decode(&raw)?;
        Ok((value, stats))
    }

    pub async fn list_topics(&self) -> Result<Vec<Topic>> {
        let data = self.call(Endpoint::<TopicsData>::get("/topics")).await?;
        Ok(data.topics)
    }

    pub async fn create_session(&self, topic_id: i64) -> Result<RecordingSession> {
        let endpoint =
            Endpoint::<SessionData>::post("/sessions").with_json(&CreateSessionRequest { topic_id })?;
        let data = self.call(endpoint).await?;
        Ok(data.session)
    }

    /// Validate the recording locally, then stream it as multipart form data.
    ///
    /// `progress` receives the sent fraction; it restarts from zero if the
    /// upload is retried.
    pub async fn upload_answer(
        &self,
        path: impl AsRef<Path>,
        session_id: Uuid,
        question_id: i64,
        progress: Option<ProgressFn>,
    ) -> Result<()> {
        let descriptor = UploadDescriptor::new(
            path.as_ref(),
            format!("/sessions/{}/answer", session_id),
            "answer",
        )
        .with_text("questionID", question_id);

        let upload = self.validator.validate(descriptor)?;
        debug!(
            session_id = %session_id,
            question_id,
            size = upload.size(),
            "upload validated"
        );

        let endpoint = Endpoint::<()>::upload(upload);
        let (raw, _) = self
            .executor
            .execute(endpoint.spec(), progress, &self.cancel)
            .await?;
        decode_empty(&raw)
    }

    /// Upload the answer recorded for `question_id`, located through `provider`.
    pub async fn upload_recorded_answer(
        &self,
        provider: &dyn AnswerFileProvider,
        session_id: Uuid,
        question_id: i64,
        progress: Option<ProgressFn>,
    ) -> Result<()> {
        let path = provider.answer_path(session_id, question_id).await?;
        self.upload_answer(path, session_id, question_id, progress)
            .await
    }

    pub async fn complete_session(&self, session_id: Uuid) -> Result<SpeakingAssessmentResults> {
        self.call(Endpoint::post(format!("/sessions/{}/complete", session_id)))
            .await
    }

    pub async fn list_article_previews(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<ArticlePreview>> {
        let endpoint = Endpoint::<ArticlesPreviewData>::get("/articles")
            .with_query("limit", limit)
            .with_query("offset", offset);
        Ok(self.call(endpoint).await?.articles)
    }

    pub async fn get_article(&self, id: i64) -> Result<Article> {
        let data = self
            .call(Endpoint::<ArticleData>::get(format!("/articles/{}", id)))
            .await?;
        Ok(data.article)
    }
}
