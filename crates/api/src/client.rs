//! HTTP adapter for the remote backend.
//!
//! One `HttpBackend` implements every contract in [`crate::backend`] against
//! a single base URL. Status mapping is centralized in `check`: a 401 tears
//! the session down before the error ever reaches a controller, so callers
//! never have to special-case expired tokens.

use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use lms_core::model::{
    Course, CourseId, Progress, Quiz, QuizSubmission, Resource, ResourceId, SubmissionId, User,
    UserId,
};

use crate::backend::{
    AdminApi, AuthApi, Backend, CourseApi, ProgressApi, QuizApi, ResourceApi,
};
use crate::error::ApiError;
use crate::schema::{
    AssignmentRequest, CourseDraft, CoursePatch, CourseRecord, LoginOutcome,
    LoginRequest, LoginResponse, ProgressOverview, ProgressRecord, ProgressUpdate, QuizGenParams,
    QuizRecord, QuizSubmitRequest, ResourceDraft, ResourceRecord, SignupRequest, SubmissionRecord,
    UserDetailedReport, UserPatch, UserRecord, UserReportItem, UserStats,
};
use crate::session::SessionHandle;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    base_url: Url,
}

impl ApiConfig {
    /// Builds a config for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` for malformed input.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url.trim())?,
        })
    }

    /// Reads `LMS_API_BASE_URL`, falling back to the development default.
    ///
    /// # Errors
    ///
    /// Returns `url::ParseError` if the variable is set to a malformed URL.
    pub fn from_env() -> Result<Self, url::ParseError> {
        match env::var("LMS_API_BASE_URL") {
            Ok(value) if !value.trim().is_empty() => Self::new(&value),
            _ => Self::new(DEFAULT_BASE_URL),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Backend adapter speaking JSON over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
    session: SessionHandle,
}

impl HttpBackend {
    #[must_use]
    pub fn new(config: &ApiConfig, session: SessionHandle) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url().clone(),
            session,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|err| ApiError::Transport(format!("invalid endpoint path {path}: {err}")))
    }

    /// Attaches the bearer token when a session is present. Unauthenticated
    /// requests (login, signup) simply go out without one.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Maps response status to the error taxonomy. A 401 is terminal for the
    /// session: credentials are cleared and forced-logout hooks run here,
    /// once, no matter which endpoint tripped it.
    async fn check(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("backend returned 401, ending session");
            self.session.force_logout();
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    /// Pulls the backend's `detail` field out of an error body, falling back
    /// to the raw text.
    async fn error_detail(response: Response) -> String {
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(body) => body
                .get("detail")
                .and_then(serde_json::Value::as_str)
                .map_or(text, str::to_owned),
            Err(_) => text,
        }
    }

    async fn get(&self, path: &str) -> Result<Response, ApiError> {
        debug!(path, "GET");
        let url = self.url(path)?;
        let response = self.authorize(self.http.get(url)).send().await?;
        self.check(response).await
    }

    async fn post<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        debug!(path, "POST");
        let url = self.url(path)?;
        let response = self.authorize(self.http.post(url).json(body)).send().await?;
        self.check(response).await
    }

    async fn post_empty(&self, path: &str) -> Result<Response, ApiError> {
        debug!(path, "POST");
        let url = self.url(path)?;
        let response = self.authorize(self.http.post(url)).send().await?;
        self.check(response).await
    }

    async fn put<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        debug!(path, "PUT");
        let url = self.url(path)?;
        let response = self.authorize(self.http.put(url).json(body)).send().await?;
        self.check(response).await
    }

    async fn delete(&self, path: &str) -> Result<Response, ApiError> {
        debug!(path, "DELETE");
        let url = self.url(path)?;
        let response = self.authorize(self.http.delete(url)).send().await?;
        self.check(response).await
    }
}

impl Backend {
    /// Backend wired to a remote server; every concern shares one client
    /// and one session handle.
    #[must_use]
    pub fn http(config: &ApiConfig, session: SessionHandle) -> Self {
        let adapter = HttpBackend::new(config, session);
        Self {
            auth: Arc::new(adapter.clone()),
            courses: Arc::new(adapter.clone()),
            progress: Arc::new(adapter.clone()),
            quizzes: Arc::new(adapter.clone()),
            resources: Arc::new(adapter.clone()),
            admin: Arc::new(adapter),
        }
    }
}

async fn decode_courses(response: Response) -> Result<Vec<Course>, ApiError> {
    let records: Vec<CourseRecord> = response.json().await?;
    let courses = records
        .into_iter()
        .map(CourseRecord::into_course)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(courses)
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, ApiError> {
        let response = self.post("/api/login", request).await?;
        let body: LoginResponse = response.json().await?;
        Ok(LoginOutcome {
            access_token: body.access_token,
            user: body.user.into_user()?,
        })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<User, ApiError> {
        let response = self.post("/signup", request).await?;
        let record: UserRecord = response.json().await?;
        Ok(record.into_user()?)
    }
}

#[async_trait]
impl CourseApi for HttpBackend {
    async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        decode_courses(self.get("/courses/").await?).await
    }

    async fn my_courses(&self) -> Result<Vec<Course>, ApiError> {
        decode_courses(self.get("/my-courses/").await?).await
    }

    async fn get_course(&self, id: CourseId) -> Result<Course, ApiError> {
        let response = self.get(&format!("/courses/{id}")).await?;
        let record: CourseRecord = response.json().await?;
        Ok(record.into_course()?)
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course, ApiError> {
        let response = self.post("/courses/", draft).await?;
        let record: CourseRecord = response.json().await?;
        Ok(record.into_course()?)
    }

    async fn update_course(&self, id: CourseId, patch: &CoursePatch) -> Result<Course, ApiError> {
        let response = self.put(&format!("/courses/{id}"), patch).await?;
        let record: CourseRecord = response.json().await?;
        Ok(record.into_course()?)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), ApiError> {
        self.delete(&format!("/courses/{id}")).await?;
        Ok(())
    }

    async fn auto_generate_quiz(&self, id: CourseId) -> Result<Quiz, ApiError> {
        let response = self
            .post_empty(&format!("/api/courses/{id}/auto-generate-quiz"))
            .await?;
        let record: QuizRecord = response.json().await?;
        Ok(record.into_quiz()?)
    }

    async fn generate_quiz(&self, id: CourseId, params: &QuizGenParams) -> Result<Quiz, ApiError> {
        debug!(path = %format!("/api/generate-quiz/{id}"), "POST");
        let url = self.url(&format!("/api/generate-quiz/{id}"))?;
        let response = self
            .authorize(self.http.post(url).query(params))
            .send()
            .await?;
        let response = self.check(response).await?;
        let record: QuizRecord = response.json().await?;
        Ok(record.into_quiz()?)
    }
}

#[async_trait]
impl ProgressApi for HttpBackend {
    async fn get_progress(&self, course_id: CourseId) -> Result<Option<Progress>, ApiError> {
        // Missing progress means "not started"; only this endpoint treats
        // 404 as an empty state rather than an error.
        match self.get(&format!("/progress/{course_id}")).await {
            Ok(response) => {
                let record: ProgressRecord = response.json().await?;
                Ok(Some(record.into_progress()?))
            }
            Err(ApiError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn put_progress(
        &self,
        course_id: CourseId,
        update: &ProgressUpdate,
    ) -> Result<Progress, ApiError> {
        let response = self.put(&format!("/progress/{course_id}"), update).await?;
        let record: ProgressRecord = response.json().await?;
        Ok(record.into_progress()?)
    }

    async fn user_progress(&self) -> Result<Vec<ProgressOverview>, ApiError> {
        let response = self.get("/api/user/progress").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl QuizApi for HttpBackend {
    async fn submit_quiz(&self, request: &QuizSubmitRequest) -> Result<QuizSubmission, ApiError> {
        let response = self.post("/quizzes/submit", request).await?;
        let record: SubmissionRecord = response.json().await?;
        Ok(record.into_submission())
    }

    async fn quiz_history(&self) -> Result<Vec<QuizSubmission>, ApiError> {
        let response = self.get("/quizzes/history").await?;
        let records: Vec<SubmissionRecord> = response.json().await?;
        Ok(records
            .into_iter()
            .map(SubmissionRecord::into_submission)
            .collect())
    }

    async fn quiz_result(&self, id: SubmissionId) -> Result<QuizSubmission, ApiError> {
        let response = self.get(&format!("/quizzes/result/{id}")).await?;
        let record: SubmissionRecord = response.json().await?;
        Ok(record.into_submission())
    }

    async fn user_stats(&self) -> Result<UserStats, ApiError> {
        let response = self.get("/api/user/stats").await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ResourceApi for HttpBackend {
    async fn list_resources(&self, course_id: CourseId) -> Result<Vec<Resource>, ApiError> {
        let response = self.get(&format!("/courses/{course_id}/resources")).await?;
        let records: Vec<ResourceRecord> = response.json().await?;
        let resources = records
            .into_iter()
            .map(ResourceRecord::into_resource)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(resources)
    }

    async fn create_resource(
        &self,
        course_id: CourseId,
        draft: &ResourceDraft,
    ) -> Result<Resource, ApiError> {
        let response = self
            .post(&format!("/courses/{course_id}/resources"), draft)
            .await?;
        let record: ResourceRecord = response.json().await?;
        Ok(record.into_resource()?)
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<(), ApiError> {
        self.delete(&format!("/resources/{id}")).await?;
        Ok(())
    }
}

#[async_trait]
impl AdminApi for HttpBackend {
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.get("/users/").await?;
        let records: Vec<UserRecord> = response.json().await?;
        let users = records
            .into_iter()
            .map(UserRecord::into_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    async fn update_user(&self, id: UserId, patch: &UserPatch) -> Result<User, ApiError> {
        let response = self.put(&format!("/users/{id}"), patch).await?;
        let record: UserRecord = response.json().await?;
        Ok(record.into_user()?)
    }

    async fn delete_user(&self, id: UserId) -> Result<User, ApiError> {
        let response = self.delete(&format!("/users/{id}")).await?;
        let record: UserRecord = response.json().await?;
        Ok(record.into_user()?)
    }

    async fn assign_course(&self, request: &AssignmentRequest) -> Result<(), ApiError> {
        self.post("/assignments/", request).await?;
        Ok(())
    }

    async fn admin_reports(&self) -> Result<Vec<UserReportItem>, ApiError> {
        let response = self.get("/admin/reports").await?;
        Ok(response.json().await?)
    }

    async fn user_report(&self, id: UserId) -> Result<UserDetailedReport, ApiError> {
        let response = self.get(&format!("/admin/reports/{id}")).await?;
        Ok(response.json().await?)
    }

    async fn recent_activity(&self) -> Result<Vec<User>, ApiError> {
        let response = self.get("/admin/recent-activity").await?;
        let records: Vec<UserRecord> = response.json().await?;
        let users = records
            .into_iter()
            .map(UserRecord::into_user)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_parses_explicit_url() {
        let config = ApiConfig::new(" https://lms.example.com ").unwrap();
        assert_eq!(config.base_url().as_str(), "https://lms.example.com/");
    }

    #[test]
    fn config_rejects_garbage() {
        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn default_base_url_is_local_dev() {
        let config = ApiConfig::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/");
    }
}
