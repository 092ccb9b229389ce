//! Stateful walk through the GlobalSearch form pages.
//!
//! The search tool keys each step off the session cookie set by the previous
//! one, so every fetch starts a fresh cookie-backed session and replays the
//! flow from the main page.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::errors::NavigationError;
use super::middleware::TransientRetryMiddleware;
use super::{GLOBALSEARCH_ORIGIN, GLOBALSEARCH_URL};
use crate::utils::fmt_duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/137.0.0.0 Safari/537.36";

/// Browser-like headers sent on every request.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"137\", \"Chromium\";v=\"137\", \"Not/A)Brand\";v=\"24\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("upgrade-insecure-requests", "1"),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
         image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
    ),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-user", "?1"),
    ("sec-fetch-dest", "document"),
    ("accept-language", "en-US,en;q=0.9"),
];

/// A form choice: the label shown to users and the value the form submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormChoice {
    pub name: String,
    pub key: String,
}

impl FormChoice {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }
}

/// Everything the results page needs to list a subject's classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassQuery {
    pub school: FormChoice,
    /// Name is the full term name, e.g. "2025 Spring Term".
    pub term: FormChoice,
    pub subject: FormChoice,
    pub career: FormChoice,
    pub open_only: bool,
}

/// Source of raw GlobalSearch pages.
///
/// Implemented by [`Navigator`] over HTTP; tests substitute canned HTML.
#[async_trait]
pub trait ClassSearch: Send + Sync {
    /// The main page with the term dropdown and institution checkboxes.
    async fn fetch_main_page(&self) -> Result<String, NavigationError>;

    /// The subject page for a school and term.
    async fn fetch_subject_page(
        &self,
        school: &FormChoice,
        term: &FormChoice,
    ) -> Result<String, NavigationError>;

    /// The class results page for a full query.
    async fn fetch_class_results(&self, query: &ClassQuery) -> Result<String, NavigationError>;
}

/// HTTP settings for a [`Navigator`].
#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub base_url: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff_factor: f64,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            base_url: GLOBALSEARCH_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_backoff_factor: 0.5,
        }
    }
}

/// Walks the GlobalSearch form flow over HTTP.
#[derive(Debug, Clone)]
pub struct Navigator {
    options: NavigatorOptions,
}

impl Navigator {
    pub fn new(options: NavigatorOptions) -> Self {
        Self { options }
    }

    /// A fresh client with its own cookie jar, default headers and retry policy.
    fn session(&self) -> Result<Session<'_>, NavigationError> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(self.options.request_timeout)
            .build()
            .map_err(NavigationError::Client)?;

        let client = ClientBuilder::new(client)
            .with(TransientRetryMiddleware::new(
                self.options.max_retries,
                self.options.retry_backoff_factor,
            ))
            .build();

        Ok(Session {
            client,
            url: &self.options.base_url,
        })
    }
}

/// One cookie-sharing pass through the form flow.
struct Session<'a> {
    client: ClientWithMiddleware,
    url: &'a str,
}

impl Session<'_> {
    async fn main_page(&self) -> Result<String, NavigationError> {
        let request = self.client.get(self.url).header("sec-fetch-site", "none");
        self.send("main", request).await
    }

    async fn subject_page(
        &self,
        school: &FormChoice,
        term: &FormChoice,
    ) -> Result<String, NavigationError> {
        let form = [
            ("selectedInstName", format!("{} | ", school.name)),
            ("inst_selection", school.key.clone()),
            ("selectedTermName", term.name.clone()),
            ("term_value", term.key.clone()),
            ("next_btn", "Next".to_string()),
        ];
        let request = self.form_post().form(&form);
        self.send("subject", request).await
    }

    async fn results_page(&self, query: &ClassQuery) -> Result<String, NavigationError> {
        let mut form: Vec<(&str, String)> = vec![
            ("selectedSubjectName", query.subject.name.clone()),
            ("subject_name", query.subject.key.clone()),
            ("selectedCCareerName", query.career.name.clone()),
            ("courseCareer", query.career.key.clone()),
        ];
        if query.open_only {
            form.push(("open_class", "O".to_string()));
        }
        form.extend(
            [
                ("selectedCAttrName", ""),
                ("courseAttr", ""),
                ("selectedCAttrVName", ""),
                ("courseAttValue", ""),
                ("selectedReqDName", ""),
                ("reqDesignation", ""),
                ("selectedSessionName", ""),
                ("class_session", ""),
                ("selectedModeInsName", ""),
                ("meetingStart", "LT"),
                ("selectedMeetingStartName", "less than"),
                ("meetingStartText", ""),
                ("AndMeetingStartText", ""),
                ("meetingEnd", "LE"),
                ("selectedMeetingEndName", "less than or equal to"),
                ("meetingEndText", ""),
                ("AndMeetingEndText", ""),
                ("daysOfWeek", "I"),
                ("selectedDaysOfWeekName", "include only these days"),
                ("instructor", "B"),
                ("selectedInstructorName", "begins with"),
                ("instructorName", ""),
                ("search_btn_search", "Search"),
            ]
            .map(|(name, value)| (name, value.to_string())),
        );

        let request = self.form_post().form(&form);
        self.send("results", request).await
    }

    fn form_post(&self) -> RequestBuilder {
        self.client
            .post(self.url)
            .header(header::CACHE_CONTROL, "max-age=0")
            .header(header::ORIGIN, GLOBALSEARCH_ORIGIN)
            .header("sec-fetch-site", "same-origin")
            .header(header::REFERER, self.url)
    }

    async fn send(&self, step: &'static str, request: RequestBuilder) -> Result<String, NavigationError> {
        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|source| NavigationError::Request { step, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigationError::Status {
                step,
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| NavigationError::Body { step, source })?;
        trace!(step, bytes = body.len(), duration = fmt_duration(start.elapsed()), "Fetched page");
        Ok(body)
    }
}

#[async_trait]
impl ClassSearch for Navigator {
    async fn fetch_main_page(&self) -> Result<String, NavigationError> {
        self.session()?.main_page().await
    }

    async fn fetch_subject_page(
        &self,
        school: &FormChoice,
        term: &FormChoice,
    ) -> Result<String, NavigationError> {
        let session = self.session()?;
        session.main_page().await?;
        session.subject_page(school, term).await
    }

    async fn fetch_class_results(&self, query: &ClassQuery) -> Result<String, NavigationError> {
        let start = Instant::now();
        let session = self.session()?;
        session.main_page().await?;
        session.subject_page(&query.school, &query.term).await?;
        let body = session.results_page(query).await?;

        debug!(
            school = query.school.key,
            term = query.term.key,
            subject = query.subject.key,
            career = query.career.key,
            duration = fmt_duration(start.elapsed()),
            "Fetched class results"
        );
        Ok(body)
    }
}
