//! HTTP client for the duty-roster service.
//!
//! One [`RosterClient`] holds one authenticated session. Configuration
//! (base URL, timeout, TLS policy, timezone) is passed in at construction;
//! there is no process-wide client state.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use oncall_core::config::RosterConfig;
use oncall_core::{DailySchedule, DaySource, RosterError, Schedule, User};

use crate::planning::PlanningDocument;

const ACCEPT_JSON: &str = "application/json, text/plain, */*";

/// Session-holding client for the roster REST API.
pub struct RosterClient {
    base_url: String,
    timezone: Tz,
    http: reqwest::Client,
}

impl RosterClient {
    /// Build a client from config.
    ///
    /// The underlying HTTP client keeps session cookies and never follows
    /// redirects: the login flow inspects each `302` itself.
    pub fn new(config: &RosterConfig) -> Result<Self, RosterError> {
        let timezone: Tz = config.timezone.parse().map_err(|e| {
            RosterError::Config(format!("unknown timezone '{}': {e}", config.timezone))
        })?;

        Url::parse(&config.base_url).map_err(|e| {
            RosterError::Config(format!("invalid roster url '{}': {e}", config.base_url))
        })?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| RosterError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timezone,
            http,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolve a `Location` header that may be relative to the roster.
    fn resolve(&self, location: &str) -> Result<Url, RosterError> {
        Url::parse(&format!("{}/", self.base_url))
            .and_then(|base| base.join(location))
            .map_err(|e| RosterError::Login(format!("invalid redirect '{location}': {e}")))
    }

    /// Authenticate this client's session.
    ///
    /// Walks the portal's form login: username first, then password with the
    /// `State` handed out by the first step, then the final sign-in redirect.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), RosterError> {
        if username.is_empty() || password.is_empty() {
            return Err(RosterError::Login(
                "username or password is not provided".to_string(),
            ));
        }

        // Primes the session cookies; the page itself is not needed.
        self.http
            .get(self.url("/login.cshtml"))
            .send()
            .await
            .map_err(transport)?;

        let redirect_uri = self.url("/login.cshtml?ReturnUrl=~%2f");
        let resp = self
            .http
            .post(self.url("/vui/controller/1.0/login"))
            .form(&[
                ("username", username),
                ("redirectUri", redirect_uri.as_str()),
                ("promptBehavior", "Auto"),
            ])
            .send()
            .await
            .map_err(transport)?;
        let location = expect_redirect(&resp)?;
        let state = extract_state(&self.resolve(&location)?)
            .ok_or_else(|| RosterError::Login("login redirect carries no State".to_string()))?;
        debug!("username accepted");

        let resp = self
            .http
            .post(self.url("/vui/controller/1.0/login/credentials"))
            .form(&[
                ("password", password),
                ("redirectUri", location.as_str()),
                ("promptBehavior", "Auto"),
                ("state", state.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let location = expect_redirect(&resp)?;
        debug!("credentials accepted");

        let resp = self
            .http
            .get(self.resolve(&location)?)
            .send()
            .await
            .map_err(transport)?;
        expect_redirect(&resp)?;

        info!(base_url = %self.base_url, "logged in to roster");
        Ok(())
    }

    /// All user accounts visible to the session.
    pub async fn users(&self) -> Result<Vec<User>, RosterError> {
        self.get_json("users", "/um/controller/1.0/users").await
    }

    /// All configured duty schedules.
    pub async fn schedules(&self) -> Result<Vec<Schedule>, RosterError> {
        self.get_json(
            "schedules",
            "/reachability/controller/1.0/groups/config/schedules",
        )
        .await
    }

    /// The planning of `schedule` on `date`, localized to the roster's zone.
    pub async fn planning(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
    ) -> Result<DailySchedule, RosterError> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let path = format!(
            "/reachability/controller/1.0/groups/{}/config/{}/schedule/{}",
            schedule.group_id, schedule.parameter_id, date_str
        );

        let resp = self
            .http
            .get(self.url(&path))
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() != StatusCode::OK {
            return Err(RosterError::Retrieval {
                date,
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        let doc: PlanningDocument = serde_json::from_str(&body).map_err(|e| RosterError::Decode {
            what: format!("planning for {date_str}"),
            reason: e.to_string(),
        })?;

        debug!(group = %schedule.group_name, date = %date_str, "planning retrieved");
        Ok(doc.into_schedule(self.timezone))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        what: &str,
        path: &str,
    ) -> Result<T, RosterError> {
        let resp = self
            .http
            .get(self.url(path))
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RosterError::Status {
                what: what.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| RosterError::Decode {
            what: what.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl DaySource for RosterClient {
    async fn fetch(
        &self,
        schedule: &Schedule,
        date: NaiveDate,
    ) -> Result<DailySchedule, RosterError> {
        self.planning(schedule, date).await
    }
}

/// Pick the schedule to report on: by group name (case-insensitive) when
/// given, the first one otherwise.
pub fn select_schedule<'a>(
    schedules: &'a [Schedule],
    name: Option<&str>,
) -> Result<&'a Schedule, RosterError> {
    match name {
        Some(name) => schedules
            .iter()
            .find(|s| s.group_name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RosterError::Config(format!("no schedule named '{name}'"))),
        None => schedules
            .first()
            .ok_or_else(|| RosterError::Config("roster has no schedules".to_string())),
    }
}

fn transport(e: reqwest::Error) -> RosterError {
    RosterError::Transport(e.to_string())
}

/// Require a `302 Found` and return its `Location` header.
fn expect_redirect(resp: &Response) -> Result<String, RosterError> {
    if resp.status() != StatusCode::FOUND {
        return Err(RosterError::Login(format!(
            "roster returned {}",
            resp.status().as_u16()
        )));
    }
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| RosterError::Login("redirect without Location header".to_string()))
}

fn extract_state(location: &Url) -> Option<String> {
    location
        .query_pairs()
        .filter(|(k, _)| k == "State")
        .last()
        .map(|(_, v)| v.into_owned())
}
