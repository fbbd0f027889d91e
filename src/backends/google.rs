//! Google Calendar and Gmail (read-only)
//!
//! Uses a caller-supplied OAuth access token. Token exchange and refresh
//! happen outside this crate.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::{BackendError, GoogleWorkspace, Listing};

const CALENDAR_EVENTS_URL: &str = "https://www.googleapis.com/calendar/v3/calendars/primary/events";
const GMAIL_MESSAGES_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages";

#[derive(Clone)]
pub struct GoogleApiClient {
    client: Client,
}

impl GoogleApiClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn get_json(
        &self,
        service: &'static str,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Value, BackendError> {
        let response = self.client.get(url).bearer_auth(token).query(query).send().await?;

        if !response.status().is_success() {
            return Err(BackendError::Status {
                service,
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

impl Default for GoogleApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GoogleWorkspace for GoogleApiClient {
    async fn calendar_events(&self, access_token: &str, timeframe: &str) -> Result<Listing, BackendError> {
        let (time_min, time_max) = time_window(timeframe, Utc::now());
        debug!("Calendar fetch: {} [{} .. {}]", timeframe, time_min, time_max);

        let body = self
            .get_json(
                "Calendar",
                CALENDAR_EVENTS_URL,
                access_token,
                &[
                    ("maxResults", "10".to_string()),
                    ("singleEvents", "true".to_string()),
                    ("orderBy", "startTime".to_string()),
                    ("timeMin", time_min.to_rfc3339()),
                    ("timeMax", time_max.to_rfc3339()),
                ],
            )
            .await?;

        let items = body.get("items").and_then(Value::as_array).cloned().unwrap_or_default();
        let formatted = format_events(&items);
        Ok(Listing { items, formatted })
    }

    async fn recent_emails(&self, access_token: &str, filter: &str, limit: usize) -> Result<Listing, BackendError> {
        let query = match filter {
            "unread" => "is:unread",
            "all" => "",
            _ => "in:inbox",
        };

        let list = self
            .get_json(
                "Gmail",
                GMAIL_MESSAGES_URL,
                access_token,
                &[
                    ("maxResults", limit.to_string()),
                    ("q", query.to_string()),
                ],
            )
            .await?;

        let ids: Vec<String> = list
            .get("messages")
            .and_then(Value::as_array)
            .map(|messages| {
                messages
                    .iter()
                    .filter_map(|m| m.get("id").and_then(Value::as_str).map(str::to_string))
                    .take(limit)
                    .collect()
            })
            .unwrap_or_default();

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            let detail = self
                .get_json(
                    "Gmail",
                    &format!("{}/{}", GMAIL_MESSAGES_URL, id),
                    access_token,
                    &[
                        ("format", "metadata".to_string()),
                        ("metadataHeaders", "From".to_string()),
                        ("metadataHeaders", "Subject".to_string()),
                        ("metadataHeaders", "Date".to_string()),
                    ],
                )
                .await?;
            items.push(summarize_message(&id, &detail));
        }

        let formatted = format_emails(&items);
        Ok(Listing { items, formatted })
    }
}

/// `[start, end)` for a named timeframe
pub fn time_window(timeframe: &str, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start_of = |date: NaiveDate| date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()).unwrap_or(now);
    let today = now.date_naive();

    match timeframe {
        "tomorrow" => {
            let tomorrow = today + ChronoDuration::days(1);
            (start_of(tomorrow), start_of(tomorrow + ChronoDuration::days(1)))
        }
        "week" => (now, now + ChronoDuration::days(7)),
        _ => (now, start_of(today + ChronoDuration::days(1))),
    }
}

fn format_events(events: &[Value]) -> String {
    if events.is_empty() {
        return "[No upcoming events found]".to_string();
    }

    let mut formatted = String::from("[Your Calendar]\n\n");
    for event in events {
        let summary = event.get("summary").and_then(Value::as_str).unwrap_or("Untitled");
        let when = match (
            event.pointer("/start/dateTime").and_then(Value::as_str),
            event.pointer("/start/date").and_then(Value::as_str),
        ) {
            (Some(date_time), _) => DateTime::parse_from_rfc3339(date_time)
                .map(|dt| dt.format("%a, %b %-d at %H:%M").to_string())
                .unwrap_or_else(|_| date_time.to_string()),
            (None, Some(date)) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(|d| format!("{} (all day)", d.format("%a, %b %-d")))
                .unwrap_or_else(|_| date.to_string()),
            (None, None) => "Unscheduled".to_string(),
        };

        formatted.push_str(&format!("• {}: {}\n", when, summary));
        if let Some(location) = event.get("location").and_then(Value::as_str) {
            formatted.push_str(&format!("  Location: {}\n", location));
        }
    }
    formatted
}

fn summarize_message(id: &str, detail: &Value) -> Value {
    let header = |name: &str| {
        detail
            .pointer("/payload/headers")
            .and_then(Value::as_array)
            .and_then(|headers| {
                headers
                    .iter()
                    .find(|h| h.get("name").and_then(Value::as_str) == Some(name))
                    .and_then(|h| h.get("value").and_then(Value::as_str))
            })
            .map(str::to_string)
    };

    serde_json::json!({
        "id": id,
        "from": header("From").unwrap_or_else(|| "Unknown".to_string()),
        "subject": header("Subject").unwrap_or_else(|| "No Subject".to_string()),
        "date": header("Date").unwrap_or_default(),
        "snippet": detail.get("snippet").and_then(Value::as_str).unwrap_or_default(),
    })
}

fn format_emails(emails: &[Value]) -> String {
    if emails.is_empty() {
        return "[No unread emails found]".to_string();
    }

    let mut formatted = String::from("[Your Emails]\n\n");
    for email in emails {
        let from = email.get("from").and_then(Value::as_str).unwrap_or("Unknown");
        // "Jane Doe <jane@example.com>" -> "Jane Doe"
        let sender = from.split('<').next().map(str::trim).filter(|s| !s.is_empty()).unwrap_or(from);
        let subject = email.get("subject").and_then(Value::as_str).unwrap_or("No Subject");

        formatted.push_str(&format!("• From: {}\n  Subject: {}\n", sender, subject));
        if let Some(date) = email.get("date").and_then(Value::as_str).filter(|d| !d.is_empty()) {
            let short = DateTime::parse_from_rfc2822(date)
                .map(|d| d.format("%b %-d").to_string())
                .unwrap_or_else(|_| date.to_string());
            formatted.push_str(&format!("  Date: {}\n", short));
        }
        formatted.push('\n');
    }
    formatted
}
