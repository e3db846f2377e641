// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridview_app::{Record, RecordId};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://jsonplaceholder.typicode.com/posts";

/// Anything that can produce the full record collection in one shot.
pub trait RecordSource {
    fn describe(&self) -> String;
    fn fetch_records(&self) -> Result<Vec<Record>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedRecords {
    pub records: Vec<Record>,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    url: Url,
    http: HttpClient,
}

impl HttpSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = parse_source_url(url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { url, http })
    }
}

impl RecordSource for HttpSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn fetch_records(&self) -> Result<Vec<Record>> {
        info!(url = %self.url, "fetching records");
        let response = self
            .http
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|error| connection_error(&self.url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response.text().context("read record response")?;
        let decoded = decode_records(&body)?;
        info!(
            count = decoded.records.len(),
            skipped = decoded.skipped,
            "records fetched"
        );
        Ok(decoded.records)
    }
}

/// Serves a fixed collection; used for demo mode and tests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for StaticSource {
    fn describe(&self) -> String {
        format!("{} built-in records", self.records.len())
    }

    fn fetch_records(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

pub fn parse_source_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("source.url must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("invalid source url {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "source url {trimmed:?} uses scheme {:?}; only http and https are supported",
            url.scheme()
        );
    }
    Ok(url)
}

/// Decodes a JSON array of record objects. Only `id`, `title`, and `body`
/// are read. Missing or null text fields become empty strings; entries
/// without an integer id, or repeating an earlier id, are skipped.
pub fn decode_records(body: &str) -> Result<DecodedRecords> {
    let value: Value = serde_json::from_str(body).context("decode record list")?;
    let items = match value {
        Value::Array(items) => items,
        other => bail!("expected a JSON array of records, got {}", json_kind(&other)),
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut decoded = DecodedRecords::default();
    for (index, item) in items.iter().enumerate() {
        let Value::Object(object) = item else {
            warn!(index, kind = json_kind(item), "skipping non-object record");
            decoded.skipped += 1;
            continue;
        };
        let Some(id) = record_id(object) else {
            warn!(index, "skipping record without an integer id");
            decoded.skipped += 1;
            continue;
        };
        if !seen.insert(id) {
            warn!(index, id = id.get(), "skipping record with duplicate id");
            decoded.skipped += 1;
            continue;
        }
        decoded.records.push(Record {
            id,
            title: text_field(object, "title"),
            body: text_field(object, "body"),
        });
    }
    Ok(decoded)
}

fn record_id(object: &Map<String, Value>) -> Option<RecordId> {
    match object.get("id")? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral_f64))
            .map(RecordId::new),
        Value::String(text) => text.trim().parse::<i64>().ok().map(RecordId::new),
        _ => None,
    }
}

/// Whole-valued floats such as `3.0` are accepted as ids.
fn integral_f64(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn text_field(object: &Map<String, Value>, name: &str) -> String {
    match object.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn connection_error(url: &Url, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!(
            "timed out fetching {url} -- raise [source].timeout or check the endpoint ({error})"
        );
    }
    anyhow!("cannot reach {url} -- check [source].url and your network ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.message()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Nested { error: ErrorBody },
    Flat { error: String },
    Message { message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl ErrorEnvelope {
    fn message(self) -> Option<String> {
        let message = match self {
            Self::Nested { error } => error.message,
            Self::Flat { error } => error,
            Self::Message { message } => message,
        };
        if message.is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordSource, StaticSource, clean_error_response, decode_records, parse_source_url};
    use anyhow::Result;
    use gridview_app::Record;
    use reqwest::StatusCode;

    #[test]
    fn decode_reads_only_known_fields() -> Result<()> {
        let decoded = decode_records(
            r#"[{"userId": 1, "id": 1, "title": "first", "body": "one"},
                {"userId": 1, "id": 2, "title": "second", "body": "two"}]"#,
        )?;
        assert_eq!(
            decoded.records,
            vec![
                Record::new(1, "first", "one"),
                Record::new(2, "second", "two"),
            ]
        );
        assert_eq!(decoded.skipped, 0);
        Ok(())
    }

    #[test]
    fn decode_coerces_missing_and_odd_fields() -> Result<()> {
        let decoded = decode_records(
            r#"[{"id": 1}, {"id": "2", "title": null, "body": 42}, {"id": 3, "title": true}]"#,
        )?;
        assert_eq!(
            decoded.records,
            vec![
                Record::new(1, "", ""),
                Record::new(2, "", "42"),
                Record::new(3, "true", ""),
            ]
        );
        Ok(())
    }

    #[test]
    fn decode_skips_entries_without_usable_id() -> Result<()> {
        let decoded = decode_records(
            r#"[{"title": "no id"}, {"id": 1.5}, "text", {"id": 4, "title": "kept"}, {"id": 4, "title": "dupe"}]"#,
        )?;
        assert_eq!(decoded.records, vec![Record::new(4, "kept", "")]);
        assert_eq!(decoded.skipped, 4);
        Ok(())
    }

    #[test]
    fn decode_accepts_whole_valued_float_ids() -> Result<()> {
        let decoded = decode_records(
            r#"[{"id": 1.0, "title": "one"}, {"id": 2.5}, {"id": 1e300}, {"id": 3, "title": "three"}]"#,
        )?;
        assert_eq!(
            decoded.records,
            vec![Record::new(1, "one", ""), Record::new(3, "three", "")]
        );
        assert_eq!(decoded.skipped, 2);
        Ok(())
    }

    #[test]
    fn decode_rejects_non_array_payload() {
        let error = decode_records(r#"{"id": 1}"#).expect_err("object payload should fail");
        assert!(error.to_string().contains("expected a JSON array"));

        let error = decode_records("not json").expect_err("garbage should fail");
        assert!(error.to_string().contains("decode record list"));
    }

    #[test]
    fn source_url_must_be_http() {
        assert!(parse_source_url("https://example.com/posts").is_ok());
        assert!(parse_source_url("http://127.0.0.1:8080/posts").is_ok());

        let error = parse_source_url("ftp://example.com/posts").expect_err("ftp should fail");
        assert!(error.to_string().contains("only http and https"));
        assert!(parse_source_url("  ").is_err());
        assert!(parse_source_url("not a url").is_err());
    }

    #[test]
    fn error_response_prefers_server_message() {
        let nested = clean_error_response(
            StatusCode::BAD_GATEWAY,
            r#"{"error": {"message": "upstream down"}}"#,
        );
        assert_eq!(nested.to_string(), "server error (502): upstream down");

        let flat = clean_error_response(StatusCode::NOT_FOUND, r#"{"error": "no such route"}"#);
        assert_eq!(flat.to_string(), "server error (404): no such route");

        let plain = clean_error_response(StatusCode::FORBIDDEN, "forbidden");
        assert_eq!(plain.to_string(), "server error (403): forbidden");

        let opaque = clean_error_response(StatusCode::INTERNAL_SERVER_ERROR, "{\"weird\": 1}");
        assert_eq!(opaque.to_string(), "server returned 500");
    }

    #[test]
    fn static_source_returns_its_records() -> Result<()> {
        let source = StaticSource::new(vec![Record::new(1, "a", "b")]);
        assert_eq!(source.fetch_records()?, vec![Record::new(1, "a", "b")]);
        assert_eq!(source.describe(), "1 built-in records");
        Ok(())
    }
}
