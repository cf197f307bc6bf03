use crate::error::AppError;
use jiff::Timestamp;
use portal_core::ShortUrl;
use serde::{Deserialize, Serialize};

const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub url: String,
    /// RFC 3339 timestamp with an offset, e.g. `2030-01-01T00:00:00Z`.
    pub expire_at: String,
}

impl CreateUrlRequest {
    /// Checks the request against `now` and returns the URL and expiry to shorten.
    ///
    /// The URL comes back in its parsed, serialized form, which is always a
    /// valid `Location` header value.
    pub fn validate(self, now: Timestamp) -> Result<(String, Timestamp), AppError> {
        let url = normalize_url(&self.url)?;

        let expire_at: Timestamp = self.expire_at.parse().map_err(|e| {
            AppError::Validation(format!("expireAt must be an RFC 3339 timestamp: {e}"))
        })?;
        if expire_at <= now {
            return Err(AppError::Validation(
                "expireAt must be in the future".to_string(),
            ));
        }

        Ok((url, expire_at))
    }
}

fn normalize_url(raw: &str) -> Result<String, AppError> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| AppError::Validation(format!("url is not a valid absolute URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "url scheme must be http or https, got '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::Validation("url must have a host".to_string()));
    }

    if parsed.as_str().len() > MAX_URL_LENGTH {
        return Err(AppError::Validation(format!(
            "url must be at most {MAX_URL_LENGTH} bytes"
        )));
    }

    Ok(parsed.into())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub id: String,
    pub short_url: String,
    pub url: String,
    pub expire_at: Timestamp,
}

impl CreateUrlResponse {
    pub fn new(record: ShortUrl, base_url: &str) -> Self {
        Self {
            short_url: record.id.to_url(base_url),
            id: record.id.into(),
            url: record.url,
            expire_at: record.expire_at,
        }
    }
}
