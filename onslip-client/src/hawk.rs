//! Hawk request signing
//!
//! The Onslip 360 API authenticates every request with a Hawk `Authorization`
//! header: an HMAC-SHA256 over a normalized description of the request,
//! keyed with the account's API key.

use crate::{ClientError, ClientResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::{Rng, distributions::Alphanumeric};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const HEADER_VERSION: &str = "hawk.1.header";
const PAYLOAD_VERSION: &str = "hawk.1.payload";
const NONCE_LEN: usize = 8;

/// Key identifier and secret used to sign requests
#[derive(Clone)]
pub struct Credentials {
    pub id: String,
    key: Vec<u8>,
}

impl Credentials {
    pub fn new(id: impl Into<String>, key: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }

    /// Credentials from a base64 key as issued by the POS
    pub fn from_base64(id: impl Into<String>, key: &str) -> ClientResult<Self> {
        let key = STANDARD
            .decode(key.trim())
            .map_err(|e| ClientError::Auth(format!("API key is not valid base64: {}", e)))?;
        Ok(Self::new(id, key))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// The parts of a request covered by the MAC
#[derive(Debug, Clone)]
pub struct RequestParts<'a> {
    pub method: &'a str,
    /// Path plus query string
    pub resource: &'a str,
    pub host: &'a str,
    pub port: u16,
    /// Base64 payload hash, for requests with a body
    pub hash: Option<&'a str>,
    pub ext: Option<&'a str>,
}

/// Hash of a request body, bound into the MAC
pub fn payload_hash(content_type: &str, payload: &[u8]) -> String {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let mut hasher = Sha256::new();
    hasher.update(PAYLOAD_VERSION.as_bytes());
    hasher.update(b"\n");
    hasher.update(mime.as_bytes());
    hasher.update(b"\n");
    hasher.update(payload);
    hasher.update(b"\n");
    STANDARD.encode(hasher.finalize())
}

fn normalized_string(parts: &RequestParts<'_>, ts: i64, nonce: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
        HEADER_VERSION,
        ts,
        nonce,
        parts.method.to_ascii_uppercase(),
        parts.resource,
        parts.host.to_ascii_lowercase(),
        parts.port,
        parts.hash.unwrap_or_default(),
        parts.ext.unwrap_or_default(),
    )
}

/// MAC over a request at timestamp `ts` with `nonce`
pub fn mac(credentials: &Credentials, parts: &RequestParts<'_>, ts: i64, nonce: &str) -> ClientResult<String> {
    let mut mac = HmacSha256::new_from_slice(&credentials.key)
        .map_err(|e| ClientError::Auth(format!("Invalid signing key: {}", e)))?;
    mac.update(normalized_string(parts, ts, nonce).as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Full `Authorization` header value
pub fn header(credentials: &Credentials, parts: &RequestParts<'_>, ts: i64, nonce: &str) -> ClientResult<String> {
    let mac = mac(credentials, parts, ts, nonce)?;

    let mut value = format!(
        "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\"",
        credentials.id, ts, nonce
    );
    if let Some(hash) = parts.hash {
        value.push_str(&format!(", hash=\"{}\"", hash));
    }
    if let Some(ext) = parts.ext {
        value.push_str(&format!(", ext=\"{}\"", ext));
    }
    value.push_str(&format!(", mac=\"{}\"", mac));
    Ok(value)
}

/// Sign a request to `url` now, with a fresh nonce
pub fn sign(
    credentials: &Credentials,
    method: &str,
    url: &reqwest::Url,
    payload: Option<(&str, &[u8])>,
) -> ClientResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ClientError::Auth(format!("URL has no host: {}", url)))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| ClientError::Auth(format!("URL has no port: {}", url)))?;

    let resource = match url.query() {
        Some(q) => format!("{}?{}", url.path(), q),
        None => url.path().to_string(),
    };
    let hash = payload.map(|(content_type, body)| payload_hash(content_type, body));

    let parts = RequestParts {
        method,
        resource: &resource,
        host,
        port,
        hash: hash.as_deref(),
        ext: None,
    };

    let ts = chrono::Utc::now().timestamp();
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();

    header(credentials, &parts, ts, &nonce)
}
