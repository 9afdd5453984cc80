use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use base64::Engine;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::Value;

use crate::error::{Error, Result};

/// Rows of loosely typed cells; row 0 is the header row.
pub type Grid = Vec<Vec<Value>>;

/// Where spreadsheet values come from.
pub trait SheetSource {
    fn fetch(&mut self, sheet_id: &str, range: &str) -> Result<Grid>;
}

/// Range covering only the header row of a tab.
pub fn header_range(sheet_title: &str) -> String {
    format!("{}!A1:XYZ1", sheet_title)
}

/// Range covering every row of a tab.
pub fn full_range(sheet_title: &str) -> String {
    format!("{}!A:XYZ", sheet_title)
}

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const VALUES_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Deserialize)]
struct ServiceAccount {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Grid,
}

/// Google Sheets values API, authorized as a service account.
pub struct GoogleSheets {
    account: ServiceAccount,
    http: reqwest::blocking::Client,
    token: Option<(String, Instant)>,
}

impl GoogleSheets {
    /// Takes the service-account JSON key, base64 encoded.
    pub fn from_credentials(encoded: &str) -> Result<GoogleSheets> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Config(format!("app.cred is not base64: {}", e)))?;
        let account: ServiceAccount = serde_json::from_slice(&raw)
            .map_err(|e| Error::Config(format!("app.cred is not a service account key: {}", e)))?;
        Ok(GoogleSheets {
            account,
            http: reqwest::blocking::Client::new(),
            token: None,
        })
    }

    fn access_token(&mut self) -> Result<String> {
        if let Some((token, expires)) = &self.token {
            if Instant::now() < *expires {
                return Ok(token.clone());
            }
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .map_err(|e| Error::Config(format!("bad private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| Error::Sheet(e.to_string()))?;

        let resp: TokenResponse = self
            .http
            .post(&self.account.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        // Renew a minute early.
        let ttl = Duration::from_secs(resp.expires_in.saturating_sub(60));
        self.token = Some((resp.access_token.clone(), Instant::now() + ttl));
        Ok(resp.access_token)
    }
}

impl SheetSource for GoogleSheets {
    fn fetch(&mut self, sheet_id: &str, range: &str) -> Result<Grid> {
        let token = self.access_token()?;
        let url = format!(
            "{}/{}/values/{}",
            VALUES_URL,
            urlencoding::encode(sheet_id),
            urlencoding::encode(range)
        );
        log::debug!("GET {}", url);
        let body: ValueRange = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()?
            .error_for_status()?
            .json()?;
        Ok(body.values)
    }
}

/// A local CSV export of a sheet. Every call returns the whole file,
/// whatever sheet id or range is asked for.
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    pub fn new<P: Into<PathBuf>>(path: P) -> CsvSheet {
        CsvSheet { path: path.into() }
    }
}

impl SheetSource for CsvSheet {
    fn fetch(&mut self, _sheet_id: &str, _range: &str) -> Result<Grid> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut grid = Grid::new();
        for record in rdr.records() {
            let record = record?;
            grid.push(record.iter().map(|c| Value::String(c.to_string())).collect());
        }
        Ok(grid)
    }
}
