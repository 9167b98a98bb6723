use base64::Engine;
use geo_tunnel_core::prelude::FatalStartupError;
use url::Url;

/// The parts of an account connection string that are needed to talk to the REST API.
///
/// Connection strings look like `AccountEndpoint=https://<account>.documents.azure.com:443/;AccountKey=<key>;`.
/// Key names are matched case-insensitively and other keys are ignored.
#[derive(Clone)]
pub struct ConnectionString {
    pub(crate) endpoint: Url,
    pub(crate) key: Vec<u8>,
}

impl ConnectionString {
    pub fn parse(s: &str) -> Result<Self, FatalStartupError> {
        let mut endpoint = None;
        let mut key = None;

        for (position, part) in s
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .enumerate()
        {
            // Keys are base64 so the value may itself contain '='.
            // The segment itself is never echoed, it may hold the key.
            let Some((name, value)) = part.split_once('=') else {
                return Err(FatalStartupError::new(format!(
                    "Malformed connection string segment {}: expected <name>=<value>",
                    position + 1
                )));
            };

            match name.trim().to_ascii_lowercase().as_str() {
                "accountendpoint" => endpoint = Some(value.trim()),
                "accountkey" => key = Some(value.trim()),
                other => log::debug!("Ignoring connection string key {other}"),
            }
        }

        let endpoint = endpoint
            .ok_or_else(|| FatalStartupError::new("Connection string has no AccountEndpoint"))?;
        let key = key.ok_or_else(|| FatalStartupError::new("Connection string has no AccountKey"))?;

        let endpoint = Url::parse(endpoint).map_err(|e| {
            FatalStartupError::new(format!("Invalid AccountEndpoint {endpoint}: {e}"))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(FatalStartupError::new(format!(
                "AccountEndpoint must be an http or https URL, got {endpoint}"
            )));
        }

        let key = base64::engine::general_purpose::STANDARD
            .decode(key)
            .map_err(|e| FatalStartupError::new(format!("AccountKey is not valid base64: {e}")))?;

        Ok(Self { endpoint, key })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

// The key must never end up in logs
impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint.as_str())
            .field("key", &"<redacted>")
            .finish()
    }
}
