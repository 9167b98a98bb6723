use base64::Engine;
use chrono::{DateTime, Utc};
use geo_tunnel_core::prelude::EndpointError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Format a timestamp the way the `x-ms-date` header expects it (RFC 1123).
pub(crate) fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Build the value of the `authorization` header for a request signed with the account key.
///
/// The signature covers the verb, the resource type, the resource link and the date. The date must
/// be the same value that is sent in `x-ms-date`.
pub(crate) fn master_key_token(
    key: &[u8],
    verb: &str,
    resource_type: &str,
    resource_link: &str,
    date: &str,
) -> Result<String, EndpointError> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.to_ascii_lowercase(),
        resource_type.to_ascii_lowercase(),
        resource_link,
        date.to_ascii_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| {
        EndpointError::new(401, format!("Account key cannot be used for signing: {e}"))
    })?;
    mac.update(payload.as_bytes());
    let signature =
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

    let token = format!("type=master&ver=1.0&sig={signature}");
    Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
}
