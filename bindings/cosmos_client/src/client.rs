use geo_tunnel_core::prelude::{
    Document, EndpointError, FatalStartupError, Page, PageOptions, QueryText,
};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::auth::{http_date, master_key_token};
use crate::connection::ConnectionString;

const API_VERSION: &str = "2018-12-31";

const HEADER_CONTINUATION: &str = "x-ms-continuation";
const HEADER_REQUEST_CHARGE: &str = "x-ms-request-charge";

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(rename = "Documents")]
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// An async client for a single container, using the REST API directly.
///
/// Requests are not retried. A throttled request (429) is returned to the caller as an error like
/// any other failure.
#[derive(Debug)]
pub struct CosmosContainerClient {
    http: reqwest::Client,
    connection: ConnectionString,
    resource_link: String,
    container_url: Url,
    docs_url: Url,
}

impl CosmosContainerClient {
    pub fn new(
        connection: ConnectionString,
        database: &str,
        container: &str,
    ) -> Result<Self, FatalStartupError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FatalStartupError::new(format!("Failed to create HTTP client: {e}")))?;

        Self::with_http_client(http, connection, database, container)
    }

    pub(crate) fn with_http_client(
        http: reqwest::Client,
        connection: ConnectionString,
        database: &str,
        container: &str,
    ) -> Result<Self, FatalStartupError> {
        let mut container_url = connection.endpoint.clone();
        container_url
            .path_segments_mut()
            .map_err(|_| {
                FatalStartupError::new(format!(
                    "AccountEndpoint {} cannot be used as a base URL",
                    connection.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(["dbs", database, "colls", container]);

        let mut docs_url = container_url.clone();
        docs_url
            .path_segments_mut()
            .map_err(|_| FatalStartupError::new("Container URL cannot be used as a base URL"))?
            .push("docs");

        Ok(Self {
            http,
            connection,
            resource_link: format!("dbs/{database}/colls/{container}"),
            container_url,
            docs_url,
        })
    }

    /// Read the container's metadata. Used to check that the account, database and container are
    /// all reachable before any queries are run.
    pub async fn read_container(&self) -> Result<(), EndpointError> {
        let response = self
            .request(Method::GET, "colls", self.container_url.clone())?
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(transport_error)?;
            return Err(decode_error(status, &body));
        }

        Ok(())
    }

    /// Fetch one page of results for `query`.
    ///
    /// Pass the continuation returned with the previous page to get the page after it. The returned
    /// continuation is `None` when there are no more pages.
    pub async fn query_page(
        &self,
        query: &QueryText,
        options: &PageOptions,
        continuation: Option<&str>,
    ) -> Result<(Page, Option<String>), EndpointError> {
        let body = serde_json::json!({
            "query": query.as_str(),
            "parameters": [],
        });

        let mut request = self
            .request(Method::POST, "docs", self.docs_url.clone())?
            .header(reqwest::header::CONTENT_TYPE, "application/query+json")
            .header("x-ms-documentdb-isquery", "True")
            .header("x-ms-documentdb-query-enablecrosspartition", "True")
            .header("x-ms-consistency-level", "Eventual")
            .header("x-ms-max-item-count", options.max_items_per_page.to_string())
            .body(body.to_string());

        if options.max_concurrency != 0 {
            request = request.header("x-ms-documentdb-query-parallelizecrosspartitionquery", "True");
        }
        if let Some(continuation) = continuation {
            request = request.header(HEADER_CONTINUATION, continuation);
        }

        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(decode_error(status, &body));
        }

        let page = decode_page(&headers, &body)?;
        let continuation = headers
            .get(HEADER_CONTINUATION)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok((page, continuation))
    }

    fn request(
        &self,
        method: Method,
        resource_type: &str,
        url: Url,
    ) -> Result<reqwest::RequestBuilder, EndpointError> {
        let date = http_date(chrono::Utc::now());
        let token = master_key_token(
            &self.connection.key,
            method.as_str(),
            resource_type,
            &self.resource_link,
            &date,
        )?;

        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION))
    }
}

fn transport_error(err: reqwest::Error) -> EndpointError {
    EndpointError::unavailable(format!("Request to the database account failed: {err}"))
}

/// Build a page from a successful query response.
pub(crate) fn decode_page(headers: &HeaderMap, body: &[u8]) -> Result<Page, EndpointError> {
    let response: QueryResponse = serde_json::from_slice(body).map_err(|e| {
        EndpointError::new(
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            format!("Failed to decode query response: {e}"),
        )
    })?;

    let cost_units = match headers.get(HEADER_REQUEST_CHARGE) {
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| {
                EndpointError::new(
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    format!("Invalid {HEADER_REQUEST_CHARGE} header: {value:?}"),
                )
            })?,
        None => {
            log::warn!("Query response did not include a request charge");
            0.0
        }
    };

    Ok(Page::new(response.documents, cost_units))
}

/// Turn an error response into an [EndpointError], keeping the service's own message when there is one.
pub(crate) fn decode_error(status: StatusCode, body: &[u8]) -> EndpointError {
    let message = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(err) => err.message,
        Err(_) if !body.is_empty() => String::from_utf8_lossy(body).into_owned(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    };

    EndpointError::new(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn client() -> CosmosContainerClient {
        let connection =
            ConnectionString::parse("AccountEndpoint=https://localhost:8081/;AccountKey=a2V5;")
                .unwrap();
        CosmosContainerClient::new(connection, "geo", "places").unwrap()
    }

    #[test]
    fn builds_resource_urls() {
        let client = client();

        assert_eq!(
            "https://localhost:8081/dbs/geo/colls/places",
            client.container_url.as_str()
        );
        assert_eq!(
            "https://localhost:8081/dbs/geo/colls/places/docs",
            client.docs_url.as_str()
        );
        assert_eq!("dbs/geo/colls/places", client.resource_link);
    }

    #[test]
    fn decodes_documents_and_charge() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REQUEST_CHARGE, HeaderValue::from_static("2.83"));
        let body = br#"{"_rid":"abc","Documents":[{"id":"1"},{"id":"2"}],"_count":2}"#;

        let page = decode_page(&headers, body).unwrap();

        assert_eq!(2, page.items.len());
        assert_eq!(2.83, page.cost_units);
    }

    #[test]
    fn decodes_scalar_results() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REQUEST_CHARGE, HeaderValue::from_static("1"));
        let body = br#"{"_rid":"abc","Documents":[{"$1":true}],"_count":1}"#;

        let page = decode_page(&headers, body).unwrap();

        assert_eq!(serde_json::json!({ "$1": true }), page.items[0]);
    }

    #[test]
    fn malformed_charge_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_REQUEST_CHARGE, HeaderValue::from_static("lots"));

        let err = decode_page(&headers, br#"{"Documents":[]}"#).unwrap_err();

        assert_eq!(500, err.status);
    }

    #[test]
    fn error_keeps_service_message() {
        let err = decode_error(
            StatusCode::TOO_MANY_REQUESTS,
            br#"{"code":"429","message":"Request rate is large"}"#,
        );

        assert_eq!(EndpointError::new(429, "Request rate is large"), err);
    }

    #[test]
    fn error_without_body_uses_status_reason() {
        let err = decode_error(StatusCode::NOT_FOUND, b"");

        assert_eq!(EndpointError::new(404, "Not Found"), err);
    }

    #[test]
    fn error_with_plain_body_uses_body() {
        let err = decode_error(StatusCode::BAD_GATEWAY, b"upstream went away");

        assert_eq!("upstream went away", err.message);
    }
}
