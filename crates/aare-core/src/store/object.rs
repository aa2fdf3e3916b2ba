use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::config::ObjectStoreConfig;
use crate::error::{AareError, OntologyLoadError, Result};

use super::{OntologyStore, object_name};

/// Ontology bucket behind the Cloud Storage JSON API.
#[derive(Clone)]
pub struct ObjectOntologyStore {
    config: ObjectStoreConfig,
    base: Url,
    http: Client,
}

impl std::fmt::Debug for ObjectOntologyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectOntologyStore")
            .field("endpoint", &self.config.endpoint)
            .field("bucket", &self.config.bucket)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ObjectListPage {
    #[serde(default)]
    items: Vec<ObjectListItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectListItem {
    name: String,
}

impl ObjectOntologyStore {
    pub fn new(config: ObjectStoreConfig) -> Result<Self> {
        let base = Url::parse(&config.endpoint).map_err(|err| {
            AareError::Config(format!("invalid storage endpoint '{}': {err}", config.endpoint))
        })?;
        if base.cannot_be_a_base() {
            return Err(AareError::Config(format!(
                "storage endpoint cannot be a base URL: {}",
                config.endpoint
            )));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| AareError::Config(format!("invalid storage token: {err}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self { config, base, http })
    }

    fn objects_url(&self) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", self.config.bucket.as_str(), "o"]);
        }
        url
    }

    fn object_media_url(&self, object: &str) -> Url {
        let mut url = self.objects_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(object);
        }
        url.query_pairs_mut().append_pair("alt", "media");
        url
    }

    fn list_page(&self, page_token: Option<&str>) -> Result<ObjectListPage, OntologyLoadError> {
        let mut url = self.objects_url();
        url.query_pairs_mut()
            .append_pair("fields", "items(name),nextPageToken");
        if let Some(token) = page_token {
            url.query_pairs_mut().append_pair("pageToken", token);
        }
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|err| OntologyLoadError::Fetch(err.to_string()))?;
        if !resp.status().is_success() {
            return Err(OntologyLoadError::Fetch(format!(
                "bucket listing failed with status {}",
                resp.status()
            )));
        }
        resp.json::<ObjectListPage>()
            .map_err(|err| OntologyLoadError::Fetch(format!("bucket listing decode: {err}")))
    }
}

impl OntologyStore for ObjectOntologyStore {
    fn fetch(&self, name: &str) -> Result<String, OntologyLoadError> {
        let object = object_name(name)?;
        let resp = self
            .http
            .get(self.object_media_url(&object))
            .send()
            .map_err(|err| OntologyLoadError::Fetch(err.to_string()))?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(OntologyLoadError::NotFound(name.to_string())),
            status if status.is_success() => resp
                .text()
                .map_err(|err| OntologyLoadError::Fetch(err.to_string())),
            status => Err(OntologyLoadError::Fetch(format!(
                "download of {object} failed with status {status}"
            ))),
        }
    }

    fn list(&self) -> Result<Vec<String>, OntologyLoadError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let page = self.list_page(page_token.as_deref())?;
            names.extend(page.items.into_iter().map(|item| item.name));
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;
    use crate::error::OntologyFailureKind;

    fn store(endpoint: &str) -> ObjectOntologyStore {
        store_with_timeout(endpoint, 250)
    }

    fn store_with_timeout(endpoint: &str, timeout_ms: u64) -> ObjectOntologyStore {
        ObjectOntologyStore::new(ObjectStoreConfig {
            endpoint: endpoint.to_string(),
            bucket: "aare-ai-ontologies".to_string(),
            token: Some("t0ken".to_string()),
            timeout_ms,
        })
        .expect("store")
    }

    /// Answers one connection per canned response, in order, and returns the
    /// request lines it saw.
    fn storage_server(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock storage");
        let endpoint = format!("http://{}", listener.local_addr().expect("local addr"));
        let handle = thread::spawn(move || {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream);
                let mut request_line = String::new();
                reader.read_line(&mut request_line).expect("request line");
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).expect("header line");
                    if header == "\r\n" || header.is_empty() {
                        break;
                    }
                }
                seen.push(request_line.trim_end().to_string());

                let mut stream = reader.into_inner();
                write!(
                    stream,
                    "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .expect("write response");
                stream.flush().expect("flush response");
            }
            seen
        });
        (endpoint, handle)
    }

    #[test]
    fn status_codes_map_to_failure_kinds_and_listing_follows_pages() {
        let (endpoint, server) = storage_server(vec![
            (404, r#"{"error": {"code": 404}}"#),
            (403, r#"{"error": {"code": 403}}"#),
            (
                200,
                r#"{"items": [{"name": "a.json"}, {"name": "b.json"}], "nextPageToken": "p2"}"#,
            ),
            (200, r#"{"items": [{"name": "c.txt"}]}"#),
        ]);
        let store = store_with_timeout(&endpoint, 5_000);

        let err = store.fetch("missing").expect_err("404");
        assert_eq!(err.kind(), OntologyFailureKind::NotFound);
        let err = store.fetch("locked").expect_err("403");
        assert_eq!(err.kind(), OntologyFailureKind::Fetch);
        assert_eq!(
            store.list().expect("two pages"),
            vec!["a.json", "b.json", "c.txt"]
        );

        let seen = server.join().expect("mock storage thread");
        assert_eq!(seen.len(), 4);
        assert!(
            seen[0].starts_with("GET /storage/v1/b/aare-ai-ontologies/o/missing.json?alt=media "),
            "{}",
            seen[0]
        );
        assert!(!seen[2].contains("pageToken"), "{}", seen[2]);
        assert!(seen[3].contains("pageToken=p2"), "{}", seen[3]);
    }

    #[test]
    fn media_url_targets_bucket_object() {
        let store = store("https://storage.googleapis.com");
        assert_eq!(
            store.object_media_url("mortgage-compliance-v1.json").as_str(),
            "https://storage.googleapis.com/storage/v1/b/aare-ai-ontologies/o/mortgage-compliance-v1.json?alt=media"
        );
    }

    #[test]
    fn object_names_are_percent_encoded() {
        let store = store("http://localhost:4443/");
        let url = store.object_media_url("fair lending#2.json");
        assert_eq!(
            url.as_str(),
            "http://localhost:4443/storage/v1/b/aare-ai-ontologies/o/fair%20lending%232.json?alt=media"
        );
    }

    #[test]
    fn invalid_endpoint_is_config_error() {
        let err = ObjectOntologyStore::new(ObjectStoreConfig {
            endpoint: "not a url".to_string(),
            ..ObjectStoreConfig::default()
        })
        .expect_err("invalid endpoint");
        assert_eq!(err.code(), "CONFIG_ERROR");
    }

    #[test]
    fn unreachable_endpoint_surfaces_as_fetch_failure() {
        let store = store("http://127.0.0.1:9");
        let err = store.fetch("mortgage-compliance-v1").expect_err("nothing listens");
        assert_eq!(err.kind(), OntologyFailureKind::Fetch);
    }
}
