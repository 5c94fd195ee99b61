//! HTTP collaborator: the only component that talks to the network.

use std::time::Duration;

use async_trait::async_trait;
use postback_config::HttpConfig;
use postback_page::{FormMethod, FormRequest};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::TransportError;

/// Body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Fields plus file parts sent with an empty filename and no content.
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: FormMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: FormMethod::Get,
            url,
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Encode a form submission. GET forms carry their fields in the query
    /// string; forms with file controls are sent as multipart.
    pub fn from_form(form: FormRequest) -> Self {
        let FormRequest {
            method,
            mut url,
            fields,
            files,
        } = form;

        let body = match method {
            FormMethod::Get => {
                url.query_pairs_mut().clear().extend_pairs(fields.iter());
                RequestBody::Empty
            }
            FormMethod::Post if files.is_empty() => RequestBody::Form(fields.into_vec()),
            FormMethod::Post => RequestBody::Multipart {
                fields: fields.into_vec(),
                files,
            },
        };

        Self {
            method,
            url,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Final URL after transport-level redirects.
    pub url: Url,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends requests on behalf of a session. Status codes are not
/// interpreted: any response that arrives is returned as is.
#[async_trait]
pub trait HttpCollaborator: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// [`HttpCollaborator`] backed by a `reqwest` client.
pub struct ReqwestCollaborator {
    client: Client,
}

impl ReqwestCollaborator {
    pub fn from_config(config: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(config.cookie_store)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpCollaborator for ReqwestCollaborator {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            FormMethod::Get => self.client.get(request.url),
            FormMethod::Post => self.client.post(request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(&fields),
            RequestBody::Multipart { fields, files } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                for name in files {
                    form = form.part(name, Part::bytes(Vec::new()).file_name(""));
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let url = response.url().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            url,
            body,
        })
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
