use std::path::Path;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::config::Config;
use crate::error::{PortalError, PortalResult, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A single file part of a multipart payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::new(file_name, mime.essence_str(), bytes))
    }
}

/// Scalar fields plus file parts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<(String, Attachment)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    /// Adds the field only when it holds something other than whitespace.
    pub fn text_opt(self, name: &str, value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn file(mut self, name: &str, attachment: Attachment) -> Self {
        self.files.push((name.to_string(), attachment));
        self
    }

    pub fn file_opt(self, name: &str, attachment: Option<Attachment>) -> Self {
        match attachment {
            Some(att) => self.file(name, att),
            None => self,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[(String, Attachment)] {
        &self.files
    }

    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        self.files
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, att)| att)
    }

    fn into_reqwest(self) -> PortalResult<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for (name, att) in self.files {
            let part = Part::bytes(att.bytes)
                .file_name(att.file_name)
                .mime_str(&att.mime)
                .map_err(|err| PortalError::Network(err.to_string()))?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Relative to the API base, without a leading slash.
    pub path: String,
    pub body: Body,
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method,
            path: path.trim_start_matches('/').to_string(),
            body: Body::Empty,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Encodes a record id as exactly one path segment. Ids that the URL parser
/// would fold into a dot segment are refused.
pub fn path_segment(id: &str) -> Result<String, ValidationError> {
    if id.is_empty() || id.chars().all(|c| c == '.') {
        return Err(ValidationError::Invalid(format!("'{}' is not a valid id", id)));
    }
    let encoded: String = url::form_urlencoded::byte_serialize(id.as_bytes()).collect();
    Ok(encoded.replace('+', "%20"))
}

/// Sends requests to the portal API. Swapped for an in-process fake in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> PortalResult<ApiResponse>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(config: &Config) -> PortalResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| PortalError::Network(err.to_string()))?;
        Ok(Self {
            http,
            base: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> PortalResult<ApiResponse> {
        let url = self
            .base
            .join(&request.path)
            .map_err(|err| PortalError::Network(format!("bad request path: {}", err)))?;

        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Patch => self.http.patch(url),
            Method::Delete => self.http.delete(url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(form) => builder.multipart(form.into_reqwest()?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|err| PortalError::Network(err.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|err| PortalError::Network(err.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}
