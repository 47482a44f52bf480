// src/dispatcher.rs
// Request routing and file delivery over the immutable file registry

use actix_web::http::header::{
    HeaderMap, HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE,
};
use actix_web::http::{Method, StatusCode};
use std::sync::Arc;
use tokio::fs::File;

use crate::content_type::ContentTypeTable;
use crate::registry::FileRegistry;

const INDEX_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const ALLOWED_METHODS: &str = "GET, HEAD";

/// Payload of a [`Reply`].
#[derive(Debug)]
pub enum ReplyBody {
    Empty,
    Html(String),
    /// Open handle of a registered file and its size at open time.
    File { file: File, len: u64 },
    /// HEAD response: no payload, but the length a GET would have sent.
    Omitted { len: u64 },
}

/// Transport independent description of a response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ReplyBody,
}

impl Reply {
    fn empty(status: StatusCode) -> Self {
        Reply {
            status,
            headers: HeaderMap::new(),
            body: ReplyBody::Empty,
        }
    }

    fn not_found() -> Self {
        Reply::empty(StatusCode::NOT_FOUND)
    }

    fn method_not_allowed() -> Self {
        let mut reply = Reply::empty(StatusCode::METHOD_NOT_ALLOWED);
        reply
            .headers
            .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        reply
    }

    fn ok(content_type: &'static str, len: u64, body: ReplyBody) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
        Reply {
            status: StatusCode::OK,
            headers,
            body,
        }
    }
}

/// Answers requests for the index page and for registered files.
///
/// Holds only shared immutable data, so one instance can serve any number of
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<FileRegistry>,
    content_types: Arc<ContentTypeTable>,
}

impl Dispatcher {
    pub fn new(registry: Arc<FileRegistry>, content_types: Arc<ContentTypeTable>) -> Self {
        Dispatcher {
            registry,
            content_types,
        }
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Render the HTML file list. Only ever routed for the exact index path.
    pub fn serve_index(&self, method: &Method) -> Reply {
        if !is_allowed(method) {
            return Reply::method_not_allowed();
        }

        let html = self.render_index();
        let len = html.len() as u64;
        let body = if method == Method::HEAD {
            ReplyBody::Omitted { len }
        } else {
            ReplyBody::Html(html)
        };
        Reply::ok(INDEX_CONTENT_TYPE, len, body)
    }

    /// Resolve a raw (still percent-encoded) request path to a registered file.
    pub async fn serve_path(&self, method: &Method, raw_path: &str) -> Reply {
        if !is_allowed(method) {
            return Reply::method_not_allowed();
        }

        let path = raw_path.strip_prefix('/').unwrap_or(raw_path);
        let path = match self.registry.prefix() {
            Some(prefix) => match path
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('/'))
            {
                Some(rest) => rest,
                None => {
                    log::debug!("{} is outside of prefix /{}/", raw_path, prefix);
                    return Reply::not_found();
                }
            },
            None => path,
        };

        let decoded = urlencoding::decode_binary(path.as_bytes());
        let entry = match self.registry.find(&decoded) {
            Some(entry) => entry,
            None => {
                log::debug!("{} does not name a shared file", raw_path);
                return Reply::not_found();
            }
        };

        let file = match File::open(entry.path()).await {
            Ok(file) => file,
            Err(e) => {
                log::warn!("open({}) failed: {}", entry.path().display(), e);
                return Reply::not_found();
            }
        };

        let metadata = match file.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("stat({}) failed: {}", entry.path().display(), e);
                return Reply::not_found();
            }
        };

        // A fixed Content-Length needs a regular file.
        if !metadata.is_file() {
            log::warn!("{} is not a regular file", entry.path().display());
            return Reply::not_found();
        }

        let len = metadata.len();
        let content_type = self.content_types.resolve(&entry.display_name());
        let body = if method == Method::HEAD {
            ReplyBody::Omitted { len }
        } else {
            ReplyBody::File { file, len }
        };

        Reply::ok(content_type, len, body)
    }

    fn render_index(&self) -> String {
        let mut html = String::from(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Shared files</title>\n</head>\n<body>\n<h1>Shared files</h1>\n<ul>\n",
        );

        for entry in self.registry.entries() {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                escape_html(&self.registry.href(entry)),
                escape_html(&entry.display_name())
            ));
        }

        html.push_str("</ul>\n</body>\n</html>\n");
        html
    }
}

fn is_allowed(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
