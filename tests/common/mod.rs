//! In-process harness: the full router over an in-memory database.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shelf_kernel::settings::Settings;

const BOUNDARY: &str = "shelf-test-boundary";

pub struct TestApp {
    router: Router,
    _media: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(|_| {}).await
    }

    pub async fn with_settings(configure: impl FnOnce(&mut Settings)) -> Self {
        let media = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.database.url = "sqlite::memory:".to_string();
        settings.media.root = media.path().to_path_buf();
        configure(&mut settings);

        let (registry, state) = shelf_app::bootstrap(settings).await.unwrap();
        let router = shelf_http::build_router(&registry, &state);

        Self {
            router,
            _media: media,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, path: &str, session: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = session {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        session: Option<&str>,
        fields: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = session {
            builder = builder.header(COOKIE, cookie);
        }
        let body = serde_urlencoded::to_string(fields).unwrap();
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Multipart POST; `file` is `(field, file name, content type, bytes)`.
    pub async fn post_multipart(
        &self,
        path: &str,
        session: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &str, &[u8])>,
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some((name, file_name, content_type, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, name, file_name, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(cookie) = session {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    /// Register a user and return the `name=value` session cookie.
    pub async fn signup(&self, username: &str) -> String {
        let response = self
            .post_form(
                "/accounts/signup/",
                None,
                &[("username", username), ("password", "correct-horse")],
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response)
    }

    /// Create a shelf as `session` and return its id.
    pub async fn create_shelf(&self, session: &str, title: &str) -> i64 {
        let response = self
            .post_multipart(
                "/book/create/",
                Some(session),
                &[("title", title), ("text", "about it"), ("category", "hobby")],
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let listing = json(self.get("/", None).await).await;
        listing["shelves"]
            .as_array()
            .unwrap()
            .iter()
            .find(|shelf| shelf["title"] == title)
            .and_then(|shelf| shelf["id"].as_i64())
            .unwrap()
    }

    pub async fn review(&self, session: &str, shelf_id: i64, rate: i64) -> Response {
        let rate = rate.to_string();
        self.post_form(
            &format!("/book/{}/review/", shelf_id),
            Some(session),
            &[("title", "thoughts"), ("text", "worth a read"), ("rate", &rate)],
        )
        .await
    }
}

pub fn session_cookie(response: &Response) -> String {
    let header = response.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_string()
}

pub fn location(response: &Response) -> String {
    response.headers()[LOCATION].to_str().unwrap().to_string()
}

pub async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn error_message(response: Response) -> String {
    json(response).await["error"]["message"]
        .as_str()
        .unwrap()
        .to_string()
}
