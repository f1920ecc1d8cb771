//! In-memory client driving a [`Dispatcher`].

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use http_body_util::Full;
use hypatia_server::{App, Dispatcher};
use serde::Serialize;

use crate::error::TestError;
use crate::response::TestResponse;

/// Sends requests straight into a [`Dispatcher`], no sockets involved.
///
/// # Example
///
/// ```
/// use hypatia_core::{handler_fn, Context, Response, ResponseExt};
/// use hypatia_server::App;
/// use hypatia_test::TestClient;
/// use http::StatusCode;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut app = App::new();
/// app.get("/ping", handler_fn(|ctx: &mut Context| {
///     Box::pin(async move {
///         ctx.respond(Response::text(StatusCode::OK, "pong"));
///         Ok(())
///     })
/// }))
/// .unwrap();
///
/// let client = TestClient::from_app(app);
/// let response = client.get("/ping").send().await;
/// response.assert_status(StatusCode::OK);
/// assert_eq!(response.text().unwrap(), "pong");
/// # }
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct TestClient {
    dispatcher: Arc<Dispatcher>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Wraps a built dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            default_headers: Vec::new(),
        }
    }

    /// Builds `app` and wraps the result.
    pub fn from_app(app: App) -> Self {
        Self::new(app.build())
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The dispatcher under test.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a `HEAD` request.
    pub fn head(&self, uri: &str) -> TestRequest<'_> {
        self.request(Method::HEAD, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: &str) -> TestRequest<'_> {
        let mut request = TestRequest {
            client: self,
            builder: http::Request::builder().method(method).uri(uri),
            body: Bytes::new(),
            error: None,
        };
        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }
        request
    }
}

/// A request being assembled for a [`TestClient`].
///
/// Build errors are deferred to [`try_send`](Self::try_send).
#[must_use]
pub struct TestRequest<'a> {
    client: &'a TestClient,
    builder: http::request::Builder,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequest<'_> {
    /// Sets a header, replacing earlier values.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = HeaderName::try_from(name).map_err(|e| TestError::InvalidHeader(e.to_string()));
        let value =
            HeaderValue::try_from(value).map_err(|e| TestError::InvalidHeader(e.to_string()));
        match (name, value) {
            (Ok(name), Ok(value)) => {
                if let Some(headers) = self.builder.headers_mut() {
                    headers.insert(name, value);
                }
            }
            (Err(e), _) | (_, Err(e)) => self.fail(e),
        }
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `content-type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body(bytes).header(CONTENT_TYPE.as_str(), "application/json"),
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Sets a form body and `content-type: application/x-www-form-urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(encoded) => self
                .body(encoded)
                .header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded"),
            Err(e) => {
                self.fail(e.into());
                self
            }
        }
    }

    /// Dispatches the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    pub async fn send(self) -> TestResponse {
        match self.try_send().await {
            Ok(response) => response,
            Err(e) => panic!("test request failed: {e}"),
        }
    }

    /// Dispatches the request, reporting build errors.
    ///
    /// # Errors
    ///
    /// Fails on an invalid URI, header or body encoding.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let request = self
            .builder
            .body(Full::new(self.body))
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;
        let response = self.client.dispatcher.dispatch(request).await;
        Ok(TestResponse::from_response(response).await)
    }

    fn fail(&mut self, error: TestError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use hypatia_core::{handler_fn, Context, Response, ResponseExt};
    use hypatia_response::{respond_with, ResponseOptions};
    use serde_json::{json, Value};

    fn echo_app() -> App {
        let mut app = App::new();
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            app.route(
                method,
                "/echo",
                handler_fn(|ctx: &mut Context| {
                    Box::pin(async move {
                        let body = ctx.validated().body.clone().unwrap_or(Value::Null);
                        let method = ctx.method().to_string();
                        respond_with(ctx, &json!({ "method": method, "body": body }), ResponseOptions::new())?;
                        Ok(())
                    })
                }),
            )
            .unwrap();
        }
        app.get(
            "/header",
            handler_fn(|ctx: &mut Context| {
                Box::pin(async move {
                    let value = ctx.request_header("x-custom").unwrap_or("none").to_string();
                    ctx.respond(Response::text(StatusCode::OK, &value));
                    Ok(())
                })
            }),
        )
        .unwrap();
        app
    }

    #[tokio::test]
    async fn test_json_body_reaches_handler() {
        let client = TestClient::from_app(echo_app());
        let response = client.post("/echo").json(&json!({ "name": "lamp" })).send().await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json().unwrap();
        assert_eq!(body["method"], "POST");
        assert_eq!(body["body"]["name"], "lamp");
    }

    #[tokio::test]
    async fn test_form_body_is_parsed() {
        let client = TestClient::from_app(echo_app());
        let response = client
            .put("/echo")
            .form(&[("title", "Draft one"), ("status", "new")])
            .send()
            .await;

        let body: Value = response.json().unwrap();
        assert_eq!(body["body"]["title"], "Draft one");
        assert_eq!(body["body"]["status"], "new");
    }

    #[tokio::test]
    async fn test_default_and_explicit_headers() {
        let client = TestClient::from_app(echo_app()).with_default_header("x-custom", "default");
        let response = client.get("/header").send().await;
        assert_eq!(response.text().unwrap(), "default");

        let response = client.get("/header").header("x-custom", "override").send().await;
        assert_eq!(response.text().unwrap(), "override");
    }

    #[tokio::test]
    async fn test_invalid_header_is_reported() {
        let client = TestClient::from_app(echo_app());
        let result = client.get("/header").header("bad header", "x").try_send().await;
        assert!(matches!(result, Err(TestError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_missing_route_is_404() {
        let client = TestClient::from_app(echo_app());
        client.delete("/echo").send().await.assert_status(StatusCode::NOT_FOUND);
    }
}
