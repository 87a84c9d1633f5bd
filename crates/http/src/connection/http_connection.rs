use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::{Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, trace, warn};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::{Context, Handler as _};
use crate::protocol::{
    HttpError, Message, ParseError, PayloadItem, PayloadSize, RequestHead, Response, ResponseBody, ResponseHead,
    SendError, StatusCode, Version,
};
use crate::router::RouteTable;

/// Read buffer size for a connection.
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Timeouts applied to a single connection.
///
/// The two durations are different axes of patience: `keep_alive_timeout` is
/// the long wait for an idle persistent connection to send its next request,
/// `request_timeout` bounds every single in-flight read or write. Timing out
/// while idle is a benign close; timing out mid-operation is a connection
/// fault.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionConfig {
    pub request_timeout: Duration,
    pub keep_alive_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { request_timeout: Duration::from_secs(5), keep_alive_timeout: Duration::from_secs(25) }
    }
}

/// The per-connection request/response state machine.
///
/// Composes the codec, the route table and the response helpers over one
/// accepted duplex byte stream. The stream types are generic, so a TLS or
/// any other wrapped transport passes through unexamined.
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
    config: ConnectionConfig,
    peer: Option<String>,
    keep_alive: bool,
    served: usize,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
            config,
            peer: None,
            keep_alive: true,
            served: 0,
        }
    }

    /// Attaches an opaque peer label, used for diagnostics only.
    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = Some(peer.into());
        self
    }

    /// Serves requests on this connection until it closes.
    ///
    /// Every exit path — normal completion, idle timeout, protocol fault,
    /// handler failure — funnels through the shutdown below, so the write
    /// half is flushed and released no matter how the loop ended; dropping
    /// the halves closes the descriptor even if the task is cancelled
    /// mid-await.
    pub async fn serve<S>(mut self, routes: Arc<RouteTable<S>>, globals: Arc<S>) -> Result<(), HttpError>
    where
        S: Send + Sync + 'static,
    {
        let result = self.run(routes, globals).await;
        let _ = self.framed_write.get_mut().shutdown().await;
        if let Some(peer) = &self.peer {
            info!(%peer, served = self.served, "connection closed");
        }
        result
    }

    async fn run<S>(&mut self, routes: Arc<RouteTable<S>>, globals: Arc<S>) -> Result<(), HttpError>
    where
        S: Send + Sync + 'static,
    {
        loop {
            let Some((head, payload_size)) = self.next_head().await? else {
                return Ok(());
            };

            let body = self.read_body(payload_size).await?;
            let request = head.body(body);
            trace!(method = %request.method(), path = %request.path(), "dispatching request");

            // the client's word is final for the rest of the connection
            if !request.keep_alive() {
                self.keep_alive = false;
            }

            let maker = crate::builder::ResponseMaker::new(request.version());

            match routes.lookup(request.path(), request.method()) {
                Some(handler) => {
                    let handler = Arc::clone(handler);
                    let ctx = Context { request, response: maker, globals: Arc::clone(&globals) };
                    match handler.call(ctx).await {
                        Ok(response) => self.write_response(response).await?,
                        Err(cause) => {
                            error!(%cause, "handler failed, answering 500");
                            self.keep_alive = false;
                            let response = synthesize(
                                maker.version(),
                                StatusCode::INTERNAL_SERVER_ERROR,
                                Some("<h1>Internal Server Error</h1>"),
                            );
                            self.write_response(response).await?;
                            return Err(HttpError::handler(cause));
                        }
                    }
                }
                None => {
                    info!(path = %request.path(), "no route matched, answering 404");
                    self.keep_alive = false;
                    let response = synthesize(maker.version(), StatusCode::NOT_FOUND, Some("<h1>Page Not Found</h1>"));
                    self.write_response(response).await?;
                    return Ok(());
                }
            }

            self.served += 1;
            if !self.keep_alive {
                trace!("connection marked close, leaving request loop");
                return Ok(());
            }
        }
    }

    /// Waits for the next request head.
    ///
    /// Returns `Ok(None)` on the two graceful endings: a clean end of stream
    /// at a request boundary, or an idle timeout after at least one request
    /// was served. A timeout before the very first request is a fault.
    async fn next_head(&mut self) -> Result<Option<(RequestHead, PayloadSize)>, HttpError> {
        let idle = self.served > 0;
        let wait = if idle { self.config.keep_alive_timeout } else { self.config.request_timeout };

        let frame = match timeout(wait, self.framed_read.next()).await {
            Ok(frame) => frame,
            Err(_) if idle => {
                info!("idle keep-alive connection timed out, closing");
                return Ok(None);
            }
            Err(_) => return Err(HttpError::timeout("awaiting first request")),
        };

        match frame {
            Some(Ok(Message::Head(head))) => Ok(Some(head)),
            Some(Ok(Message::Payload(_))) => {
                error!("received payload bytes while awaiting a request head");
                Err(ParseError::invalid_body("payload while awaiting request head").into())
            }
            Some(Err(e)) => {
                // method and version rejections get a status before the
                // drop; anything malformed is dropped without a response
                match &e {
                    ParseError::UnsupportedMethod { method } => {
                        warn!(%method, "rejecting unsupported method");
                        self.keep_alive = false;
                        self.write_response(synthesize(Version::Http11, StatusCode::BAD_REQUEST, None)).await?;
                    }
                    ParseError::UnsupportedVersion { version } => {
                        warn!(%version, "rejecting unsupported protocol version");
                        self.keep_alive = false;
                        self.write_response(synthesize(Version::Http11, StatusCode::HTTP_VERSION_NOT_SUPPORTED, None))
                            .await?;
                    }
                    _ => warn!(cause = %e, "dropping connection without a response"),
                }
                Err(e.into())
            }
            None => {
                trace!("end of stream, no further requests");
                Ok(None)
            }
        }
    }

    /// Drains the request payload into one buffer; each read is bounded by
    /// the per-operation timeout.
    async fn read_body(&mut self, payload_size: PayloadSize) -> Result<Option<Bytes>, HttpError> {
        let mut buf = BytesMut::new();
        loop {
            let frame = timeout(self.config.request_timeout, self.framed_read.next())
                .await
                .map_err(|_| HttpError::timeout("reading request body"))?;

            match frame {
                Some(Ok(Message::Payload(PayloadItem::Chunk(bytes)))) => buf.extend_from_slice(&bytes),
                Some(Ok(Message::Payload(PayloadItem::Eof))) => break,
                Some(Ok(Message::Head(_))) => {
                    return Err(ParseError::invalid_body("request head while reading body").into());
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ParseError::invalid_body("connection closed mid-body").into()),
            }
        }

        if payload_size.is_empty() { Ok(None) } else { Ok(Some(buf.freeze())) }
    }

    /// Serializes one response: head frame first, then payload frames, each
    /// write bounded by the per-operation timeout.
    async fn write_response(&mut self, mut response: Response) -> Result<(), HttpError> {
        // every response is tagged with the session's current keep-alive
        // decision so client and server agree on the connection's fate
        response.headers_mut().set("Connection", if self.keep_alive { "keep-alive" } else { "close" });
        if !response.headers().contains("date") {
            response.headers_mut().set("Date", httpdate::fmt_http_date(SystemTime::now()));
        }

        let payload_size = response.body().payload_size();
        let (head, body) = response.into_parts();

        let head_message = Message::Head((head, payload_size));
        if payload_size.is_empty() {
            // the head is the whole response, flush it out
            self.send(head_message, "writing response head").await?;
        } else {
            self.feed(head_message).await?;
        }

        match body {
            ResponseBody::Full(bytes) if !payload_size.is_empty() => {
                self.feed(Message::Payload(PayloadItem::Chunk(bytes))).await?;
                self.send(Message::Payload(PayloadItem::Eof), "writing response body").await?;
            }
            ResponseBody::Stream(mut stream) => {
                // the header block goes out before the first chunk
                self.flush("flushing response head").await?;
                while let Some(chunk) = stream.next_chunk().await {
                    let chunk = chunk.map_err(|e| {
                        error!(cause = %e, "response stream failed, aborting connection");
                        SendError::io(e)
                    })?;
                    self.send(Message::Payload(PayloadItem::Chunk(chunk)), "writing body chunk").await?;
                }
                self.send(Message::Payload(PayloadItem::Eof), "finishing chunked body").await?;
            }
            _ => {}
        }

        Ok(())
    }

    async fn feed(&mut self, message: Message<(ResponseHead, PayloadSize)>) -> Result<(), HttpError> {
        self.framed_write.feed(message).await?;
        Ok(())
    }

    async fn send(&mut self, message: Message<(ResponseHead, PayloadSize)>, operation: &'static str) -> Result<(), HttpError> {
        timeout(self.config.request_timeout, self.framed_write.send(message))
            .await
            .map_err(|_| HttpError::timeout(operation))??;
        Ok(())
    }

    async fn flush(&mut self, operation: &'static str) -> Result<(), HttpError> {
        timeout(self.config.request_timeout, self.framed_write.flush())
            .await
            .map_err(|_| HttpError::timeout(operation))??;
        Ok(())
    }
}

/// Builds the engine's own fixed responses: 404, 500, and the pre-drop
/// statuses for protocol rejections.
fn synthesize(version: Version, status: StatusCode, html: Option<&'static str>) -> Response {
    let mut response = Response::new(version, status);
    if let Some(html) = html {
        response.headers_mut().set("Content-Type", mime::TEXT_HTML_UTF_8.as_ref());
        response.headers_mut().set("Content-Length", html.len().to_string());
        response.set_body(ResponseBody::Full(Bytes::from_static(html.as_bytes())));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{HandlerError, make_handler};
    use crate::protocol::ChunkStream;
    use crate::router::RouteGroup;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, duplex, split};

    async fn index(ctx: Context<()>) -> Result<Response, HandlerError> {
        Ok(ctx.response.html(200, "<h1>Hello World!</h1>")?)
    }

    async fn api(ctx: Context<()>) -> Result<Response, HandlerError> {
        Ok(ctx.response.json(200, &serde_json::json!({"message": "Hello World!"}))?)
    }

    async fn echo(ctx: Context<()>) -> Result<Response, HandlerError> {
        let body = ctx.request.body().cloned().unwrap_or_default();
        let text = String::from_utf8(body.to_vec())?;
        Ok(ctx.response.text(200, text)?)
    }

    async fn stream(ctx: Context<()>) -> Result<Response, HandlerError> {
        let chunks = ChunkStream::from_iter((0..3).map(|i| Bytes::from(format!("part{i}"))));
        Ok(ctx.response.content_stream(200, "text/plain", chunks)?)
    }

    async fn broken(_ctx: Context<()>) -> Result<Response, HandlerError> {
        Err("boom".into())
    }

    fn routes() -> Arc<RouteTable<()>> {
        Arc::new(
            RouteGroup::root()
                .route("/", crate::protocol::Method::Get, make_handler(index))
                .route("api", crate::protocol::Method::Get, make_handler(api))
                .route("echo", crate::protocol::Method::Post, make_handler(echo))
                .route("stream", crate::protocol::Method::Get, make_handler(stream))
                .route("broken", crate::protocol::Method::Get, make_handler(broken))
                .into_table(),
        )
    }

    /// Feeds `input` to a connection and returns everything it wrote plus
    /// the serve result.
    async fn exchange(input: &str) -> (String, Result<(), HttpError>) {
        let (client, server) = duplex(64 * 1024);
        let (server_read, server_write) = split(server);
        let connection = HttpConnection::new(server_read, server_write).with_peer("test");

        let serve = tokio::spawn(connection.serve(routes(), Arc::new(())));

        let (mut client_read, mut client_write) = split(client);
        client_write.write_all(input.as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();

        let mut output = Vec::new();
        client_read.read_to_end(&mut output).await.unwrap();

        let result = serve.await.unwrap();
        (String::from_utf8(output).unwrap(), result)
    }

    #[tokio::test]
    async fn serves_a_simple_request() {
        let (output, result) = exchange("GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.1 200\r\n"));
        assert!(output.contains("Connection: keep-alive\r\n"));
        assert!(output.contains("Date: "));
        assert!(output.ends_with("<h1>Hello World!</h1>"));
    }

    #[tokio::test]
    async fn json_route_scenario() {
        let (output, result) = exchange("GET /api HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(result.is_ok());
        let body = r#"{"message":"Hello World!"}"#;
        assert!(output.contains("Content-Type: application/json\r\n"));
        assert!(output.contains(&format!("Content-Length: {}\r\n", body.len())));
        assert!(output.ends_with(body));
    }

    #[tokio::test]
    async fn keep_alive_serves_sequential_requests() {
        let input = "GET / HTTP/1.1\r\nHost: x\r\n\r\nGET /api HTTP/1.1\r\nHost: x\r\n\r\n";
        let (output, result) = exchange(input).await;

        assert!(result.is_ok());
        assert_eq!(output.matches("HTTP/1.1 200\r\n").count(), 2);
        assert_eq!(output.matches("Connection: keep-alive\r\n").count(), 2);
    }

    #[tokio::test]
    async fn connection_close_ends_after_first_response() {
        let input =
            "GET / HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\nGET /api HTTP/1.1\r\nHost: x\r\n\r\n";
        let (output, result) = exchange(input).await;

        assert!(result.is_ok());
        // only the first request is answered
        assert_eq!(output.matches("HTTP/1.1 200\r\n").count(), 1);
        assert!(output.contains("Connection: close\r\n"));
        assert!(!output.contains("application/json"));
    }

    #[tokio::test]
    async fn http10_request_closes_by_default() {
        let (output, result) = exchange("GET / HTTP/1.0\r\nHost: x\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.0 200\r\n"));
        assert!(output.contains("Connection: close\r\n"));
    }

    #[tokio::test]
    async fn request_body_reaches_the_handler() {
        let input = "POST /echo HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhello";
        let (output, result) = exchange(input).await;

        assert!(result.is_ok());
        assert!(output.ends_with("hello"));
    }

    #[tokio::test]
    async fn chunked_request_body_reaches_the_handler() {
        let input = "POST /echo HTTP/1.1\r\nHost: x\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let (output, result) = exchange(input).await;

        assert!(result.is_ok());
        assert!(output.ends_with("hello"));
    }

    #[tokio::test]
    async fn streamed_response_is_chunk_framed() {
        let (output, result) = exchange("GET /stream HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(output.contains("Transfer-Encoding: chunked\r\n"));
        assert!(output.contains("5\r\npart0\r\n"));
        assert!(output.contains("5\r\npart2\r\n"));
        assert!(output.ends_with("0\r\n\r\n"));
    }

    #[tokio::test]
    async fn unmatched_route_gets_404_and_close() {
        let (output, result) = exchange("GET /missing HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(result.is_ok());
        assert!(output.starts_with("HTTP/1.1 404\r\n"));
        assert!(output.contains("Connection: close\r\n"));
        assert!(output.ends_with("<h1>Page Not Found</h1>"));
    }

    #[tokio::test]
    async fn handler_failure_gets_500_and_tears_down() {
        let (output, result) = exchange("GET /broken HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::Handler { .. })));
        assert!(output.starts_with("HTTP/1.1 500\r\n"));
        assert!(output.contains("Connection: close\r\n"));
        assert!(output.ends_with("<h1>Internal Server Error</h1>"));
    }

    #[tokio::test]
    async fn unsupported_method_gets_400() {
        let (output, result) = exchange("BREW /pot HTTP/1.1\r\nHost: x\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::Request { source: ParseError::UnsupportedMethod { .. } })));
        assert!(output.starts_with("HTTP/1.1 400\r\n"));
    }

    #[tokio::test]
    async fn unsupported_version_gets_505() {
        let (output, result) = exchange("GET / HTTP/2.0\r\nHost: x\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::Request { source: ParseError::UnsupportedVersion { .. } })));
        assert!(output.starts_with("HTTP/1.1 505\r\n"));
    }

    #[tokio::test]
    async fn malformed_request_is_dropped_silently() {
        let (output, result) = exchange("GET / HTTP/1.1\r\nHost x\r\n\r\n").await;

        assert!(matches!(result, Err(HttpError::Request { source: ParseError::MalformedHeaderLine { .. } })));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn first_read_timeout_is_a_fault() {
        let (client, server) = duplex(1024);
        let (server_read, server_write) = split(server);
        let config = ConnectionConfig {
            request_timeout: Duration::from_millis(50),
            keep_alive_timeout: Duration::from_millis(500),
        };
        let connection = HttpConnection::with_config(server_read, server_write, config);

        // the client stays connected but never sends a byte
        let result = connection.serve(routes(), Arc::new(())).await;
        assert!(matches!(result, Err(HttpError::Timeout { .. })));
        drop(client);
    }

    #[tokio::test]
    async fn idle_timeout_after_a_request_is_graceful() {
        let (client, server) = duplex(64 * 1024);
        let (server_read, server_write) = split(server);
        let config = ConnectionConfig {
            request_timeout: Duration::from_millis(500),
            keep_alive_timeout: Duration::from_millis(50),
        };
        let connection = HttpConnection::with_config(server_read, server_write, config);

        let (mut client_read, mut client_write) = split(client);
        client_write.write_all(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();
        // the client goes idle without closing

        let result = connection.serve(routes(), Arc::new(())).await;
        assert!(result.is_ok());

        let mut output = Vec::new();
        client_read.read_to_end(&mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("HTTP/1.1 200\r\n"));
    }
}
