//! Streamed responses: a generated chunk sequence and a file, plus a route
//! group merged under a prefix.

use bytes::Bytes;
use pico_web::{ChunkStream, Context, HandlerError, Method, Response, RouteGroup, Server, make_handler};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

async fn get_stream(ctx: Context<()>) -> Result<Response, HandlerError> {
    let chunks = ChunkStream::from_iter((0..100).map(|i| Bytes::from(format!("Hello '{i}'\n"))));
    Ok(ctx.response.content_stream(200, "text/plain", chunks)?)
}

async fn get_manifest(ctx: Context<()>) -> Result<Response, HandlerError> {
    Ok(ctx.response.file("Cargo.toml", "text/plain").await?)
}

async fn get_docs_redirect(ctx: Context<()>) -> Result<Response, HandlerError> {
    Ok(ctx.response.redirect(302, "/files/manifest")?)
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let files = RouteGroup::new("/files").route("manifest", Method::Get, make_handler(get_manifest));

    let routes = RouteGroup::root()
        .route("stream", Method::Get, make_handler(get_stream))
        .route("docs", Method::Get, make_handler(get_docs_redirect))
        .merge(files);

    let mut server = Server::builder()
        .address("127.0.0.1:8000")
        .routes(routes)
        .globals(())
        .build()
        .expect("server configuration is incomplete");

    server.start().await.expect("failed to start server");

    tokio::signal::ctrl_c().await.ok();
    server.stop().await.expect("failed to stop server");
}
