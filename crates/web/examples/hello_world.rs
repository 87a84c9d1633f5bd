use pico_web::{Context, HandlerError, Method, RequestExt, Response, RouteGroup, Server, make_handler};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

async fn get_index(ctx: Context<()>) -> Result<Response, HandlerError> {
    Ok(ctx.response.html(
        200,
        "<h1>Hello World!</h1>\
         <form action='/' method='POST'>\
         <input name='name' placeholder='enter name here...'>\
         <button>Submit</button>\
         </form>",
    )?)
}

async fn post_name(ctx: Context<()>) -> Result<Response, HandlerError> {
    let form = ctx.request.form()?;
    let name = form.iter().find(|(k, _)| k == "name").map(|(_, v)| v.as_str()).unwrap_or("stranger");
    Ok(ctx.response.html(200, format!("<h1>Hello {name}!</h1>"))?)
}

async fn get_api_index(ctx: Context<()>) -> Result<Response, HandlerError> {
    Ok(ctx.response.json(200, &serde_json::json!({"message": "Hello World!"}))?)
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let routes = RouteGroup::root()
        .route("/", Method::Get, make_handler(get_index))
        .route("/", Method::Post, make_handler(post_name))
        .route("api", Method::Get, make_handler(get_api_index));

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
