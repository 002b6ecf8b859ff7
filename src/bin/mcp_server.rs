//! browser-marks MCP Server
//!
//! This binary serves page marking over the Model Context Protocol (MCP). Clients can mark
//! the interactive elements of a page, capture a screenshot with the marks drawn in, and
//! remove the marks again.

use browser_marks::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use browser_marks::mcp::BrowserServer;
use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};

use rmcp::transport::{
    sse_server::{SseServer, SseServerConfig},
    streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// Server-Sent Events transport
    Sse,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "mcp-server")]
#[command(version)]
#[command(about = "Page marking MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<String>,

    /// WebSocket endpoint URL of a running browser to use instead of launching one
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<String>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for SSE or HTTP transport
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// SSE endpoint path
    #[arg(long, default_value = "/sse")]
    sse_path: String,

    /// SSE POST path for messages
    #[arg(long, default_value = "/message")]
    sse_post_path: String,

    /// HTTP streamable endpoint path
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

impl Cli {
    fn launch_options(&self) -> LaunchOptions {
        let mut options = LaunchOptions::new().headless(!self.headed);
        if let Some(path) = &self.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(dir) = &self.user_data_dir {
            options = options.user_data_dir(dir);
        }
        options
    }

    fn server(&self) -> browser_marks::Result<BrowserServer> {
        match &self.ws_endpoint {
            Some(endpoint) => Ok(BrowserServer::with_session(BrowserSession::connect(ConnectionOptions::new(
                endpoint.clone(),
            ))?)),
            None => BrowserServer::with_options(self.launch_options()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the stdio transport
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    log::info!("browser-marks MCP server v{}", env!("CARGO_PKG_VERSION"));
    match &cli.ws_endpoint {
        Some(endpoint) => log::info!("Browser: connecting to {}", endpoint),
        None => log::info!("Browser mode: {}", if cli.headed { "headed" } else { "headless" }),
    }

    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let service = cli.server().map_err(|e| format!("Failed to create browser server: {}", e))?;
            let server = service.serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
            // Let browser destructors finish before the runtime goes away
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }
        Transport::Sse => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let config = SseServerConfig {
                bind: bind_addr.parse()?,
                sse_path: cli.sse_path.clone(),
                post_path: cli.sse_post_path.clone(),
                ct: CancellationToken::new(),
                sse_keep_alive: None,
            };

            let (sse_server, router) = SseServer::new(config);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.sse_path);

            // One browser per SSE connection
            let options = cli.launch_options();
            let _cancellation_token = sse_server.with_service(move || {
                BrowserServer::with_options(options.clone()).expect("Failed to create browser server")
            });

            let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
            axum::serve(listener, router.into_make_service()).await?;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let options = cli.launch_options();
            let service_factory = move || {
                BrowserServer::with_options(options.clone()).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
            };

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
