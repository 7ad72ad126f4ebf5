use anyhow::Context;
use rmcp::{
    ErrorData as McpError, ServiceExt,
    handler::server::{ServerHandler, tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
    transport::streamable_http_server::{
        StreamableHttpService, session::local::LocalSessionManager,
    },
};
use serde::Deserialize;
use tracing::{error, info};
use weather_forecast_core::{ServerConfig, WeatherService, service::DEFAULT_QUERY_TYPE};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetWeatherDataRequest {
    #[schemars(description = "Name of the city to fetch weather for")]
    pub city_name: String,

    #[serde(default = "default_query_type")]
    #[schemars(description = "Type of query: \"current\" or \"historical\" (default: \"current\")")]
    pub query_type: String,

    #[serde(default)]
    #[schemars(description = "Start date for historical data in YYYY-MM-DD format (default: 30 days ago)")]
    pub start_date: Option<String>,

    #[serde(default)]
    #[schemars(description = "End date for historical data in YYYY-MM-DD format (default: yesterday)")]
    pub end_date: Option<String>,
}

fn default_query_type() -> String {
    DEFAULT_QUERY_TYPE.to_string()
}

/// MCP handler exposing [`WeatherService`] as the `get_weather_data` tool.
#[derive(Clone)]
pub struct WeatherForecastServer {
    service: WeatherService,
    tool_router: ToolRouter<Self>,
}

impl WeatherForecastServer {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl WeatherForecastServer {
    #[tool(
        description = "Fetch weather data for a city. query_type \"current\" returns current conditions; \"historical\" returns daily data between start_date and end_date (YYYY-MM-DD, defaulting to the last 30 days). Returns a JSON string; failures carry an \"error\" key."
    )]
    async fn get_weather_data(
        &self,
        Parameters(request): Parameters<GetWeatherDataRequest>,
    ) -> Result<CallToolResult, McpError> {
        let json = self
            .service
            .get_weather_data_json(
                &request.city_name,
                Some(&request.query_type),
                request.start_date.as_deref(),
                request.end_date.as_deref(),
            )
            .await;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for WeatherForecastServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Weather data by city name, powered by Open-Meteo. Use get_weather_data for \
                 current conditions or a historical daily range."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

/// Serve over streamable HTTP until Ctrl-C.
pub async fn serve_http(server: WeatherForecastServer, config: &ServerConfig) -> anyhow::Result<()> {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    let path = mount_path(&config.path);
    let router = match path.as_deref() {
        None => axum::Router::new().fallback_service(service),
        Some(path) => axum::Router::new().nest_service(path, service),
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(
        "MCP server listening on http://{}{}",
        addr,
        path.as_deref().unwrap_or("/")
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Normalise a configured mount path to the form axum nests under.
/// `None` means the service takes over the root.
fn mount_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('/') {
        Some(trimmed.to_string())
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Serve over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: WeatherForecastServer) -> anyhow::Result<()> {
    info!("MCP server listening on stdio");

    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| error!("MCP serve error: {:?}", e))?;

    let reason = running.waiting().await?;
    info!("Server stopped: {:?}", reason);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
