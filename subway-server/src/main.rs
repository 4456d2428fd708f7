use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use subway_server::service::LineService;
use subway_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let service = LineService::new();
    let state = AppState::new(service);
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    println!("Subway line manager listening on http://{addr}");
    println!();
    println!("API Endpoints:");
    println!("  POST   /stations           - Register a station");
    println!("  GET    /stations           - List stations");
    println!("  DELETE /stations/:id       - Delete an unused station");
    println!("  POST   /lines              - Create a line with its first section");
    println!("  GET    /lines              - List lines with ordered stations");
    println!("  GET    /lines/:id          - Show one line");
    println!("  PUT    /lines/:id          - Rename/recolor a line");
    println!("  DELETE /lines/:id          - Delete a line and its sections");
    println!("  POST   /lines/:id/sections - Add a section to a line");
    println!("  DELETE /lines/:id/sections?stationId=N - Remove the terminal station");
    println!("  GET    /health             - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
