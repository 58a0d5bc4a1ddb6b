//! Route definitions for the API server

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Creates the main application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    // The dashboard front end is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Sidebar choices
        .route("/selection", get(handlers::get_selection))
        // Views
        .route("/overview", get(handlers::get_overview))
        .route("/startups/:name", get(handlers::get_startup))
        .route("/investors/:name", get(handlers::get_investor))
        // Ad-hoc grouped aggregates
        .route("/aggregate/:op/:field", get(handlers::get_aggregate))
        .route("/dataset/reload", post(handlers::reload_dataset))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::funding_record::FundingRecord;
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Serves the router on an ephemeral port and returns the raw response.
    async fn send(request_line: &str) -> String {
        let dataset = Dataset::from_records(vec![FundingRecord::new(
            NaiveDate::from_ymd_opt(2020, 1, 9),
            "BYJU'S",
            "EdTech",
            "Bengaluru",
            "Tiger Global",
            "Private Equity",
            Some(1500.0),
        )]);
        let state = Arc::new(AppState::from_dataset(dataset, "unused.csv"));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "{}\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            request_line
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_unknown_startup_is_json_404() {
        let response = send("GET /startups/Unknown HTTP/1.1").await;
        assert!(response.starts_with("HTTP/1.1 404"), "{}", response);
        assert!(response.contains(r#""error":"StartupNotFound""#), "{}", response);
        assert!(response.contains("Unknown"));
    }

    #[tokio::test]
    async fn test_known_routes_are_mounted() {
        let response = send("GET /health HTTP/1.1").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.contains(r#""records":1"#));

        let response = send("GET /aggregate/sum/city HTTP/1.1").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
        assert!(response.contains("Bengaluru"));

        let response = send("GET /aggregate/sum/valuation HTTP/1.1").await;
        assert!(response.starts_with("HTTP/1.1 400"), "{}", response);
    }
}
