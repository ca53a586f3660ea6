//! Reference merchants service.
//!
//! Demonstrates the interception pipeline end to end:
//!
//! - `POST /merchants` is public (`no_auth`) and fully excluded from span
//!   decoration (`skip_all`); it creates a merchant and returns the
//!   generated credential token.
//! - `GET /merchants/orders` requires a valid `Authorization` token and is
//!   decorated with identity attributes, but its body is never captured
//!   (`skip_body`).
//!
//! ```text
//! curl -X POST localhost:8080/merchants -d '{"name":"Acme"}'
//! curl localhost:8080/merchants/orders -H "Authorization: <token>"
//! ```

use std::sync::Arc;

use apimetry::prelude::*;
use apimetry_core::BoxFuture;
use apimetry_server::HandlerResult;
use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::Full;
use serde_json::json;

fn json_response(status: StatusCode, body: serde_json::Value) -> Response {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| http::Response::new(Full::new(Bytes::new())))
}

fn create_merchant_handler(
    store: Arc<MerchantStore>,
) -> impl Fn(RequestContext, Request) -> BoxFuture<'static, HandlerResult> + Send + Sync {
    move |_ctx, mut request| {
        let store = Arc::clone(&store);
        Box::pin(async move {
            let bytes = request
                .body_mut()
                .read()
                .map_err(|e| ApimetryError::body_read(e.to_string()))?;

            let payload: serde_json::Value = serde_json::from_slice(&bytes)
                .map_err(|e| ApimetryError::validation(format!("invalid JSON body: {e}")))?;

            let name = payload
                .get("name")
                .and_then(serde_json::Value::as_str)
                .ok_or_else(|| ApimetryError::validation("missing required field: name"))?;

            let merchant = store.create_merchant(name);
            tracing::info!(merchant = %merchant.log_id(), "created merchant");

            // Seed a couple of orders so the orders endpoint has data.
            store.add_order(merchant.id, 1500, "starter pack");
            store.add_order(merchant.id, 4200, "widgets");

            Ok(json_response(
                StatusCode::CREATED,
                json!({
                    "id": merchant.id,
                    "name": merchant.name,
                    "auth_token": merchant.auth_token,
                }),
            ))
        })
    }
}

fn find_orders_handler(
    store: Arc<MerchantStore>,
) -> impl Fn(RequestContext, Request) -> BoxFuture<'static, HandlerResult> + Send + Sync {
    move |ctx, _request| {
        let store = Arc::clone(&store);
        Box::pin(async move {
            let merchant_id = ctx
                .merchant_id()
                .ok_or_else(|| ApimetryError::authorization("no merchant resolved"))?;

            let orders = store.orders_for(merchant_id);
            tracing::info!(merchant_id, order_count = orders.len(), "listing orders");

            Ok(json_response(
                StatusCode::OK,
                json!({ "merchant_id": merchant_id, "orders": orders }),
            ))
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let telemetry = TelemetryConfig::builder()
        .service_name("merchants-demo")
        .logging(apimetry_telemetry::LogConfig::development())
        .build();
    let _guard = init_telemetry(telemetry)?;

    let store = Arc::new(MerchantStore::new());

    let mut router = Router::new();
    router.add_route(
        Method::POST,
        "/merchants",
        "createMerchant",
        RouteMarkers::new().no_auth().skip_all(),
    );
    router.add_route(
        Method::GET,
        "/merchants/orders",
        "findOrders",
        RouteMarkers::new().skip_body(),
    );

    let mut handlers = HandlerRegistry::new();
    handlers.register("createMerchant", create_merchant_handler(Arc::clone(&store)));
    handlers.register("findOrders", find_orders_handler(Arc::clone(&store)));

    let server = Server::builder(store)
        .http_addr("0.0.0.0:8080")
        .router(router)
        .handlers(handlers)
        .span_source(Arc::new(OtelSpanSource::new()))
        .build();

    server.run().await?;
    Ok(())
}
