use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::api::SiteState;

pub async fn health(Extension(site): Extension<SiteState>) -> Json<Value> {
    let now_playing = match &site.widget {
        Some(widget) => json!({
            "source": widget.kind.to_string(),
            "state": widget.current().label(),
        }),
        None => Value::Null,
    };

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "now_playing": now_playing,
    }))
}
