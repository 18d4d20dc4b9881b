use std::sync::Arc;

use reqwest::Client;
use tokio_util::sync::CancellationToken;

use crate::{
    api::{SiteState, WidgetView},
    config::Config,
    error, info,
    nowplaying::{ConsoleDiagnostics, Widget, select_source},
    server, success,
};

/// Serves the site and keeps the widget polling until Ctrl-C.
pub async fn serve(config: Config) {
    let client = Client::new();

    let handle = select_source(&config, client.clone()).map(|source| {
        info!("Now playing source: {}", source.kind());
        Widget::new(source, Arc::new(ConsoleDiagnostics), config.poll_interval).mount()
    });

    let listener = match server::bind(&config.server_addr).await {
        Ok(listener) => listener,
        Err(e) => error!("Cannot bind {}: {}", config.server_addr, e),
    };

    let site = SiteState {
        widget: handle.as_ref().map(WidgetView::of),
        config: Arc::new(config),
        client,
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    success!("Serving on http://{}", site.config.server_addr);
    if let Err(e) = server::start_site_server(listener, site, shutdown).await {
        error!("Server stopped: {}", e);
    }

    if let Some(handle) = handle {
        handle.shutdown().await;
    }
    info!("Stopped.");
}
