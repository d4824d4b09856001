//! Test helpers: local HTTP servers standing in for remote services.

use axum::Router;

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });

    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub(crate) async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}")
}
