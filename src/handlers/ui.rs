use axum::response::Html;

/// Serve the browser upload/progress page.
pub async fn ui_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
