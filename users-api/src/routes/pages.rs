//! Server-rendered HTML views.

use axum::{extract::State, response::Html, routing::get, Router};
use tracing::instrument;

use crate::{app_state::AppState, domain::models::UserRecord};

const USER_COLUMNS: [&str; 6] = [
    "ID",
    "Name",
    "Surname",
    "Second name",
    "Email",
    "Phone number",
];

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users_page))
        .route("/upload", get(upload_page))
}

#[instrument(name = "GET /users", skip(app_state))]
async fn users_page(State(app_state): State<AppState>) -> Html<String> {
    let users = app_state.user_directory.list_users().await;

    Html(render_users(&users))
}

async fn upload_page() -> Html<String> {
    Html(layout(
        "Upload users",
        r#"<form action="/api/upload-csv" method="post" enctype="multipart/form-data">
    <input type="file" name="file" accept=".csv,text/csv" required>
    <button type="submit">Upload</button>
</form>"#,
    ))
}

fn render_users(users: &[UserRecord]) -> String {
    let header = USER_COLUMNS
        .iter()
        .map(|title| format!("<th>{title}</th>"))
        .collect::<String>();

    let body = if users.is_empty() {
        format!(
            r#"<tr><td colspan="{}">No users yet.</td></tr>"#,
            USER_COLUMNS.len()
        )
    } else {
        users.iter().map(render_user_row).collect::<String>()
    };

    layout(
        "Users",
        &format!(
            r#"<p><a href="/upload">Upload CSV</a></p>
<table>
    <thead><tr>{header}</tr></thead>
    <tbody>{body}</tbody>
</table>"#
        ),
    )
}

fn render_user_row(user: &UserRecord) -> String {
    let cells = [
        &user.id,
        &user.name,
        &user.surname,
        &user.second_name,
        &user.email,
        &user.phone_number,
    ]
    .into_iter()
    .map(|value| format!("<td>{}</td>", ammonia::clean_text(value)))
    .collect::<String>();

    format!("<tr>{cells}</tr>")
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/styles.css">
</head>
<body>
    <h1>{title}</h1>
    {content}
</body>
</html>"#
    )
}
