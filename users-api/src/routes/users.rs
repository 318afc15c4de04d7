use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::{
        models::{Table, UserRecord},
        UserDirectoryError,
    },
    routes::ApiError,
};

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
}

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload-csv", post(upload_csv))
        .route_layer(DefaultBodyLimit::max(max_upload_bytes))
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/data", get(raw_data))
}

#[instrument(name = "GET /api/users", skip(app_state))]
async fn list_users(State(app_state): State<AppState>) -> Json<Vec<UserRecord>> {
    Json(app_state.user_directory.list_users().await)
}

#[instrument(name = "GET /api/users/:user_id", skip(app_state))]
async fn get_user(
    Path(user_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<UserRecord>, ApiError> {
    let user = app_state.user_directory.get_user(&user_id).await?;

    Ok(Json(user))
}

#[instrument(name = "GET /api/data", skip(app_state))]
async fn raw_data(State(app_state): State<AppState>) -> Result<Json<Table>, ApiError> {
    let table = app_state.user_directory.raw_rows().await?;

    Ok(Json(table))
}

#[instrument(name = "POST /api/upload-csv", skip_all)]
async fn upload_csv(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let content = extract_csv_from_multipart(&mut multipart).await?;

    if !app_state.user_directory.validate_upload(&content) {
        return Err(UserDirectoryError::InvalidStructure.into());
    }

    app_state
        .user_directory
        .ingest_upload(&content)
        .await
        .map_err(|_| ApiError::internal("Failed to save data"))?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
    }))
}

async fn extract_csv_from_multipart(multipart: &mut Multipart) -> Result<String, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("failed to parse multipart field"))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::bad_request("failed to read uploaded file"))?;

        return String::from_utf8(bytes.to_vec())
            .map_err(|_| ApiError::bad_request("uploaded file is not valid UTF-8"));
    }

    Err(ApiError::bad_request("missing file field"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::router::test_support::test_router;

    const BOUNDARY: &str = "users-api-boundary";
    const VALID_CSV: &str = "id,name,surname,second_name,email,phone_number,additional_field\n\
        1,Ivan,Ivanov,Ivanovich,ivan@test.com,+79001234567,test\n\
        2,Petr,Petrov,Petrovich,petr@test.com,+79001234568,test";

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn upload(field: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"users.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/upload-csv")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn lists_seeded_users() {
        let (_dir, app) = test_router(Some(
            "id,name,surname,second_name,email,phone_number\n\
             1,Ivan,Ivanov,Ivanovich,ivan@example.com,1111111111\n\
             2,Petr,Petrov,Petrovich,petrov@example.com,2222222222\n",
        ));

        let (status, body) = send(&app, get("/api/users")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["id"], "1");
    }

    #[tokio::test]
    async fn lists_nothing_without_backing_file() {
        let (_dir, app) = test_router(None);

        let (status, body) = send(&app, get("/api/users")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn fetches_single_user() {
        let (_dir, app) = test_router(Some(
            "id,name,surname,second_name,email,phone_number\n1,Ivan,Ivanov,I,i@x.com,1\n",
        ));

        let (status, body) = send(&app, get("/api/users/1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Ivan");
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let (_dir, app) = test_router(Some(
            "id,name,surname,second_name,email,phone_number\n\
             1,A,B,C,d@x.com,1\n\
             2,E,F,G,h@x.com,2\n",
        ));

        let (status, body) = send(&app, get("/api/users/999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "User with ID 999 not found");
    }

    #[tokio::test]
    async fn raw_data_is_404_without_backing_file() {
        let (_dir, app) = test_router(None);

        let (status, body) = send(&app, get("/api/data")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Data file not found");
    }

    #[tokio::test]
    async fn raw_data_is_500_for_malformed_file() {
        let (_dir, app) = test_router(Some("id,name\n1,Ann,extra\n"));

        let (status, _) = send(&app, get("/api/data")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn raw_data_keeps_file_column_order() {
        let (_dir, app) = test_router(Some("phone_number,name,id\n1000,Ann,9\n"));

        let response = app.oneshot(get("/api/data")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            r#"[{"phone_number":"1000","name":"Ann","id":"9"}]"#
        );
    }

    #[tokio::test]
    async fn valid_upload_is_stored_and_served() {
        let (_dir, app) = test_router(None);

        let (status, body) = send(&app, upload("file", VALID_CSV.as_bytes())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "File uploaded successfully");

        let (_, users) = send(&app, get("/api/users")).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
        assert_eq!(users[0]["phone_number"], "79001234567");

        let (_, rows) = send(&app, get("/api/data")).await;
        assert_eq!(rows[1]["additional_field"], "test");
    }

    #[tokio::test]
    async fn upload_missing_columns_is_400() {
        let (_dir, app) = test_router(None);
        let content = "id,name,surname,email\n1,Ivan,Ivanov,ivan@test.com";

        let (status, body) = send(&app, upload("file", content.as_bytes())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid CSV file structure");
    }

    #[tokio::test]
    async fn upload_that_cannot_be_merged_is_500() {
        let (_dir, app) = test_router(Some("id,name\n1,Ann,extra\n"));

        let (status, body) = send(&app, upload("file", VALID_CSV.as_bytes())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to save data");
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let (_dir, app) = test_router(None);

        let (status, body) = send(&app, upload("document", VALID_CSV.as_bytes())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "missing file field");
    }

    #[tokio::test]
    async fn non_utf8_upload_is_400() {
        let (_dir, app) = test_router(None);

        let (status, _) = send(&app, upload("file", &[0xff, 0xfe, 0x00])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
