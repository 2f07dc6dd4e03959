use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::json;

/// RFC 5987 `attr-char` minus alphanumerics
const FILENAME_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Success envelope `{ "success": true, "data": ... }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": true,
                        "message": "Failed to serialize response data",
                        "code": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (self.status_code, Json(envelope)).into_response()
    }
}

/// File download with a Content-Disposition filename
#[derive(Debug)]
pub struct Attachment {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Printable ASCII stand-in for clients that ignore `filename*`
pub fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

/// `attachment; filename="<ascii>"; filename*=UTF-8''<encoded>`
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_filename(filename),
        utf8_percent_encode(filename, FILENAME_ENCODE)
    )
}

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        let disposition = content_disposition(&self.filename);
        let disposition = HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(self.content_type)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_sets_status() {
        let response = ApiResponse::created(json!({"id": 1})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn attachment_names_the_file() {
        let response = Attachment {
            filename: "Breakfast.xlsx".to_string(),
            content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            body: b"PK".to_vec(),
        }
        .into_response();

        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Breakfast.xlsx\"; filename*=UTF-8''Breakfast.xlsx"
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[test]
    fn non_ascii_filename_keeps_utf8_form() {
        assert_eq!(
            content_disposition("Café au lait.xlsx"),
            "attachment; filename=\"Caf_ au lait.xlsx\"; filename*=UTF-8''Caf%C3%A9%20au%20lait.xlsx"
        );

        let response = Attachment {
            filename: "日本.xlsx".to_string(),
            content_type: "application/octet-stream",
            body: Vec::new(),
        }
        .into_response();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"__.xlsx\"; filename*=UTF-8''%E6%97%A5%E6%9C%AC.xlsx"
        );
    }

    #[test]
    fn ascii_fallback_drops_quotes() {
        assert_eq!(ascii_filename("a\"b\\c.xlsx"), "a_b_c.xlsx");
    }
}
