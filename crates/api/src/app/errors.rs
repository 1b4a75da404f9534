use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use sweetshop_infra::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let kind = err.kind();
    match err {
        CatalogError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, kind, msg),
        CatalogError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, kind, format!("{what} not found"))
        }
        CatalogError::InsufficientStock {
            requested,
            available,
        } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": kind,
                "message": format!("insufficient stock: requested {requested}, available {available}"),
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        CatalogError::Conflict(msg) => json_error(StatusCode::CONFLICT, kind, msg),
        // Store details stay in the logs.
        CatalogError::Storage(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            kind,
            "the catalog store failed to complete the request",
        ),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn invalid_id(what: &str) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweetshop_infra::StoreError;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (CatalogError::validation("bad"), StatusCode::BAD_REQUEST),
            (CatalogError::not_found("sweet x"), StatusCode::NOT_FOUND),
            (
                CatalogError::InsufficientStock {
                    requested: 5,
                    available: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (CatalogError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (
                CatalogError::Storage(StoreError::Backend("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(catalog_error_to_response(err).status(), status);
        }
    }
}
