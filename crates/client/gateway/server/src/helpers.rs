use hyper::{header, Response, StatusCode};
use serde::Serialize;
use tp_chain_config::CountRange;

pub(crate) fn not_found_route_response() -> Response<String> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body("Not Found".to_string())
        .expect("Failed to build NOT_FOUND response with a valid status and body")
}

pub(crate) fn internal_error_response() -> Response<String> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body("Internal Server Error".to_string())
        .expect("Failed to build INTERNAL_SERVER_ERROR response with a valid status and body")
}

/// Creates a JSON response with the given status code and a body that can be
/// serialized to JSON.
///
/// If the serialization fails, this function returns a 500 Internal Server
/// Error response.
pub(crate) fn create_json_response<T>(status: StatusCode, body: &T) -> Response<String>
where
    T: Serialize,
{
    let body = match serde_json::to_string(body) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to serialize response body: {}", e);
            return internal_error_response();
        }
    };

    match Response::builder().status(status).header(header::CONTENT_TYPE, "application/json").body(body) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build response: {}", e);
            internal_error_response()
        }
    }
}

/// The limit-sanitization redirect: same route, canonical limit.
pub(crate) fn redirect_response(location: &str) -> Response<String> {
    match Response::builder().status(StatusCode::FOUND).header(header::LOCATION, location).body(String::new())
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build redirect to {location}: {e}");
            internal_error_response()
        }
    }
}

/// Validates a cursor-route limit against the configured count range.
///
/// An unparseable or out-of-range limit is recovered locally: the caller is
/// redirected to the same path with the configured preset instead of being
/// rejected.
pub(crate) fn validate_cursor_limit(
    raw: &str,
    range: &CountRange,
    canonical_path: impl FnOnce(u64) -> String,
) -> Result<u64, Box<Response<String>>> {
    match raw.parse::<u64>() {
        Ok(limit) if range.is_valid(limit) => Ok(limit),
        _ => Err(Box::new(redirect_response(&canonical_path(range.preset)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn range() -> CountRange {
        CountRange { min: 10, max: 100, preset: 25 }
    }

    #[rstest]
    #[case("10")]
    #[case("25")]
    #[case("100")]
    fn in_range_limits_pass_through(#[case] raw: &str) {
        let limit = validate_cursor_limit(raw, &range(), |_| unreachable!()).unwrap();
        assert_eq!(limit.to_string(), raw);
    }

    #[rstest]
    #[case("9")]
    #[case("101")]
    #[case("0")]
    #[case("abc")]
    #[case("-1")]
    fn out_of_range_limits_redirect_to_the_preset(#[case] raw: &str) {
        let response =
            validate_cursor_limit(raw, &range(), |preset| format!("/blocks/from/latest/limit/{preset}"))
                .unwrap_err();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/blocks/from/latest/limit/25"
        );
    }
}
