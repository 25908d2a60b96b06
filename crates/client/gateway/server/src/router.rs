use crate::handler::*;
use crate::helpers::not_found_route_response;
use hyper::{body::Incoming, Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tc_db::{AccountRanking, Direction, TransactionGroup, TrebuchetBackend};

pub(crate) async fn main_router(
    req: Request<Incoming>,
    backend: Arc<TrebuchetBackend>,
) -> Result<Response<String>, Infallible> {
    Ok(route_request(req.method(), req.uri().path(), backend).await)
}

/// Dispatches one request on its path segments. Every route is a GET; the
/// response for an unknown path or method is a plain 404.
pub(crate) async fn route_request(
    method: &Method,
    path: &str,
    backend: Arc<TrebuchetBackend>,
) -> Response<String> {
    if method != Method::GET {
        return not_found_route_response();
    }

    let segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();

    let result = match segments.as_slice() {
        ["chain", "info"] => handle_chain_info(backend).await,
        ["chain", "height"] => handle_chain_height(backend).await,
        ["chain", "score"] => handle_chain_score(backend).await,
        ["diagnostic", "storage"] => handle_storage_info(backend).await,

        ["block", height] => handle_block_at(backend, height).await,
        ["block", height, "transactions"] => handle_block_transactions(backend, height).await,
        ["blocks", height, "limit", limit] => handle_blocks_range(backend, height, limit).await,
        ["blocks", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_blocks_cursor(backend, direction, anchor, limit).await
        }

        ["transaction", id] => handle_transaction_by_id(backend, id).await,
        ["transactions", group @ ("unconfirmed" | "partial"), duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            let group = match *group {
                "unconfirmed" => TransactionGroup::Unconfirmed,
                _ => TransactionGroup::Partial,
            };
            handle_transactions_cursor(backend, group, direction, anchor, limit).await
        }
        ["transactions", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_transactions_cursor(backend, TransactionGroup::Confirmed, direction, anchor, limit).await
        }
        ["transactions", duration, anchor, "type", kind, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_transactions_by_type_cursor(backend, direction, anchor, kind, None, limit).await
        }
        ["transactions", duration, anchor, "type", kind, "filter", filter, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_transactions_by_type_cursor(backend, direction, anchor, kind, Some(filter), limit).await
        }

        ["account", id] => handle_account(backend, id).await,
        ["account", id, "multisig"] => handle_account_multisig(backend, id).await,
        ["account", account, "transactions", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_account_transactions_cursor(backend, account, direction, anchor, limit).await
        }
        ["accounts", "importance", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_accounts_cursor(backend, AccountRanking::Importance, direction, anchor, limit).await
        }
        ["accounts", "harvested", field @ ("blocks" | "fees"), duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            let ranking = match *field {
                "blocks" => AccountRanking::HarvestedBlocks,
                _ => AccountRanking::HarvestedFees,
            };
            handle_accounts_cursor(backend, ranking, direction, anchor, limit).await
        }
        ["accounts", "balance", mosaic @ ("currency" | "harvest"), duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            let ranking = match *mosaic {
                "currency" => AccountRanking::CurrencyBalance,
                _ => AccountRanking::HarvestBalance,
            };
            handle_accounts_cursor(backend, ranking, direction, anchor, limit).await
        }

        ["mosaic", id] => handle_mosaic_by_id(backend, id).await,
        ["mosaics", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_mosaics_cursor(backend, direction, anchor, limit).await
        }

        ["namespace", id] => handle_namespace_by_id(backend, id).await,
        ["namespaces", duration, anchor, "limit", limit] => {
            let Some(direction) = Direction::from_route_name(duration) else {
                return not_found_route_response();
            };
            handle_namespaces_cursor(backend, direction, anchor, limit).await
        }

        _ => return not_found_route_response(),
    };

    result.unwrap_or_else(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{header, StatusCode};
    use std::sync::Arc;
    use tp_chain_config::ChainConfig;
    use tp_types::Network;

    // The client handle connects lazily, so routes that answer before
    // touching the store (redirects, parse failures, unknown paths) are
    // testable without a running database.
    async fn test_backend() -> Arc<TrebuchetBackend> {
        let config = Arc::new(ChainConfig::new(Network::Mainnet));
        TrebuchetBackend::open("mongodb://127.0.0.1:27017", "catapult", config)
            .await
            .expect("Opening lazy backend handle")
    }

    #[tokio::test]
    async fn unknown_paths_and_methods_are_plain_not_found() {
        let backend = test_backend().await;
        let response = route_request(&Method::GET, "/no/such/route", Arc::clone(&backend)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), "Not Found");

        let response = route_request(&Method::POST, "/chain/info", backend).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_duration_is_not_a_route() {
        let backend = test_backend().await;
        let response = route_request(&Method::GET, "/blocks/until/10/limit/25", backend).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), "Not Found");
    }

    #[tokio::test]
    async fn out_of_range_cursor_limit_redirects_to_the_preset() {
        let backend = test_backend().await;
        let response = route_request(&Method::GET, "/transactions/from/latest/limit/9999", backend).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/transactions/from/latest/limit/25"
        );
    }

    #[tokio::test]
    async fn block_range_route_sanitizes_height_and_limit_together() {
        let backend = test_backend().await;
        let response = route_request(&Method::GET, "/blocks/0/limit/0", backend).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/blocks/1/limit/30");
    }

    #[tokio::test]
    async fn block_range_route_clamps_onto_the_grid() {
        let backend = test_backend().await;

        let response =
            route_request(&Method::GET, "/blocks/3601/limit/29", Arc::clone(&backend)).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/blocks/3601/limit/30");

        let response = route_request(&Method::GET, "/blocks/3601/limit/100", backend).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/blocks/3601/limit/80");
    }

    #[tokio::test]
    async fn malformed_keys_conflict_before_the_store_is_touched() {
        let backend = test_backend().await;

        // 66 characters: neither a hash nor a document id.
        let oversized = "AB".repeat(33);
        let response = route_request(
            &Method::GET,
            &format!("/transactions/from/{oversized}/limit/25"),
            Arc::clone(&backend),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response =
            route_request(&Method::GET, "/mosaic/85BBEA6CC462B2", Arc::clone(&backend)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = route_request(&Method::GET, "/block/zero", backend).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_enum_values_conflict() {
        let backend = test_backend().await;

        let response = route_request(
            &Method::GET,
            "/transactions/from/latest/type/teleport/limit/25",
            Arc::clone(&backend),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = route_request(
            &Method::GET,
            "/transactions/from/latest/type/hashLock/filter/multisig/limit/25",
            backend,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn account_routes_reject_time_keywords() {
        let backend = test_backend().await;
        let response = route_request(
            &Method::GET,
            "/accounts/balance/currency/from/latest/limit/25",
            backend,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
