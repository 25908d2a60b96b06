use crate::error::GatewayError;
use crate::helpers::{create_json_response, redirect_response, validate_cursor_limit};
use hyper::{Response, StatusCode};
use mongodb::bson::Document;
use std::sync::Arc;
use tc_db::{
    AccountAnchor, AccountRanking, BlockAnchor, Direction, MosaicAnchor, NamespaceAnchor,
    TransactionAnchor, TransactionGroup, TransactionKey, TransactionTypeFilter, TrebuchetBackend,
};
use tp_types::{Height, MosaicId, NamespaceId, TransactionKind, TransferFilter};

type HandlerResult = Result<Response<String>, GatewayError>;

pub async fn handle_chain_info(backend: Arc<TrebuchetBackend>) -> HandlerResult {
    let statistic = backend.chain_statistic().await?;
    Ok(create_json_response(StatusCode::OK, &statistic))
}

pub async fn handle_chain_height(backend: Arc<TrebuchetBackend>) -> HandlerResult {
    let height = backend.chain_height().await?;
    Ok(create_json_response(StatusCode::OK, &serde_json::json!({ "height": height.0 })))
}

pub async fn handle_chain_score(backend: Arc<TrebuchetBackend>) -> HandlerResult {
    let (high, low) = backend.chain_score().await?;
    Ok(create_json_response(StatusCode::OK, &serde_json::json!({ "scoreHigh": high, "scoreLow": low })))
}

pub async fn handle_storage_info(backend: Arc<TrebuchetBackend>) -> HandlerResult {
    let info = backend.storage_info().await?;
    Ok(create_json_response(StatusCode::OK, &info))
}

pub async fn handle_block_at(backend: Arc<TrebuchetBackend>, raw_height: &str) -> HandlerResult {
    let height = parse_positive_height(raw_height)?;
    ensure_at_or_below_tip(&backend, height).await?;
    let block = backend.block_at(height).await?;
    Ok(create_json_response(StatusCode::OK, &block))
}

pub async fn handle_block_transactions(backend: Arc<TrebuchetBackend>, raw_height: &str) -> HandlerResult {
    let height = parse_positive_height(raw_height)?;
    ensure_at_or_below_tip(&backend, height).await?;
    // Bounded by the store page window, not a route limit.
    let transactions = backend.transactions_at_height(height, u64::MAX).await?;
    Ok(page_response(transactions))
}

/// The legacy block-range regime: `/blocks/:height/limit/:limit` with the
/// pageSize grid. An off-grid limit or a zero height redirects to the
/// canonical URL instead of failing.
pub async fn handle_blocks_range(
    backend: Arc<TrebuchetBackend>,
    raw_height: &str,
    raw_limit: &str,
) -> HandlerResult {
    let height = Height::parse(raw_height)?;
    let grid = backend.chain_config().page_size;

    let requested_limit = raw_limit.parse::<u64>().unwrap_or(0);
    let canonical_height = height.0.max(1);
    let canonical_limit = grid.sanitize(requested_limit);
    if canonical_height != height.0 || canonical_limit != requested_limit {
        return Ok(redirect_response(&format!("/blocks/{canonical_height}/limit/{canonical_limit}")));
    }

    let blocks = backend.blocks_in_range(Height(canonical_height), canonical_limit).await?;
    Ok(page_response(blocks))
}

pub async fn handle_blocks_cursor(
    backend: Arc<TrebuchetBackend>,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/blocks/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let anchor = BlockAnchor::parse(raw_anchor)?;
    let page = backend.blocks_page(direction, &anchor, limit).await?;
    Ok(page_response(page))
}

pub async fn handle_transaction_by_id(backend: Arc<TrebuchetBackend>, raw_id: &str) -> HandlerResult {
    let key = TransactionKey::parse(raw_id)?;
    let transaction = backend.transaction_by_key(TransactionGroup::Confirmed, &key).await?;
    Ok(create_json_response(StatusCode::OK, &transaction))
}

pub async fn handle_transactions_cursor(
    backend: Arc<TrebuchetBackend>,
    group: TransactionGroup,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let prefix = group_route_prefix(group);
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/{prefix}/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let anchor = TransactionAnchor::parse(raw_anchor)?;
    let page = backend.transactions_page(group, direction, &anchor, limit).await?;
    Ok(page_response(page))
}

pub async fn handle_transactions_by_type_cursor(
    backend: Arc<TrebuchetBackend>,
    direction: Direction,
    raw_anchor: &str,
    raw_type: &str,
    raw_filter: Option<&str>,
    raw_limit: &str,
) -> HandlerResult {
    let duration = direction.route_name();
    let canonical = |preset: u64| match raw_filter {
        Some(filter) => {
            format!("/transactions/{duration}/{raw_anchor}/type/{raw_type}/filter/{filter}/limit/{preset}")
        }
        None => format!("/transactions/{duration}/{raw_anchor}/type/{raw_type}/limit/{preset}"),
    };
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, canonical) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let kind = TransactionKind::from_route_name(raw_type)?;
    let filter = raw_filter.map(TransferFilter::from_route_name).transpose()?;
    let selection = TransactionTypeFilter::new(kind, filter)?;

    let anchor = TransactionAnchor::parse(raw_anchor)?;
    let page = backend.transactions_by_type_page(direction, &anchor, &selection, limit).await?;
    Ok(page_response(page))
}

pub async fn handle_account(backend: Arc<TrebuchetBackend>, raw_id: &str) -> HandlerResult {
    let anchor = parse_account_key(raw_id)?;
    let account = backend.account_by_key(&anchor).await?;
    Ok(create_json_response(StatusCode::OK, &account))
}

pub async fn handle_account_multisig(backend: Arc<TrebuchetBackend>, raw_id: &str) -> HandlerResult {
    let anchor = parse_account_key(raw_id)?;
    let entry = backend.multisig_by_key(&anchor).await?;
    Ok(create_json_response(StatusCode::OK, &entry))
}

pub async fn handle_account_transactions_cursor(
    backend: Arc<TrebuchetBackend>,
    raw_account: &str,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/account/{raw_account}/transactions/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let account = parse_account_key(raw_account)?;
    let Some(address) = account.address(backend.chain_config().network) else {
        return Err(GatewayError::InvalidArgument(format!("invalid account id `{raw_account}`")));
    };
    let anchor = TransactionAnchor::parse(raw_anchor)?;
    let page = backend.account_transactions_page(&address, direction, &anchor, limit).await?;
    Ok(page_response(page))
}

/// Parses an account key for the single-account routes, where the cursor
/// keywords are not valid.
fn parse_account_key(raw_id: &str) -> Result<AccountAnchor, GatewayError> {
    let anchor = AccountAnchor::parse(raw_id)?;
    if matches!(anchor, AccountAnchor::Absolute(_)) {
        return Err(GatewayError::InvalidArgument(format!("invalid account id `{raw_id}`")));
    }
    Ok(anchor)
}

pub async fn handle_accounts_cursor(
    backend: Arc<TrebuchetBackend>,
    ranking: AccountRanking,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let prefix = ranking_route_prefix(ranking);
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/accounts/{prefix}/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let anchor = AccountAnchor::parse(raw_anchor)?;
    let page = backend.accounts_page(ranking, direction, &anchor, limit).await?;
    Ok(page_response(page))
}

pub async fn handle_mosaic_by_id(backend: Arc<TrebuchetBackend>, raw_id: &str) -> HandlerResult {
    let id = MosaicId::parse(raw_id)?;
    let mosaic = backend.mosaic_by_id(id).await?;
    Ok(create_json_response(StatusCode::OK, &mosaic))
}

pub async fn handle_mosaics_cursor(
    backend: Arc<TrebuchetBackend>,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/mosaics/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let anchor = MosaicAnchor::parse(raw_anchor)?;
    let page = backend.mosaics_page(direction, &anchor, limit).await?;
    Ok(page_response(page))
}

pub async fn handle_namespace_by_id(backend: Arc<TrebuchetBackend>, raw_id: &str) -> HandlerResult {
    let id = NamespaceId::parse(raw_id)?;
    let namespace = backend.namespace_by_id(id).await?;
    Ok(create_json_response(StatusCode::OK, &namespace))
}

pub async fn handle_namespaces_cursor(
    backend: Arc<TrebuchetBackend>,
    direction: Direction,
    raw_anchor: &str,
    raw_limit: &str,
) -> HandlerResult {
    let duration = direction.route_name();
    let limit = match validate_cursor_limit(raw_limit, &backend.chain_config().count_range, |preset| {
        format!("/namespaces/{duration}/{raw_anchor}/limit/{preset}")
    }) {
        Ok(limit) => limit,
        Err(redirect) => return Ok(*redirect),
    };

    let anchor = NamespaceAnchor::parse(raw_anchor)?;
    let page = backend.namespaces_page(direction, &anchor, limit).await?;
    Ok(page_response(page))
}

fn page_response(page: Vec<Document>) -> Response<String> {
    create_json_response(StatusCode::OK, &page)
}

fn parse_positive_height(raw: &str) -> Result<Height, GatewayError> {
    let height = Height::parse(raw)?;
    if height.0 == 0 {
        return Err(GatewayError::InvalidArgument("height must be positive".to_string()));
    }
    Ok(height)
}

async fn ensure_at_or_below_tip(backend: &TrebuchetBackend, height: Height) -> Result<(), GatewayError> {
    let tip = backend.chain_height().await?;
    if height > tip {
        return Err(GatewayError::NotFound("chain height is too small".to_string()));
    }
    Ok(())
}

fn group_route_prefix(group: TransactionGroup) -> &'static str {
    match group {
        TransactionGroup::Confirmed => "transactions",
        TransactionGroup::Unconfirmed => "transactions/unconfirmed",
        TransactionGroup::Partial => "transactions/partial",
    }
}

fn ranking_route_prefix(ranking: AccountRanking) -> &'static str {
    match ranking {
        AccountRanking::Importance => "importance",
        AccountRanking::HarvestedBlocks => "harvested/blocks",
        AccountRanking::HarvestedFees => "harvested/fees",
        AccountRanking::CurrencyBalance => "balance/currency",
        AccountRanking::HarvestBalance => "balance/harvest",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_height_is_required() {
        assert!(parse_positive_height("1").is_ok());
        assert!(matches!(parse_positive_height("0"), Err(GatewayError::InvalidArgument(_))));
        assert!(matches!(parse_positive_height("ten"), Err(GatewayError::InvalidArgument(_))));
    }

    #[test]
    fn route_prefixes_rebuild_canonical_paths() {
        assert_eq!(group_route_prefix(TransactionGroup::Partial), "transactions/partial");
        assert_eq!(ranking_route_prefix(AccountRanking::CurrencyBalance), "balance/currency");
    }
}
