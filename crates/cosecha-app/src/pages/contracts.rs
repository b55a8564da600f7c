use tracing::warn;

use cosecha_client::{ContractCache, ResourceClient};

use crate::view::{ContractCard, View};

/// Worker's contracts. The remote list is authoritative; the local cache is
/// only read when the remote fetch fails.
pub async fn load(
    client: &ResourceClient,
    cache: Option<&ContractCache>,
    worker_id: Option<&str>,
) -> View {
    match client.list_contracts(worker_id).await {
        Ok(contracts) => View::Contracts {
            cards: contracts.into_iter().map(ContractCard::from).collect(),
            from_cache: false,
        },
        Err(err) => {
            warn!("could not load contracts, falling back to cache: {err}");
            let cached = cache
                .and_then(|cache| match cache.read_all() {
                    Ok(contracts) => Some(contracts),
                    Err(cache_err) => {
                        warn!("could not read contract cache: {cache_err}");
                        None
                    }
                })
                .unwrap_or_default();
            View::Contracts {
                cards: cached.into_iter().map(ContractCard::from).collect(),
                from_cache: true,
            }
        }
    }
}
