/*!
 * Ethernity Traits
 * 
 * Traits comuns usados em toda a workspace Ethernity
 */

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{MempoolContent, MempoolStatus, PendingTransaction, TransactionHash};
use ethereum_types::U256;
use std::sync::Arc;

/// Trait para provedores RPC
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Obtém uma transação pelo hash; `None` quando o node não a conhece mais
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<PendingTransaction>>;

    /// Obtém o preço de gas atual, em wei
    async fn gas_price(&self) -> Result<U256>;

    /// Obtém o número do bloco atual
    async fn get_block_number(&self) -> Result<u64>;

    /// Obtém as contagens pending/queued da mempool
    async fn mempool_status(&self) -> Result<MempoolStatus>;

    /// Obtém o conteúdo completo da mempool
    async fn mempool_content(&self) -> Result<MempoolContent>;
}

#[async_trait]
impl<P: RpcProvider + ?Sized> RpcProvider for Arc<P> {
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<PendingTransaction>> {
        (**self).get_transaction(tx_hash).await
    }

    async fn gas_price(&self) -> Result<U256> {
        (**self).gas_price().await
    }

    async fn get_block_number(&self) -> Result<u64> {
        (**self).get_block_number().await
    }

    async fn mempool_status(&self) -> Result<MempoolStatus> {
        (**self).mempool_status().await
    }

    async fn mempool_content(&self) -> Result<MempoolContent> {
        (**self).mempool_content().await
    }
}
