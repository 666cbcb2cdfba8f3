/*!
 * Ethernity Types
 * 
 * Tipos comuns usados em toda a workspace Ethernity
 */

use ethereum_types::{Address, H256, U256};
use ethers::types::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Alias para hash de transação
pub type TransactionHash = H256;

/// Transação pendente tal como retornada por `eth_getTransactionByHash`.
///
/// Apenas os campos usados pela análise são mantidos; o restante do objeto
/// retornado pelo node é ignorado na desserialização.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    pub hash: TransactionHash,
    pub from: Address,
    /// `None` indica criação de contrato
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub input: Bytes,
    /// Limite de gas declarado
    #[serde(default)]
    pub gas: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
}

impl PendingTransaction {
    /// Seletor da função chamada (primeiros 4 bytes do calldata)
    pub fn selector(&self) -> Option<[u8; 4]> {
        let input = self.input.as_ref();
        if input.len() >= 4 {
            Some([input[0], input[1], input[2], input[3]])
        } else {
            None
        }
    }

    /// Verdadeiro quando não há calldata
    pub fn has_empty_input(&self) -> bool {
        self.input.as_ref().is_empty()
    }
}

/// Fotografia pontual da mempool (`txpool_status`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolStatus {
    pub pending: u64,
    pub queued: u64,
}

/// Conteúdo da mempool (`txpool_content`), agrupado por remetente e nonce
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MempoolContent {
    #[serde(default)]
    pub pending: HashMap<String, BTreeMap<String, serde_json::Value>>,
    #[serde(default)]
    pub queued: HashMap<String, BTreeMap<String, serde_json::Value>>,
}

impl MempoolContent {
    pub fn pending_count(&self) -> u64 {
        self.pending.values().map(|by_nonce| by_nonce.len() as u64).sum()
    }

    pub fn queued_count(&self) -> u64 {
        self.queued.values().map(|by_nonce| by_nonce.len() as u64).sum()
    }

    /// Converte o conteúdo em contagens equivalentes a `txpool_status`
    pub fn status(&self) -> MempoolStatus {
        MempoolStatus {
            pending: self.pending_count(),
            queued: self.queued_count(),
        }
    }
}

/// Identificador de inscrição
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub String);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_transaction_from_node_json() {
        let raw = serde_json::json!({
            "blockHash": null,
            "blockNumber": null,
            "from": "0x1111111111111111111111111111111111111111",
            "gas": "0x5208",
            "gasPrice": "0x4a817c800",
            "hash": "0x2222222222222222222222222222222222222222222222222222222222222222",
            "input": "0x",
            "nonce": "0x1",
            "to": null,
            "value": "0xde0b6b3a7640000",
            "v": "0x1b"
        });
        let tx: PendingTransaction = serde_json::from_value(raw).unwrap();
        assert!(tx.to.is_none());
        assert_eq!(tx.gas, U256::from(21_000u64));
        assert_eq!(tx.gas_price, Some(U256::from(20_000_000_000u64)));
        assert_eq!(tx.value, U256::exp10(18));
        assert!(tx.has_empty_input());
        assert_eq!(tx.selector(), None);
    }

    #[test]
    fn content_counts_every_nonce() {
        let raw = serde_json::json!({
            "pending": {
                "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa": { "1": {}, "2": {} },
                "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb": { "7": {} }
            },
            "queued": {
                "0xcccccccccccccccccccccccccccccccccccccccc": { "9": {} }
            }
        });
        let content: MempoolContent = serde_json::from_value(raw).unwrap();
        assert_eq!(content.status(), MempoolStatus { pending: 3, queued: 1 });
    }
}
