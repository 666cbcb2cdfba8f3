/*!
 * Ethernity RPC
 *
 * Cliente JSON-RPC para interação com nodes Ethereum e inscrição na
 * mempool via WebSocket
 */

pub mod subscription;

pub use subscription::{parse_frame, Frame, ListenerState, PendingTxSubscription};

use async_trait::async_trait;
use ethernity_core::{
    error::Result,
    traits::RpcProvider,
    types::{MempoolContent, MempoolStatus, PendingTransaction, TransactionHash},
    utils::format_h256,
    Error,
};
use ethers::types::{U256, U64};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::trace;

/// Configuração do cliente RPC
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub endpoint: String,
    /// Timeout de transporte do reqwest, mais curto que o padrão do cliente para
    /// que uma chamada travada não segure uma vaga do pipeline indefinidamente.
    /// Nenhuma outra política de timeout ou retry é aplicada.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8546".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct TxpoolStatus {
    pending: U64,
    queued: U64,
}

/// Cliente RPC HTTP para Ethereum
pub struct EthernityRpcClient {
    http: reqwest::Client,
    config: RpcConfig,
    next_id: AtomicU64,
}

impl EthernityRpcClient {
    /// Cria um novo cliente RPC HTTP
    pub fn new(config: RpcConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::RpcError(format!("Falha ao criar cliente HTTP: {}", e)))?;

        Ok(Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Executa uma chamada JSON-RPC e retorna o campo `result` bruto.
    ///
    /// Um `result` ausente é devolvido como `Value::Null`.
    pub async fn request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });
        trace!(method, id, "Enviando requisição JSON-RPC");

        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::RpcError(format!("Falha na chamada {}: {}", method, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::RpcError(format!("Falha ao ler resposta de {}: {}", method, e)))?;

        let payload: JsonRpcResponse = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => {
                return Err(Error::RpcError(format!("{} retornou HTTP {}", method, status)));
            }
            Err(e) => {
                return Err(Error::DecodeError(format!("Resposta inválida para {}: {}", method, e)));
            }
        };

        if let Some(err) = payload.error {
            trace!(method, code = err.code, "Erro JSON-RPC");
            return Err(Error::RpcError(err.message));
        }

        Ok(payload.result.unwrap_or(Value::Null))
    }

    /// Executa uma chamada e decodifica o resultado no tipo pedido
    pub async fn request_typed<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.request(method, params).await?;
        decode_result(method, value)
    }

    /// Obtém uma transação; `None` quando já minerada ou descartada
    pub async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<PendingTransaction>> {
        let value = self
            .request("eth_getTransactionByHash", json!([format_h256(&tx_hash)]))
            .await?;
        if value.is_null() {
            return Ok(None);
        }
        decode_result("eth_getTransactionByHash", value).map(Some)
    }

    /// Obtém o preço de gas atual em wei
    pub async fn gas_price(&self) -> Result<U256> {
        self.request_typed("eth_gasPrice", json!([])).await
    }

    /// Obtém o número do bloco atual
    pub async fn get_block_number(&self) -> Result<u64> {
        let number: U64 = self.request_typed("eth_blockNumber", json!([])).await?;
        Ok(number.as_u64())
    }

    /// Obtém as contagens da mempool
    pub async fn mempool_status(&self) -> Result<MempoolStatus> {
        let status: TxpoolStatus = self.request_typed("txpool_status", json!([])).await?;
        Ok(MempoolStatus {
            pending: status.pending.as_u64(),
            queued: status.queued.as_u64(),
        })
    }

    /// Obtém o conteúdo da mempool
    pub async fn mempool_content(&self) -> Result<MempoolContent> {
        self.request_typed("txpool_content", json!([])).await
    }
}

fn decode_result<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::DecodeError(format!("Falha ao decodificar resultado de {}: {}", method, e)))
}

/// Implementação da trait RpcProvider do ethernity-core
#[async_trait]
impl RpcProvider for EthernityRpcClient {
    async fn get_transaction(&self, tx_hash: TransactionHash) -> Result<Option<PendingTransaction>> {
        self.get_transaction(tx_hash).await
    }

    async fn gas_price(&self) -> Result<U256> {
        self.gas_price().await
    }

    async fn get_block_number(&self) -> Result<u64> {
        self.get_block_number().await
    }

    async fn mempool_status(&self) -> Result<MempoolStatus> {
        self.mempool_status().await
    }

    async fn mempool_content(&self) -> Result<MempoolContent> {
        self.mempool_content().await
    }
}
