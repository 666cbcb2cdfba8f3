//! Inscrição `newPendingTransactions` via `eth_subscribe`.
//!
//! A conexão é única e não reinicia: uma vez em `Terminated` a sequência de
//! hashes termina e cabe ao chamador encerrar a execução.

use ethernity_core::{
    error::Result,
    types::{SubscriptionId, TransactionHash},
    utils::hex_to_h256,
    Error,
};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Id da requisição `eth_subscribe` enviada na abertura da conexão
pub const SUBSCRIBE_REQUEST_ID: u64 = 1;

/// Estado do listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Connecting,
    Subscribed,
    Terminated,
}

/// Interpretação de um frame de texto recebido do node
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Resposta ao `eth_subscribe` com o id da inscrição
    Confirmation { id: u64, subscription: SubscriptionId },
    /// Resposta de erro a uma requisição
    Rejection { id: Option<u64>, message: String },
    /// Notificação de nova transação pendente
    Notification { subscription: SubscriptionId, tx_hash: TransactionHash },
    /// Qualquer outra coisa, com o motivo
    Ignored(String),
}

/// Interpreta um frame JSON-RPC recebido pelo WebSocket
pub fn parse_frame(text: &str) -> Frame {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => return Frame::Ignored(format!("frame não é JSON: {}", e)),
    };

    if let Some(params) = value.get("params") {
        let subscription = params.get("subscription").and_then(Value::as_str);
        let result = params.get("result");
        return match (subscription, result) {
            (Some(sub), Some(Value::String(hash))) => match hex_to_h256(hash) {
                Some(tx_hash) => Frame::Notification {
                    subscription: SubscriptionId(sub.to_string()),
                    tx_hash,
                },
                None => Frame::Ignored(format!("hash inválido na notificação: {}", hash)),
            },
            (Some(_), Some(_)) => Frame::Ignored("notificação sem hash de transação".to_string()),
            _ => Frame::Ignored("notificação sem inscrição".to_string()),
        };
    }

    let id = value.get("id").and_then(Value::as_u64);

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("erro sem mensagem")
            .to_string();
        return Frame::Rejection { id, message };
    }

    match (id, value.get("result")) {
        (Some(id), Some(Value::String(sub))) => Frame::Confirmation {
            id,
            subscription: SubscriptionId(sub.clone()),
        },
        _ => Frame::Ignored("resposta sem id de inscrição".to_string()),
    }
}

/// Inscrição ativa em transações pendentes
pub struct PendingTxSubscription {
    id: SubscriptionId,
    stream: WsStream,
    state: ListenerState,
}

impl PendingTxSubscription {
    /// Abre a conexão, envia o `eth_subscribe` e aguarda a confirmação
    pub async fn connect(endpoint: &str) -> Result<Self> {
        debug!(endpoint, state = ?ListenerState::Connecting, "Conectando ao WebSocket");
        let (mut stream, _) = connect_async(endpoint)
            .await
            .map_err(|e| Error::ConnectionError(format!("Falha ao conectar via WebSocket: {}", e)))?;

        let request = json!({
            "jsonrpc": "2.0",
            "id": SUBSCRIBE_REQUEST_ID,
            "method": "eth_subscribe",
            "params": ["newPendingTransactions"],
        });
        stream
            .send(Message::Text(request.to_string()))
            .await
            .map_err(|e| Error::ConnectionError(format!("Falha ao enviar eth_subscribe: {}", e)))?;

        loop {
            let message = match stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    return Err(Error::ConnectionError(format!("Falha antes da confirmação: {}", e)));
                }
                None => {
                    return Err(Error::ConnectionError(
                        "Conexão encerrada antes da confirmação da inscrição".to_string(),
                    ));
                }
            };

            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => {
                    return Err(Error::ConnectionError(
                        "Conexão encerrada antes da confirmação da inscrição".to_string(),
                    ));
                }
                _ => continue,
            };

            match parse_frame(&text) {
                Frame::Confirmation { id, subscription } if id == SUBSCRIBE_REQUEST_ID => {
                    info!(subscription = %subscription, "Inscrito em newPendingTransactions");
                    return Ok(Self {
                        id: subscription,
                        stream,
                        state: ListenerState::Subscribed,
                    });
                }
                Frame::Rejection { message, .. } => {
                    return Err(Error::SubscriptionError(message));
                }
                other => debug!(?other, "Frame ignorado antes da confirmação"),
            }
        }
    }

    /// Id retornado pelo node na confirmação
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Próximo hash notificado para esta inscrição.
    ///
    /// `None` quando a conexão foi encerrada; `Some(Err)` em erro de transporte.
    /// Depois de qualquer um dos dois, o listener fica em `Terminated`.
    pub async fn next_hash(&mut self) -> Option<Result<TransactionHash>> {
        if self.state == ListenerState::Terminated {
            return None;
        }

        loop {
            let message = match self.stream.next().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    self.state = ListenerState::Terminated;
                    return Some(Err(Error::ConnectionError(format!("Erro no WebSocket: {}", e))));
                }
                None => {
                    self.state = ListenerState::Terminated;
                    return None;
                }
            };

            match message {
                Message::Text(text) => match parse_frame(&text) {
                    Frame::Notification { subscription, tx_hash } if subscription == self.id => {
                        return Some(Ok(tx_hash));
                    }
                    Frame::Notification { subscription, tx_hash } => {
                        warn!(
                            expected = %self.id,
                            received = %subscription,
                            tx_hash = ?tx_hash,
                            "Notificação de inscrição desconhecida descartada"
                        );
                    }
                    other => debug!(?other, "Frame ignorado"),
                },
                Message::Close(frame) => {
                    debug!(?frame, "WebSocket encerrado pelo node");
                    self.state = ListenerState::Terminated;
                    return None;
                }
                _ => {}
            }
        }
    }

    /// Sequência de hashes emprestando a inscrição
    pub fn hashes(&mut self) -> impl Stream<Item = Result<TransactionHash>> + '_ {
        futures::stream::unfold(self, |sub| async move {
            let item = sub.next_hash().await?;
            Some((item, sub))
        })
    }

    /// Consome a inscrição e a expõe como stream
    pub fn into_stream(self) -> impl Stream<Item = Result<TransactionHash>> {
        futures::stream::unfold(self, |mut sub| async move {
            let item = sub.next_hash().await?;
            Some((item, sub))
        })
    }

    /// Encerra a conexão enviando um frame de close
    pub async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Falha ao fechar WebSocket: {}", e);
        }
        self.state = ListenerState::Terminated;
    }
}
