use crate::{opportunity::Opportunity, tx_nature_tagger::ClassifiedTx};
use ethernity_core::types::TransactionHash;
use tokio::sync::mpsc;

/// Resultado da análise de uma transação
#[derive(Debug, Clone)]
pub struct TxReport {
    pub tx: ClassifiedTx,
    pub opportunities: Vec<Opportunity>,
    /// Detectores que falharam nesta transação
    pub detector_errors: usize,
}

/// Evento produzido por cada notificação processada
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Analyzed(TxReport),
    /// Transação já minerada ou descartada
    NotFound(TransactionHash),
    /// Falha ao buscar a transação
    Failed { tx_hash: TransactionHash, reason: String },
}

/// Simple event bus wrapper over [`tokio::sync::mpsc`] channels.
pub struct EventBus<T> {
    sender: mpsc::Sender<T>,
}

impl<T> EventBus<T> {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { sender: tx }, rx)
    }

    pub fn sender(&self) -> mpsc::Sender<T> {
        self.sender.clone()
    }
}
