use crate::{opportunity::{Opportunity, OpportunityKind}, tx_nature_tagger::{ClassifiedTx, TxTag}};
use async_trait::async_trait;
use ethernity_core::error::Result;

/// Detector de uma categoria de oportunidade.
#[async_trait]
pub trait OpportunityDetector: Send + Sync {
    fn kind(&self) -> OpportunityKind;

    /// Tag exigida para que a transação seja avaliada
    fn required_tag(&self) -> TxTag {
        self.kind().gating_tag()
    }

    /// Retorna a oportunidade quando o lucro líquido supera o limite mínimo.
    ///
    /// Um erro afeta apenas este detector para esta transação.
    async fn detect(&self, tx: &ClassifiedTx) -> Result<Option<Opportunity>>;
}
