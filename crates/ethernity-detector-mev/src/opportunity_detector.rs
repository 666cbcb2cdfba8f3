use crate::{
    mev_params::{AmountHeuristics, CategoryParams, MevParams},
    opportunity::{AmountSource, DetailValue, Opportunity, OpportunityKind, ProfitEstimate},
    traits::OpportunityDetector,
    tx_nature_tagger::ClassifiedTx,
};
use async_trait::async_trait;
use ethernity_core::{
    error::Result,
    traits::RpcProvider,
    utils::{gas_cost_native, u256_to_f64_lossy, wei_to_native},
};
use ethers::types::U256;
use std::collections::BTreeMap;
use tracing::trace;

const FALLBACK_NOTE: &str = "Montante desconhecido - usado o mínimo da categoria";

/// Deriva o montante negociado, em unidades nativas.
///
/// Ordem de preferência: `value` da transação, montante do calldata dentro
/// da faixa plausível convertido pela taxa token/nativo, mínimo da categoria.
pub fn derive_amount(tx: &ClassifiedTx, heuristics: &AmountHeuristics, fallback: f64) -> (f64, AmountSource) {
    if !tx.tx.value.is_zero() {
        return (wei_to_native(&tx.tx.value), AmountSource::NativeValue);
    }

    if let Some(raw) = tx.call.as_ref().and_then(|c| c.amount) {
        let tokens = u256_to_f64_lossy(&raw) / 10f64.powi(heuristics.token_decimals as i32);
        if tokens > heuristics.min_plausible_tokens && tokens < heuristics.max_plausible_tokens {
            return (tokens * heuristics.token_native_rate, AmountSource::Calldata);
        }
        trace!(tokens, "Montante do calldata fora da faixa plausível");
    }

    (fallback, AmountSource::CategoryMinimum)
}

/// Detector heurístico de uma categoria, parametrizado por `CategoryParams`
pub struct HeuristicDetector<P> {
    provider: P,
    kind: OpportunityKind,
    params: CategoryParams,
    amounts: AmountHeuristics,
}

impl<P> HeuristicDetector<P> {
    pub fn new(provider: P, kind: OpportunityKind, params: &MevParams) -> Self {
        Self {
            provider,
            kind,
            params: params.category(kind).clone(),
            amounts: params.amounts.clone(),
        }
    }

    pub fn params(&self) -> &CategoryParams {
        &self.params
    }

    /// Estimativa para um preço de gas conhecido, sem verificar a tag
    pub fn estimate(&self, tx: &ClassifiedTx, gas_price_wei: U256) -> ProfitEstimate {
        let (amount, amount_source) = derive_amount(tx, &self.amounts, self.params.fallback_amount);
        let (gross, model_details) = self.params.model.gross(amount);
        let gas_cost = gas_cost_native(&gas_price_wei, self.params.gas_limit);
        let net = gross - gas_cost;

        let mut details: BTreeMap<String, DetailValue> = model_details
            .into_iter()
            .map(|(name, value)| (name.to_string(), DetailValue::Number(value)))
            .collect();
        details.insert("gasCost".to_string(), DetailValue::Number(gas_cost));

        let note = self
            .params
            .note
            .clone()
            .or_else(|| (!amount_source.is_known()).then(|| FALLBACK_NOTE.to_string()));
        if let Some(note) = note {
            details.insert("note".to_string(), DetailValue::Text(note));
        }

        ProfitEstimate {
            kind: self.kind,
            amount,
            amount_source,
            gross,
            gas_cost,
            net,
            confidence: self.params.confidence(amount_source.is_known()),
            details,
        }
    }
}

impl<P: RpcProvider> HeuristicDetector<P> {
    /// Estimativa completa com o preço de gas atual; `None` quando a tag
    /// exigida está ausente
    pub async fn evaluate(&self, tx: &ClassifiedTx) -> Result<Option<ProfitEstimate>> {
        if !tx.tags.contains(self.kind.gating_tag()) {
            return Ok(None);
        }
        let gas_price = self.provider.gas_price().await?;
        Ok(Some(self.estimate(tx, gas_price)))
    }
}

#[async_trait]
impl<P: RpcProvider> OpportunityDetector for HeuristicDetector<P> {
    fn kind(&self) -> OpportunityKind {
        self.kind
    }

    async fn detect(&self, tx: &ClassifiedTx) -> Result<Option<Opportunity>> {
        let Some(estimate) = self.evaluate(tx).await? else {
            return Ok(None);
        };

        if estimate.net > self.params.min_profit {
            Ok(Some(Opportunity::from_estimate(tx.tx.hash, estimate)))
        } else {
            trace!(
                kind = %self.kind,
                net = estimate.net,
                min_profit = self.params.min_profit,
                "Lucro líquido abaixo do limite"
            );
            Ok(None)
        }
    }
}

/// Um detector por categoria, todos consultando o mesmo provider
pub fn build_detectors<P>(provider: P, params: &MevParams) -> Vec<Box<dyn OpportunityDetector>>
where
    P: RpcProvider + Clone + 'static,
{
    OpportunityKind::ALL
        .into_iter()
        .map(|kind| {
            Box::new(HeuristicDetector::new(provider.clone(), kind, params)) as Box<dyn OpportunityDetector>
        })
        .collect()
}
