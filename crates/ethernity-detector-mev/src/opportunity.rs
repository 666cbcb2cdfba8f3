use crate::tx_nature_tagger::TxTag;
use ethernity_core::types::TransactionHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Categoria de oportunidade MEV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityKind {
    Arbitrage,
    Sandwich,
    FrontRun,
    BackRun,
    Liquidation,
    JitLiquidity,
}

impl OpportunityKind {
    pub const ALL: [OpportunityKind; 6] = [
        OpportunityKind::Arbitrage,
        OpportunityKind::Sandwich,
        OpportunityKind::FrontRun,
        OpportunityKind::BackRun,
        OpportunityKind::Liquidation,
        OpportunityKind::JitLiquidity,
    ];

    /// Tag que a transação precisa carregar para a categoria ser avaliada
    pub fn gating_tag(self) -> TxTag {
        match self {
            OpportunityKind::Arbitrage
            | OpportunityKind::Sandwich
            | OpportunityKind::FrontRun
            | OpportunityKind::BackRun => TxTag::Swap,
            OpportunityKind::Liquidation => TxTag::Liquidation,
            OpportunityKind::JitLiquidity => TxTag::LiquidityOp,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpportunityKind::Arbitrage => "ARBITRAGE",
            OpportunityKind::Sandwich => "SANDWICH",
            OpportunityKind::FrontRun => "FRONT_RUN",
            OpportunityKind::BackRun => "BACK_RUN",
            OpportunityKind::Liquidation => "LIQUIDATION",
            OpportunityKind::JitLiquidity => "JIT_LIQUIDITY",
        }
    }
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Valor de um campo do detalhamento
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::Number(n) => write!(f, "{:.6}", n),
            DetailValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for DetailValue {
    fn from(value: f64) -> Self {
        DetailValue::Number(value)
    }
}

impl From<&str> for DetailValue {
    fn from(value: &str) -> Self {
        DetailValue::Text(value.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(value: String) -> Self {
        DetailValue::Text(value)
    }
}

/// Origem do montante usado na estimativa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmountSource {
    /// `value` da transação
    NativeValue,
    /// Montante decodificado do calldata
    Calldata,
    /// Mínimo fixo da categoria
    CategoryMinimum,
}

impl AmountSource {
    pub fn is_known(self) -> bool {
        !matches!(self, AmountSource::CategoryMinimum)
    }
}

/// Estimativa completa de uma categoria, antes do limite mínimo de lucro
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitEstimate {
    pub kind: OpportunityKind,
    /// Montante em unidades nativas
    pub amount: f64,
    pub amount_source: AmountSource,
    pub gross: f64,
    pub gas_cost: f64,
    /// `gross - gas_cost`
    pub net: f64,
    pub confidence: f64,
    pub details: BTreeMap<String, DetailValue>,
}

/// Oportunidade emitida por um detector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub tx_hash: TransactionHash,
    pub kind: OpportunityKind,
    pub net_profit: f64,
    pub gross_estimate: f64,
    pub gas_cost: f64,
    pub confidence: f64,
    pub details: BTreeMap<String, DetailValue>,
}

impl Opportunity {
    pub fn from_estimate(tx_hash: TransactionHash, estimate: ProfitEstimate) -> Self {
        Self {
            tx_hash,
            kind: estimate.kind,
            net_profit: estimate.net,
            gross_estimate: estimate.gross,
            gas_cost: estimate.gas_cost,
            confidence: estimate.confidence,
            details: estimate.details,
        }
    }
}
