//! Parâmetros de simulação das heurísticas de MEV.
//!
//! Os valores padrão são constantes de simulação, não estado de mercado
//! observado. Um arquivo TOML pode sobrescrever qualquer campo.

use crate::opportunity::OpportunityKind;
use ethernity_core::{error::Result, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Modelo de mercado usado para a estimativa bruta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum MarketModel {
    /// Diferença de preço entre DEXs
    PriceDifferential { price_diff: f64 },
    /// Compra antes e venda depois da vítima
    Sandwich { price_impact: f64, position_share: f64 },
    /// Taxa fixa sobre o montante da vítima
    FrontRun { profit_rate: f64 },
    /// Recuperação parcial do impacto causado pela vítima
    BackRun {
        price_impact: f64,
        recovery_rate: f64,
        position_share: f64,
    },
    /// Bônus de liquidação do protocolo de lending
    LiquidationBonus { bonus: f64 },
    /// Taxas capturadas por liquidez just-in-time
    FeeCapture { fee_rate: f64 },
}

impl MarketModel {
    /// Estimativa bruta e os campos de detalhamento da categoria
    pub fn gross(&self, amount: f64) -> (f64, Vec<(&'static str, f64)>) {
        match *self {
            MarketModel::PriceDifferential { price_diff } => {
                (amount * price_diff, vec![("amount", amount), ("priceDiff", price_diff)])
            }
            MarketModel::Sandwich { price_impact, position_share } => {
                let front_run_amount = amount * position_share;
                (
                    front_run_amount * price_impact,
                    vec![
                        ("userAmount", amount),
                        ("frontRunAmount", front_run_amount),
                        ("priceImpact", price_impact),
                    ],
                )
            }
            MarketModel::FrontRun { profit_rate } => {
                let profit = amount * profit_rate;
                (profit, vec![("amount", amount), ("estimatedProfit", profit)])
            }
            MarketModel::BackRun { price_impact, recovery_rate, position_share } => {
                let back_run_amount = amount * position_share;
                (
                    back_run_amount * price_impact * recovery_rate,
                    vec![
                        ("userAmount", amount),
                        ("backRunAmount", back_run_amount),
                        ("priceImpact", price_impact),
                        ("recoveryRate", recovery_rate),
                    ],
                )
            }
            MarketModel::LiquidationBonus { bonus } => {
                (amount * bonus, vec![("amount", amount), ("liquidationBonus", bonus)])
            }
            MarketModel::FeeCapture { fee_rate } => {
                let fees = amount * fee_rate;
                (fees, vec![("liquidityAmount", amount), ("estimatedFees", fees)])
            }
        }
    }
}

/// Parâmetros de uma categoria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryParams {
    /// Limite de gas assumido para a operação
    pub gas_limit: u64,
    pub model: MarketModel,
    /// Confiança quando o montante veio da transação
    pub confidence_known: f64,
    /// Confiança quando o mínimo da categoria foi usado
    pub confidence_unknown: f64,
    /// Lucro líquido precisa ser estritamente maior
    pub min_profit: f64,
    /// Montante usado quando nada plausível foi extraído
    pub fallback_amount: f64,
    /// Observação fixa incluída no detalhamento
    #[serde(default)]
    pub note: Option<String>,
}

impl CategoryParams {
    pub fn defaults_for(kind: OpportunityKind) -> Self {
        match kind {
            OpportunityKind::Arbitrage => Self {
                gas_limit: 150_000,
                model: MarketModel::PriceDifferential { price_diff: 0.001 },
                confidence_known: 0.6,
                confidence_unknown: 0.6,
                min_profit: 0.001,
                fallback_amount: 0.001,
                note: Some("Simulado - requer comparação real de preços entre DEXs".to_string()),
            },
            OpportunityKind::Sandwich => Self {
                gas_limit: 300_000,
                model: MarketModel::Sandwich { price_impact: 0.005, position_share: 0.5 },
                confidence_known: 0.5,
                confidence_unknown: 0.3,
                min_profit: 0.0005,
                fallback_amount: 0.01,
                note: None,
            },
            OpportunityKind::FrontRun => Self {
                gas_limit: 100_000,
                model: MarketModel::FrontRun { profit_rate: 0.02 },
                confidence_known: 0.3,
                confidence_unknown: 0.2,
                min_profit: 0.005,
                fallback_amount: 0.01,
                note: None,
            },
            OpportunityKind::BackRun => Self {
                gas_limit: 150_000,
                model: MarketModel::BackRun {
                    price_impact: 0.005,
                    recovery_rate: 0.5,
                    position_share: 0.3,
                },
                confidence_known: 0.6,
                confidence_unknown: 0.4,
                min_profit: 0.001,
                fallback_amount: 0.01,
                note: None,
            },
            OpportunityKind::Liquidation => Self {
                gas_limit: 200_000,
                model: MarketModel::LiquidationBonus { bonus: 0.05 },
                confidence_known: 0.4,
                confidence_unknown: 0.4,
                min_profit: 0.01,
                fallback_amount: 0.001,
                note: None,
            },
            OpportunityKind::JitLiquidity => Self {
                gas_limit: 400_000,
                model: MarketModel::FeeCapture { fee_rate: 0.001 },
                confidence_known: 0.7,
                confidence_unknown: 0.7,
                min_profit: 0.01,
                fallback_amount: 0.1,
                note: Some("Requer detectar swap grande no mesmo bloco".to_string()),
            },
        }
    }

    pub fn confidence(&self, amount_known: bool) -> f64 {
        if amount_known {
            self.confidence_known
        } else {
            self.confidence_unknown
        }
    }

    fn validate(&self, kind: OpportunityKind) -> Result<()> {
        for (name, value) in [
            ("confidence_known", self.confidence_known),
            ("confidence_unknown", self.confidence_unknown),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!("{}.{} fora de [0, 1]: {}", kind, name, value)));
            }
        }
        if self.gas_limit == 0 {
            return Err(Error::ConfigError(format!("{}.gas_limit deve ser positivo", kind)));
        }
        if !self.fallback_amount.is_finite() || self.fallback_amount < 0.0 {
            return Err(Error::ConfigError(format!("{}.fallback_amount inválido", kind)));
        }
        Ok(())
    }
}

/// Heurística de conversão de montantes lidos do calldata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountHeuristics {
    /// Casas decimais assumidas para o token
    pub token_decimals: u32,
    /// Faixa plausível, exclusiva, em unidades do token
    pub min_plausible_tokens: f64,
    pub max_plausible_tokens: f64,
    /// Taxa de conversão token para unidade nativa
    pub token_native_rate: f64,
}

impl Default for AmountHeuristics {
    fn default() -> Self {
        Self {
            token_decimals: 18,
            min_plausible_tokens: 1e-6,
            max_plausible_tokens: 1e6,
            token_native_rate: 0.001,
        }
    }
}

/// Conjunto completo de parâmetros das seis categorias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MevParams {
    pub arbitrage: CategoryParams,
    pub sandwich: CategoryParams,
    pub front_run: CategoryParams,
    pub back_run: CategoryParams,
    pub liquidation: CategoryParams,
    pub jit_liquidity: CategoryParams,
    pub amounts: AmountHeuristics,
}

impl Default for MevParams {
    fn default() -> Self {
        Self {
            arbitrage: CategoryParams::defaults_for(OpportunityKind::Arbitrage),
            sandwich: CategoryParams::defaults_for(OpportunityKind::Sandwich),
            front_run: CategoryParams::defaults_for(OpportunityKind::FrontRun),
            back_run: CategoryParams::defaults_for(OpportunityKind::BackRun),
            liquidation: CategoryParams::defaults_for(OpportunityKind::Liquidation),
            jit_liquidity: CategoryParams::defaults_for(OpportunityKind::JitLiquidity),
            amounts: AmountHeuristics::default(),
        }
    }
}

/// Campos opcionais aceitos no arquivo TOML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryOverride {
    gas_limit: Option<u64>,
    model: Option<MarketModel>,
    confidence_known: Option<f64>,
    confidence_unknown: Option<f64>,
    min_profit: Option<f64>,
    fallback_amount: Option<f64>,
    note: Option<String>,
}

impl CategoryOverride {
    fn apply(self, target: &mut CategoryParams) {
        if let Some(v) = self.gas_limit {
            target.gas_limit = v;
        }
        if let Some(v) = self.model {
            target.model = v;
        }
        if let Some(v) = self.confidence_known {
            target.confidence_known = v;
        }
        if let Some(v) = self.confidence_unknown {
            target.confidence_unknown = v;
        }
        if let Some(v) = self.min_profit {
            target.min_profit = v;
        }
        if let Some(v) = self.fallback_amount {
            target.fallback_amount = v;
        }
        if let Some(v) = self.note {
            target.note = if v.is_empty() { None } else { Some(v) };
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParamsFile {
    arbitrage: Option<CategoryOverride>,
    sandwich: Option<CategoryOverride>,
    front_run: Option<CategoryOverride>,
    back_run: Option<CategoryOverride>,
    liquidation: Option<CategoryOverride>,
    jit_liquidity: Option<CategoryOverride>,
    amounts: Option<AmountHeuristics>,
}

impl MevParams {
    /// Parâmetros de uma categoria
    pub fn category(&self, kind: OpportunityKind) -> &CategoryParams {
        match kind {
            OpportunityKind::Arbitrage => &self.arbitrage,
            OpportunityKind::Sandwich => &self.sandwich,
            OpportunityKind::FrontRun => &self.front_run,
            OpportunityKind::BackRun => &self.back_run,
            OpportunityKind::Liquidation => &self.liquidation,
            OpportunityKind::JitLiquidity => &self.jit_liquidity,
        }
    }

    pub fn category_mut(&mut self, kind: OpportunityKind) -> &mut CategoryParams {
        match kind {
            OpportunityKind::Arbitrage => &mut self.arbitrage,
            OpportunityKind::Sandwich => &mut self.sandwich,
            OpportunityKind::FrontRun => &mut self.front_run,
            OpportunityKind::BackRun => &mut self.back_run,
            OpportunityKind::Liquidation => &mut self.liquidation,
            OpportunityKind::JitLiquidity => &mut self.jit_liquidity,
        }
    }

    /// Lê parâmetros de um texto TOML sobre os valores padrão
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ParamsFile = toml::from_str(text)
            .map_err(|e| Error::ConfigError(format!("TOML de parâmetros inválido: {}", e)))?;

        let mut params = Self::default();
        let overrides = [
            (OpportunityKind::Arbitrage, file.arbitrage),
            (OpportunityKind::Sandwich, file.sandwich),
            (OpportunityKind::FrontRun, file.front_run),
            (OpportunityKind::BackRun, file.back_run),
            (OpportunityKind::Liquidation, file.liquidation),
            (OpportunityKind::JitLiquidity, file.jit_liquidity),
        ];
        for (kind, category) in overrides {
            if let Some(category) = category {
                category.apply(params.category_mut(kind));
            }
        }
        if let Some(amounts) = file.amounts {
            params.amounts = amounts;
        }

        params.validate()?;
        Ok(params)
    }

    /// Lê parâmetros de um arquivo TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Falha ao ler {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        for kind in OpportunityKind::ALL {
            self.category(kind).validate(kind)?;
        }
        let amounts = &self.amounts;
        if amounts.min_plausible_tokens >= amounts.max_plausible_tokens {
            return Err(Error::ConfigError(
                "amounts.min_plausible_tokens deve ser menor que max_plausible_tokens".to_string(),
            ));
        }
        Ok(())
    }
}
