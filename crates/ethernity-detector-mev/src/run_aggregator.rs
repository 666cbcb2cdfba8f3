use crate::{
    events::{PipelineEvent, TxReport},
    reporter::Reporter,
    tx_nature_tagger::TxTag,
};
use serde::Serialize;
use std::io::Write;
use tracing::{debug, warn};

/// Contadores da execução. Só o agregador os altera.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    /// Notificações que chegaram ao fim do pipeline
    pub notifications: u64,
    pub transactions_analyzed: u64,
    pub not_found: u64,
    pub analysis_errors: u64,
    pub detector_errors: u64,
    pub eth_transfers: u64,
    pub swaps: u64,
    pub liquidations: u64,
    pub liquidity_ops: u64,
    /// Transações sem nenhuma tag
    pub unknown: u64,
    pub opportunities_found: u64,
    pub transactions_with_opportunities: u64,
}

impl RunStatistics {
    /// Oportunidades por transação analisada
    pub fn detection_rate(&self) -> Option<f64> {
        ratio(self.opportunities_found, self.transactions_analyzed)
    }

    /// Oportunidades por swap observado
    pub fn swap_detection_rate(&self) -> Option<f64> {
        ratio(self.opportunities_found, self.swaps)
    }

    fn record_report(&mut self, report: &TxReport) {
        self.transactions_analyzed += 1;
        self.detector_errors += report.detector_errors as u64;

        let tags = report.tx.tags;
        if tags.is_empty() {
            self.unknown += 1;
        }
        for tag in tags.iter() {
            match tag {
                TxTag::EthTransfer => self.eth_transfers += 1,
                TxTag::Swap => self.swaps += 1,
                TxTag::Liquidation => self.liquidations += 1,
                TxTag::LiquidityOp => self.liquidity_ops += 1,
            }
        }

        if !report.opportunities.is_empty() {
            self.opportunities_found += report.opportunities.len() as u64;
            self.transactions_with_opportunities += 1;
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Único escritor das estatísticas e da saída do relatório
pub struct RunAggregator<W: Write> {
    stats: RunStatistics,
    reporter: Reporter<W>,
}

impl<W: Write> RunAggregator<W> {
    pub fn new(reporter: Reporter<W>) -> Self {
        Self {
            stats: RunStatistics::default(),
            reporter,
        }
    }

    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Aplica um evento do pipeline
    pub fn record(&mut self, event: PipelineEvent) {
        self.stats.notifications += 1;

        match event {
            PipelineEvent::Analyzed(report) => {
                self.stats.record_report(&report);
                let index = self.stats.transactions_analyzed;

                if let Err(e) = self.reporter.transaction_line(index, &report) {
                    warn!("Falha ao escrever relatório: {}", e);
                }
                if !report.opportunities.is_empty() {
                    let seq = self.stats.transactions_with_opportunities;
                    if let Err(e) = self.reporter.opportunity_block(seq, &report) {
                        warn!("Falha ao escrever relatório: {}", e);
                    }
                }
            }
            PipelineEvent::NotFound(tx_hash) => {
                debug!(?tx_hash, "Transação não encontrada (provavelmente já minerada)");
                self.stats.not_found += 1;
            }
            PipelineEvent::Failed { tx_hash, reason } => {
                warn!(?tx_hash, "Erro ao analisar transação: {}", reason);
                self.stats.analysis_errors += 1;
            }
        }

        if let Err(e) = self.reporter.progress(&self.stats) {
            warn!("Falha ao escrever status: {}", e);
        }
    }

    /// Escreve o resumo final e devolve as estatísticas e a saída
    pub fn finish(mut self) -> (RunStatistics, W) {
        if let Err(e) = self.reporter.summary(&self.stats) {
            warn!("Falha ao escrever resumo: {}", e);
        }
        (self.stats, self.reporter.into_inner())
    }
}
