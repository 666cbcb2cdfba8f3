//! Saída para o operador.
//!
//! Todo texto do relatório passa por aqui; diagnósticos vão pelo `tracing`.

use crate::{
    events::TxReport,
    mempool_supervisor::{MempoolSnapshot, SnapshotSource},
    run_aggregator::RunStatistics,
};
use ethernity_core::{
    types::SubscriptionId,
    utils::{format_address, format_h256, format_selector, wei_to_native},
};
use std::io::{self, Write};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const STATUS_WIDTH: usize = 100;

/// Opções de exibição
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Exibe uma linha para cada transação analisada
    pub show_all: bool,
    /// Linha de status reescrita a cada notificação quando `show_all` está desligado
    pub live_status: bool,
    /// Preço de referência em USD por unidade nativa
    pub usd_price: f64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            show_all: false,
            live_status: true,
            usd_price: 2000.0,
        }
    }
}

pub struct Reporter<W: Write> {
    out: W,
    config: ReporterConfig,
    status_shown: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, config: ReporterConfig) -> Self {
        Self {
            out,
            config,
            status_shown: false,
        }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, ws_url: &str, http_url: &str) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out, "🔍 Detector de Oportunidades MEV")?;
        writeln!(out, "{}", RULE)?;
        writeln!(out, "🔌 WebSocket: {}", ws_url)?;
        writeln!(out, "🌐 HTTP RPC: {}", http_url)?;
        writeln!(
            out,
            "📋 Todas as transações: {}",
            if self.config.show_all { "ATIVADO" } else { "DESATIVADO" }
        )?;
        writeln!(out, "💡 Pressione Ctrl+C para encerrar")?;
        writeln!(out, "{}", RULE)?;
        out.flush()
    }

    /// Fotografia inicial da mempool
    pub fn mempool_snapshot(&mut self, snapshot: &MempoolSnapshot) -> io::Result<()> {
        let status = &snapshot.status;
        match snapshot.source {
            SnapshotSource::TxpoolStatus => {}
            SnapshotSource::TxpoolContent => {
                writeln!(self.out, "ℹ️  txpool_status indisponível, contagens obtidas de txpool_content")?;
            }
            SnapshotSource::Unavailable => {
                writeln!(self.out, "⚠️  Não foi possível obter o estado da mempool")?;
            }
        }
        write!(
            self.out,
            "📊 Mempool inicial: {} pendentes, {} na fila",
            status.pending, status.queued
        )?;
        match snapshot.block_number {
            Some(block) => writeln!(self.out, " (bloco {})", block)?,
            None => writeln!(self.out)?,
        }
        self.out.flush()
    }

    pub fn subscribed(&mut self, id: &SubscriptionId) -> io::Result<()> {
        writeln!(self.out, "✅ Inscrito em newPendingTransactions ({})", id)?;
        writeln!(self.out, "💡 Aguardando transações...")?;
        self.out.flush()
    }

    /// Linha por transação, apenas com `show_all`
    pub fn transaction_line(&mut self, index: u64, report: &TxReport) -> io::Result<()> {
        if !self.config.show_all {
            return Ok(());
        }
        let tx = &report.tx.tx;
        let to = tx
            .to
            .as_ref()
            .map(format_address)
            .unwrap_or_else(|| "criação de contrato".to_string());
        let function = match (report.tx.function_name(), tx.selector()) {
            (Some(name), _) => name.to_string(),
            (None, Some(selector)) => format_selector(&selector),
            (None, None) => "-".to_string(),
        };
        writeln!(
            self.out,
            "📦 Tx #{} {} → {} | {:.6} ETH | {} | {} | {} oportunidade(s)",
            index,
            format_h256(&tx.hash),
            to,
            wei_to_native(&tx.value),
            function,
            report.tx.tags,
            report.opportunities.len()
        )?;
        self.out.flush()
    }

    /// Reescreve a linha de status com os contadores atuais
    pub fn progress(&mut self, stats: &RunStatistics) -> io::Result<()> {
        if self.config.show_all || !self.config.live_status {
            return Ok(());
        }
        write!(
            self.out,
            "\r🔔 Tx #{} | Swaps: {} | ETH: {} | Outras: {} | MEV: {}",
            stats.notifications, stats.swaps, stats.eth_transfers, stats.unknown, stats.opportunities_found
        )?;
        self.status_shown = true;
        self.out.flush()
    }

    /// Apaga a linha de status antes de uma saída em bloco
    pub fn clear_progress(&mut self) -> io::Result<()> {
        if !self.status_shown {
            return Ok(());
        }
        self.status_shown = false;
        write!(self.out, "\r{}\r", " ".repeat(STATUS_WIDTH))
    }

    /// Bloco com as oportunidades de uma transação
    pub fn opportunity_block(&mut self, seq: u64, report: &TxReport) -> io::Result<()> {
        self.clear_progress()?;
        let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
        let out = &mut self.out;

        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(80))?;
        writeln!(out, "🔍 OPORTUNIDADE MEV #{} [{}]", seq, timestamp)?;
        writeln!(out, "   Transação: {}", format_h256(&report.tx.tx.hash))?;
        writeln!(out, "   {}", "-".repeat(76))?;

        for opp in &report.opportunities {
            writeln!(out)?;
            writeln!(out, "   📊 Tipo: {}", opp.kind)?;
            writeln!(
                out,
                "   💰 Lucro estimado: {:.6} ETH (~${:.2})",
                opp.net_profit,
                opp.net_profit * self.config.usd_price
            )?;
            writeln!(out, "   📈 Confiança: {:.0}%", opp.confidence * 100.0)?;
            if !opp.details.is_empty() {
                writeln!(out, "   📋 Detalhes:")?;
                for (key, value) in &opp.details {
                    writeln!(out, "      - {}: {}", key, value)?;
                }
            }
        }

        writeln!(out)?;
        writeln!(out, "   ⚠️  Estimativa heurística, uso apenas educacional")?;
        writeln!(out, "{}", "=".repeat(80))?;
        out.flush()
    }

    /// Resumo final da execução
    pub fn summary(&mut self, stats: &RunStatistics) -> io::Result<()> {
        self.clear_progress()?;
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "📊 Resumo:")?;
        writeln!(out, "   Notificações recebidas: {}", stats.notifications)?;
        writeln!(out, "   Transações analisadas: {}", stats.transactions_analyzed)?;
        writeln!(out, "   - Swaps: {}", stats.swaps)?;
        writeln!(out, "   - Transferências de ETH: {}", stats.eth_transfers)?;
        writeln!(out, "   - Liquidações: {}", stats.liquidations)?;
        writeln!(out, "   - Operações de liquidez: {}", stats.liquidity_ops)?;
        writeln!(out, "   - Desconhecidas: {}", stats.unknown)?;
        writeln!(out, "   Não encontradas (já mineradas): {}", stats.not_found)?;
        writeln!(out, "   Erros de análise: {}", stats.analysis_errors)?;
        writeln!(out, "   Erros de detectores: {}", stats.detector_errors)?;
        writeln!(
            out,
            "   Oportunidades MEV: {} em {} transação(ões)",
            stats.opportunities_found, stats.transactions_with_opportunities
        )?;
        if let Some(rate) = stats.detection_rate() {
            writeln!(out, "   Taxa de detecção: {:.2}%", rate * 100.0)?;
        }
        if let Some(rate) = stats.swap_detection_rate() {
            writeln!(out, "   Taxa entre swaps: {:.2}%", rate * 100.0)?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_omits_undefined_rates() {
        let mut reporter = Reporter::new(Vec::new(), ReporterConfig::default());
        reporter.summary(&RunStatistics::default()).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Transações analisadas: 0"));
        assert!(!text.contains("Taxa de detecção"));
    }

    #[test]
    fn summary_prints_both_rates() {
        let stats = RunStatistics {
            transactions_analyzed: 4,
            swaps: 2,
            opportunities_found: 1,
            ..Default::default()
        };
        let mut reporter = Reporter::new(Vec::new(), ReporterConfig::default());
        reporter.summary(&stats).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(text.contains("Taxa de detecção: 25.00%"));
        assert!(text.contains("Taxa entre swaps: 50.00%"));
    }

    #[test]
    fn status_line_is_cleared_before_summary() {
        let stats = RunStatistics {
            notifications: 3,
            transactions_analyzed: 3,
            swaps: 2,
            eth_transfers: 1,
            ..Default::default()
        };
        let mut reporter = Reporter::new(Vec::new(), ReporterConfig::default());
        reporter.progress(&stats).unwrap();
        reporter.summary(&stats).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();

        let status_at = text.find("🔔 Tx #3 | Swaps: 2 | ETH: 1 | Outras: 0 | MEV: 0").unwrap();
        let clear_at = text.find(&format!("\r{}\r", " ".repeat(STATUS_WIDTH))).unwrap();
        let summary_at = text.find("Resumo").unwrap();
        assert!(status_at < clear_at && clear_at < summary_at);
    }

    #[test]
    fn status_line_disabled_with_show_all_or_debug() {
        for config in [
            ReporterConfig { show_all: true, ..Default::default() },
            ReporterConfig { live_status: false, ..Default::default() },
        ] {
            let mut reporter = Reporter::new(Vec::new(), config);
            reporter.progress(&RunStatistics::default()).unwrap();
            reporter.summary(&RunStatistics::default()).unwrap();
            let text = String::from_utf8(reporter.into_inner()).unwrap();
            assert!(!text.contains("🔔"));
            assert!(!text.contains('\r'));
        }
    }
}
