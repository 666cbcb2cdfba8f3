//! Supervisor do pipeline de análise.
//!
//! Cada hash recebido gera uma análise (busca, classificação e os seis
//! detectores). No máximo `max_in_flight` análises rodam ao mesmo tempo e a
//! próxima notificação só é lida quando há vaga. Os resultados seguem por um
//! canal limitado até o agregador, único escritor das estatísticas.

use crate::{
    events::{EventBus, PipelineEvent, TxReport},
    mev_params::MevParams,
    opportunity_detector::build_detectors,
    run_aggregator::{RunAggregator, RunStatistics},
    traits::OpportunityDetector,
    tx_nature_tagger::TxNatureTagger,
};
use ethernity_core::{
    error::Result,
    traits::RpcProvider,
    types::{MempoolStatus, TransactionHash},
    Error,
};
use futures::{future::join_all, stream, Stream, StreamExt};
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Análises simultâneas
    pub max_in_flight: usize,
    /// Capacidade do canal até o agregador
    pub queue_capacity: usize,
    /// Espera máxima pelas análises em andamento no encerramento
    pub drain_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 64,
            queue_capacity: 1024,
            drain_timeout: Duration::from_secs(10),
        }
    }
}

/// Motivo do fim da leitura de notificações
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// Sinal de encerramento do operador
    Interrupted,
    /// O node encerrou a conexão
    StreamClosed,
    /// Erro de transporte na inscrição
    TransportError(String),
}

impl Termination {
    /// Apenas a interrupção pelo operador é um encerramento limpo
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::Interrupted)
    }
}

#[derive(Debug)]
pub struct RunOutcome<W> {
    pub stats: RunStatistics,
    pub termination: Termination,
    /// Análises abortadas após o timeout de drenagem
    pub aborted: usize,
    pub output: W,
}

/// De onde vieram as contagens da mempool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    TxpoolStatus,
    TxpoolContent,
    Unavailable,
}

/// Estado da mempool antes do início da escuta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MempoolSnapshot {
    pub status: MempoolStatus,
    pub block_number: Option<u64>,
    pub source: SnapshotSource,
}

type Detectors = Arc<Vec<Box<dyn OpportunityDetector>>>;

pub struct MempoolSupervisor<P> {
    provider: P,
    tagger: Arc<TxNatureTagger>,
    detectors: Detectors,
    config: SupervisorConfig,
}

impl<P: RpcProvider + Clone + 'static> MempoolSupervisor<P> {
    /// Supervisor com os seis detectores heurísticos
    pub fn new(provider: P, params: &MevParams, config: SupervisorConfig) -> Self {
        let detectors = build_detectors(provider.clone(), params);
        Self::with_detectors(provider, TxNatureTagger::new(), detectors, config)
    }

    pub fn with_detectors(
        provider: P,
        tagger: TxNatureTagger,
        detectors: Vec<Box<dyn OpportunityDetector>>,
        config: SupervisorConfig,
    ) -> Self {
        Self {
            provider,
            tagger: Arc::new(tagger),
            detectors: Arc::new(detectors),
            config,
        }
    }

    pub fn config(&self) -> &SupervisorConfig {
        &self.config
    }

    /// Contagens iniciais da mempool e bloco atual.
    ///
    /// Usa `txpool_content` quando `txpool_status` falha e zeros quando
    /// ambos falham.
    pub async fn mempool_snapshot(&self) -> MempoolSnapshot {
        let (status, source) = match self.provider.mempool_status().await {
            Ok(status) => (status, SnapshotSource::TxpoolStatus),
            Err(e) => {
                debug!("txpool_status falhou: {}", e);
                match self.provider.mempool_content().await {
                    Ok(content) => (content.status(), SnapshotSource::TxpoolContent),
                    Err(e) => {
                        warn!("Não foi possível obter o estado da mempool: {}", e);
                        (MempoolStatus::default(), SnapshotSource::Unavailable)
                    }
                }
            }
        };

        let block_number = match self.provider.get_block_number().await {
            Ok(number) => Some(number),
            Err(e) => {
                warn!("Falha ao obter o bloco atual: {}", e);
                None
            }
        };

        MempoolSnapshot { status, block_number, source }
    }

    /// Analisa uma única transação
    pub async fn analyze(&self, tx_hash: TransactionHash) -> PipelineEvent {
        analyze_transaction(
            self.provider.clone(),
            self.tagger.clone(),
            self.detectors.clone(),
            tx_hash,
        )
        .await
    }

    /// Consome os hashes até o sinal de encerramento, o fim da sequência ou
    /// um erro de transporte. O resumo é escrito depois que todas as análises
    /// em andamento terminaram ou foram abortadas.
    pub async fn run<S, F, W>(&self, hashes: S, shutdown: F, aggregator: RunAggregator<W>) -> Result<RunOutcome<W>>
    where
        S: Stream<Item = Result<TransactionHash>>,
        F: Future<Output = ()>,
        W: Write + Send + 'static,
    {
        self.run_with_signals(hashes, stream::once(shutdown), aggregator).await
    }

    /// Como [`run`](Self::run), mas com uma sequência de sinais: o primeiro
    /// encerra a escuta e o seguinte, durante a drenagem, aborta as análises
    /// pendentes sem esperar o `drain_timeout`.
    pub async fn run_with_signals<S, I, W>(
        &self,
        hashes: S,
        signals: I,
        mut aggregator: RunAggregator<W>,
    ) -> Result<RunOutcome<W>>
    where
        S: Stream<Item = Result<TransactionHash>>,
        I: Stream<Item = ()>,
        W: Write + Send + 'static,
    {
        let (bus, mut events) = EventBus::new(self.config.queue_capacity);
        let writer = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                aggregator.record(event);
            }
            aggregator
        });

        let permits = Arc::new(Semaphore::new(self.config.max_in_flight.max(1)));
        let mut in_flight = JoinSet::new();
        futures::pin_mut!(hashes);
        futures::pin_mut!(signals);

        info!(max_in_flight = self.config.max_in_flight, "Escutando a mempool");

        let termination = loop {
            let permit = tokio::select! {
                biased;
                Some(()) = signals.next() => break Termination::Interrupted,
                Some(joined) = in_flight.join_next() => {
                    log_join_error(joined);
                    continue;
                }
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break Termination::Interrupted,
                },
            };

            let tx_hash = tokio::select! {
                biased;
                Some(()) = signals.next() => break Termination::Interrupted,
                item = hashes.next() => match item {
                    Some(Ok(tx_hash)) => tx_hash,
                    Some(Err(e)) => break Termination::TransportError(e.to_string()),
                    None => break Termination::StreamClosed,
                },
            };

            let provider = self.provider.clone();
            let tagger = self.tagger.clone();
            let detectors = self.detectors.clone();
            let sender = bus.sender();
            in_flight.spawn(async move {
                let event = analyze_transaction(provider, tagger, detectors, tx_hash).await;
                if sender.send(event).await.is_err() {
                    warn!(?tx_hash, "Agregador encerrado antes do evento");
                }
                drop(permit);
            });
        };

        info!(?termination, pending = in_flight.len(), "Encerrando escuta");
        drop(bus);

        let drain_timeout = self.config.drain_timeout;
        let drained = tokio::select! {
            biased;
            Some(()) = signals.next() => {
                warn!("Novo sinal de encerramento durante a drenagem");
                false
            }
            drained = tokio::time::timeout(drain_timeout, async {
                while let Some(joined) = in_flight.join_next().await {
                    log_join_error(joined);
                }
            }) => drained.is_ok(),
        };

        let mut aborted = 0;
        if !drained && !in_flight.is_empty() {
            aborted = in_flight.len();
            in_flight.abort_all();
            while in_flight.join_next().await.is_some() {}
            warn!(aborted, ?drain_timeout, "Análises pendentes abortadas");
        }

        let aggregator = writer
            .await
            .map_err(|e| Error::Other(format!("Tarefa do agregador falhou: {}", e)))?;
        let (stats, output) = aggregator.finish();

        Ok(RunOutcome {
            stats,
            termination,
            aborted,
            output,
        })
    }
}

fn log_join_error(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!("Análise terminou em pânico: {}", e);
        }
    }
}

/// Busca, classifica e executa todos os detectores para um hash
async fn analyze_transaction<P: RpcProvider>(
    provider: P,
    tagger: Arc<TxNatureTagger>,
    detectors: Detectors,
    tx_hash: TransactionHash,
) -> PipelineEvent {
    let tx = match provider.get_transaction(tx_hash).await {
        Ok(Some(tx)) => tx,
        Ok(None) => return PipelineEvent::NotFound(tx_hash),
        Err(e) => {
            return PipelineEvent::Failed {
                tx_hash,
                reason: e.to_string(),
            }
        }
    };

    let classified = tagger.tag(&tx);
    debug!(?tx_hash, tags = %classified.tags, function = ?classified.function_name(), "Transação classificada");

    let results = join_all(detectors.iter().map(|d| d.detect(&classified))).await;

    let mut opportunities = Vec::new();
    let mut detector_errors = 0;
    for (detector, result) in detectors.iter().zip(results) {
        match result {
            Ok(Some(opportunity)) => opportunities.push(opportunity),
            Ok(None) => {}
            Err(e) => {
                warn!(?tx_hash, kind = %detector.kind(), "Detector falhou: {}", e);
                detector_errors += 1;
            }
        }
    }

    PipelineEvent::Analyzed(TxReport {
        tx: classified,
        opportunities,
        detector_errors,
    })
}
