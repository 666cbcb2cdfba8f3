use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{builder::BoolishValueParser, Parser};
use ethernity_detector_mev::{
    MempoolSupervisor, MevParams, Reporter, ReporterConfig, RunAggregator, SupervisorConfig, Termination,
};
use ethernity_rpc::{EthernityRpcClient, PendingTxSubscription, RpcConfig};
use futures::{stream, Stream};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Monitora a mempool e estima oportunidades MEV de forma passiva")]
struct Args {
    /// Endpoint WebSocket para a inscrição em transações pendentes
    #[arg(long, env = "WS_URL", default_value = "ws://localhost:8547")]
    ws_url: String,

    /// Endpoint HTTP JSON-RPC
    #[arg(long, env = "HTTP_URL", default_value = "http://localhost:8546")]
    http_url: String,

    /// Logs de depuração
    #[arg(long, env = "DEBUG", value_parser = BoolishValueParser::new())]
    debug: bool,

    /// Exibe todas as transações analisadas
    #[arg(long, env = "SHOW_ALL", value_parser = BoolishValueParser::new())]
    show_all: bool,

    /// Arquivo TOML com parâmetros das heurísticas
    #[arg(long)]
    params: Option<PathBuf>,

    /// Análises simultâneas
    #[arg(long, default_value_t = 64)]
    max_in_flight: usize,

    /// Capacidade da fila de eventos até o agregador
    #[arg(long, default_value_t = 1024)]
    queue_capacity: usize,

    /// Espera máxima pelas análises pendentes no encerramento, em segundos
    #[arg(long, default_value_t = 10)]
    drain_timeout_secs: u64,

    /// Preço de referência em USD por ETH
    #[arg(long, default_value_t = 2000.0)]
    usd_price: f64,
}

fn init_tracing(debug: bool) {
    let default_directives = if debug {
        "info,ethernity_detector_mev=debug,ethernity_rpc=debug,mev_watch=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C recebido"),
        Err(e) => {
            warn!("Falha ao instalar handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Cada Ctrl+C vira um sinal; o segundo interrompe a drenagem
fn shutdown_signals() -> impl Stream<Item = ()> {
    stream::unfold((), |()| async {
        shutdown_signal().await;
        Some(((), ()))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let params = match &args.params {
        Some(path) => MevParams::load(path).with_context(|| format!("parâmetros em {}", path.display()))?,
        None => MevParams::default(),
    };

    let rpc = Arc::new(EthernityRpcClient::new(RpcConfig {
        endpoint: args.http_url.clone(),
        ..Default::default()
    })?);

    let supervisor = MempoolSupervisor::new(
        rpc,
        &params,
        SupervisorConfig {
            max_in_flight: args.max_in_flight,
            queue_capacity: args.queue_capacity,
            drain_timeout: Duration::from_secs(args.drain_timeout_secs),
        },
    );

    let mut reporter = Reporter::new(
        io::stdout(),
        ReporterConfig {
            show_all: args.show_all,
            live_status: !args.debug,
            usd_price: args.usd_price,
        },
    );
    reporter.banner(&args.ws_url, &args.http_url)?;
    let snapshot = supervisor.mempool_snapshot().await;
    reporter.mempool_snapshot(&snapshot)?;

    let mut subscription = PendingTxSubscription::connect(&args.ws_url)
        .await
        .context("verifique se o WebSocket está habilitado no node")?;
    reporter.subscribed(subscription.id())?;

    let outcome = supervisor
        .run_with_signals(subscription.hashes(), shutdown_signals(), RunAggregator::new(reporter))
        .await?;
    subscription.close().await;

    if outcome.aborted > 0 {
        warn!(aborted = outcome.aborted, "Algumas análises não terminaram a tempo");
    }

    match outcome.termination {
        Termination::Interrupted => {
            info!("Encerrado");
            Ok(())
        }
        Termination::StreamClosed => {
            error!("Conexão WebSocket encerrada pelo node");
            bail!("conexão WebSocket encerrada")
        }
        Termination::TransportError(reason) => {
            error!("Erro no WebSocket: {}", reason);
            bail!("erro de transporte no WebSocket: {}", reason)
        }
    }
}
