use std::env;
use std::sync::Arc;

use ethernity_core::{traits::RpcProvider, utils::hex_to_h256};
use ethernity_detector_mev::{HeuristicDetector, MevParams, OpportunityKind, TxNatureTagger};
use ethernity_rpc::{EthernityRpcClient, RpcConfig};

/// Mostra a estimativa de todas as categorias para uma transação pendente,
/// inclusive as que ficam abaixo do limite mínimo de lucro.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Uso: {} <TX_HASH>", args[0]);
        eprintln!("HTTP_URL define o endpoint (padrão http://localhost:8546)");
        std::process::exit(1);
    }
    let tx_hash = hex_to_h256(&args[1]).ok_or_else(|| anyhow::anyhow!("hash inválido: {}", args[1]))?;

    let endpoint = env::var("HTTP_URL").unwrap_or_else(|_| "http://localhost:8546".to_string());
    let rpc = Arc::new(EthernityRpcClient::new(RpcConfig { endpoint, ..Default::default() })?);

    let Some(tx) = rpc.get_transaction(tx_hash).await? else {
        println!("Transação não encontrada (já minerada ou descartada)");
        return Ok(());
    };

    let classified = TxNatureTagger::new().tag(&tx);
    println!("Tags: {}", classified.tags);
    if let Some(name) = classified.function_name() {
        println!("Função: {}", name);
    }

    let params = MevParams::default();
    for kind in OpportunityKind::ALL {
        let detector = HeuristicDetector::new(rpc.clone(), kind, &params);
        match detector.evaluate(&classified).await? {
            Some(estimate) => println!(
                "{:<14} montante={:.6} ({:?}) bruto={:.6} gas={:.6} líquido={:.6} mínimo={} confiança={:.0}%",
                kind.as_str(),
                estimate.amount,
                estimate.amount_source,
                estimate.gross,
                estimate.gas_cost,
                estimate.net,
                detector.params().min_profit,
                estimate.confidence * 100.0
            ),
            None => println!("{:<14} sem a tag {}", kind.as_str(), kind.gating_tag()),
        }
    }

    Ok(())
}
