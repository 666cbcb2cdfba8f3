use ethernity_core::types::PendingTransaction;
use ethernity_detector_mev::{
    DetailValue, Opportunity, OpportunityKind, PipelineEvent, Reporter, ReporterConfig, RunAggregator, TxNatureTagger,
    TxReport,
};
use ethereum_types::{Address, H256, U256};
use ethers::types::Bytes;
use std::collections::BTreeMap;

fn report(byte: u8, value: U256, input: &str, opportunities: Vec<Opportunity>) -> TxReport {
    let tx = PendingTransaction {
        hash: H256::repeat_byte(byte),
        from: Address::repeat_byte(0x01),
        to: Some(Address::repeat_byte(0x02)),
        value,
        input: Bytes::from(hex::decode(input).unwrap()),
        gas: U256::from(21_000u64),
        gas_price: None,
    };
    TxReport {
        tx: TxNatureTagger::new().tag(&tx),
        opportunities,
        detector_errors: 0,
    }
}

fn opportunity(byte: u8, kind: OpportunityKind, net: f64) -> Opportunity {
    let mut details = BTreeMap::new();
    details.insert("amount".to_string(), DetailValue::Number(3.0));
    details.insert("note".to_string(), DetailValue::from("simulado"));
    Opportunity {
        tx_hash: H256::repeat_byte(byte),
        kind,
        net_profit: net,
        gross_estimate: net + 0.001,
        gas_cost: 0.001,
        confidence: 0.6,
        details,
    }
}

fn aggregator(show_all: bool) -> RunAggregator<Vec<u8>> {
    RunAggregator::new(Reporter::new(
        Vec::new(),
        ReporterConfig {
            show_all,
            live_status: true,
            usd_price: 2000.0,
        },
    ))
}

#[test]
fn counts_tags_misses_and_errors() {
    let mut agg = aggregator(false);
    agg.record(PipelineEvent::Analyzed(report(1, U256::exp10(18), "", vec![])));
    agg.record(PipelineEvent::Analyzed(report(
        2,
        U256::zero(),
        "38ed1739",
        vec![
            opportunity(2, OpportunityKind::Arbitrage, 0.002),
            opportunity(2, OpportunityKind::Sandwich, 0.004),
        ],
    )));
    agg.record(PipelineEvent::Analyzed(report(3, U256::zero(), "deadbeef", vec![])));
    agg.record(PipelineEvent::NotFound(H256::repeat_byte(4)));
    agg.record(PipelineEvent::Failed {
        tx_hash: H256::repeat_byte(5),
        reason: "timeout".to_string(),
    });

    let stats = agg.stats().clone();
    assert_eq!(stats.notifications, 5);
    assert_eq!(stats.transactions_analyzed, 3);
    assert_eq!(stats.eth_transfers, 1);
    assert_eq!(stats.swaps, 1);
    assert_eq!(stats.unknown, 1);
    assert_eq!(stats.not_found, 1);
    assert_eq!(stats.analysis_errors, 1);
    assert_eq!(stats.opportunities_found, 2);
    assert_eq!(stats.transactions_with_opportunities, 1);
    assert_eq!(stats.detection_rate(), Some(2.0 / 3.0));
    assert_eq!(stats.swap_detection_rate(), Some(2.0));
}

#[test]
fn detector_errors_are_summed() {
    let mut agg = aggregator(false);
    let mut failing = report(1, U256::zero(), "38ed1739", vec![]);
    failing.detector_errors = 4;
    agg.record(PipelineEvent::Analyzed(failing));
    assert_eq!(agg.stats().detector_errors, 4);
    assert_eq!(agg.stats().analysis_errors, 0);
}

#[test]
fn opportunity_block_and_summary_are_rendered() {
    let mut agg = aggregator(false);
    agg.record(PipelineEvent::Analyzed(report(
        7,
        U256::zero(),
        "38ed1739",
        vec![opportunity(7, OpportunityKind::FrontRun, 0.25)],
    )));
    agg.record(PipelineEvent::Analyzed(report(8, U256::exp10(18), "", vec![])));

    let (stats, output) = agg.finish();
    let text = String::from_utf8(output).unwrap();

    assert_eq!(stats.transactions_analyzed, 2);
    assert!(text.contains("OPORTUNIDADE MEV #1"));
    assert!(text.contains(&format!("0x{}", "07".repeat(32))));
    assert!(text.contains("Tipo: FRONT_RUN"));
    assert!(text.contains("0.250000 ETH (~$500.00)"));
    assert!(text.contains("Confiança: 60%"));
    assert!(text.contains("- amount: 3.000000"));
    assert!(text.contains("- note: simulado"));
    // sem show_all a transferência não aparece
    assert!(!text.contains(&"08".repeat(32)));
    assert!(text.contains("Taxa de detecção: 50.00%"));
    assert!(text.contains("Taxa entre swaps: 100.00%"));
    let summary_at = text.find("Resumo").unwrap();
    assert!(text.find("OPORTUNIDADE").unwrap() < summary_at);
}

#[test]
fn show_all_lists_every_transaction() {
    let mut agg = aggregator(true);
    agg.record(PipelineEvent::Analyzed(report(9, U256::exp10(18), "", vec![])));
    agg.record(PipelineEvent::Analyzed(report(10, U256::zero(), "ea8a1af0", vec![])));
    let (_, output) = agg.finish();
    let text = String::from_utf8(output).unwrap();

    assert!(text.contains("Tx #1"));
    assert!(text.contains("eth-transfer"));
    assert!(text.contains("1.000000 ETH"));
    assert!(text.contains("Tx #2"));
    assert!(text.contains("liquidationCall"));
    assert!(text.contains("liquidation"));
}

#[test]
fn default_mode_rewrites_status_line() {
    let mut agg = aggregator(false);
    agg.record(PipelineEvent::Analyzed(report(1, U256::exp10(18), "", vec![])));
    agg.record(PipelineEvent::NotFound(H256::repeat_byte(2)));
    agg.record(PipelineEvent::Analyzed(report(
        3,
        U256::zero(),
        "38ed1739",
        vec![opportunity(3, OpportunityKind::Arbitrage, 0.002)],
    )));
    let (_, output) = agg.finish();
    let text = String::from_utf8(output).unwrap();

    assert!(text.contains("\r🔔 Tx #1 | Swaps: 0 | ETH: 1 | Outras: 0 | MEV: 0"));
    assert!(text.contains("\r🔔 Tx #2 | Swaps: 0 | ETH: 1"));
    assert!(text.contains("\r🔔 Tx #3 | Swaps: 1 | ETH: 1 | Outras: 0 | MEV: 1"));
    // a linha é apagada antes do bloco e antes do resumo
    let clear = format!("\r{}\r", " ".repeat(100));
    let block_at = text.find("OPORTUNIDADE MEV #1").unwrap();
    assert!(text[..block_at].rfind(&clear).unwrap() > text[..block_at].rfind("🔔").unwrap());
    let summary_at = text.find("Resumo").unwrap();
    assert!(text[..summary_at].rfind(&clear).unwrap() > text[..summary_at].rfind("🔔").unwrap());
}

