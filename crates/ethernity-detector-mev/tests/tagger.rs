use ethernity_core::types::PendingTransaction;
use ethernity_detector_mev::{TxNatureTagger, TxTag, TxTags};
use ethereum_types::{Address, H256, U256};
use ethers::types::Bytes;

fn tx(value: U256, input: &str) -> PendingTransaction {
    PendingTransaction {
        hash: H256::repeat_byte(0x22),
        from: Address::repeat_byte(0x01),
        to: Some(Address::repeat_byte(0x11)),
        value,
        input: Bytes::from(hex::decode(input).unwrap()),
        gas: U256::from(200_000u64),
        gas_price: Some(U256::from(20_000_000_000u64)),
    }
}

#[test]
fn plain_value_transfer() {
    let tagger = TxNatureTagger::new();
    let tags = tagger.tags(&tx(U256::exp10(18), ""));
    assert!(tags.contains(TxTag::EthTransfer));
    assert_eq!(tags.len(), 1);
}

#[test]
fn zero_value_without_input_is_unknown() {
    let tagger = TxNatureTagger::new();
    assert!(tagger.tags(&tx(U256::zero(), "")).is_empty());
}

#[test]
fn detect_swap_v2() {
    let tagger = TxNatureTagger::new();
    // swapExactTokensForTokens com calldata truncado
    let classified = tagger.tag(&tx(U256::zero(), "38ed1739000000000000000000000000000000000000000000000000000000000001"));
    assert_eq!(classified.tags, [TxTag::Swap].into_iter().collect::<TxTags>());
    assert_eq!(classified.function_name(), Some("swapExactTokensForTokens"));
    assert_eq!(classified.call.unwrap().amount, None);
}

#[test]
fn swap_with_value_is_not_a_transfer() {
    let tagger = TxNatureTagger::new();
    let tags = tagger.tags(&tx(U256::exp10(17), "7ff36ab5"));
    assert!(tags.contains(TxTag::Swap));
    assert!(!tags.contains(TxTag::EthTransfer));
}

#[test]
fn liquidation_and_liquidity_tables() {
    let tagger = TxNatureTagger::new();
    for selector in ["2986c0e5", "ea8a1af0", "db005a1c"] {
        assert!(tagger.tags(&tx(U256::zero(), selector)).contains(TxTag::Liquidation), "{}", selector);
    }
    for selector in ["e8e33700", "f305d719", "88316456", "219f5d17"] {
        assert!(tagger.tags(&tx(U256::zero(), selector)).contains(TxTag::LiquidityOp), "{}", selector);
    }
}

#[test]
fn unknown_selector_yields_empty_set() {
    let tagger = TxNatureTagger::new();
    let classified = tagger.tag(&tx(U256::zero(), "a9059cbb0000000000000000000000000000000000000000000000000000000000000001"));
    assert!(classified.tags.is_empty());
    assert!(classified.call.is_none());
    assert_eq!(classified.tags.to_string(), "unknown");
}

#[test]
fn selector_in_two_tables_gets_both_tags() {
    let tagger = TxNatureTagger::new().with_selector([0x38, 0xed, 0x17, 0x39], TxTag::Liquidation);
    let tags = tagger.tags(&tx(U256::zero(), "38ed1739"));
    assert!(tags.contains(TxTag::Swap));
    assert!(tags.contains(TxTag::Liquidation));
    assert_eq!(tags.len(), 2);
}

#[test]
fn classification_is_idempotent() {
    let tagger = TxNatureTagger::new();
    let inputs = [
        (U256::exp10(18), ""),
        (U256::zero(), "38ed1739"),
        (U256::zero(), "ea8a1af0"),
        (U256::one(), "deadbeef"),
    ];
    for (value, input) in inputs {
        let tx = tx(value, input);
        assert_eq!(tagger.tag(&tx), tagger.tag(&tx));
    }
}
