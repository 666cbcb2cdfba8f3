use crate::calldata_decoder::{decode_call, known_calls, DecodedCall};
use ethernity_core::types::PendingTransaction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Natureza atribuída a uma transação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxTag {
    EthTransfer,
    Swap,
    Liquidation,
    LiquidityOp,
}

impl TxTag {
    pub const ALL: [TxTag; 4] = [
        TxTag::EthTransfer,
        TxTag::Swap,
        TxTag::Liquidation,
        TxTag::LiquidityOp,
    ];

    fn bit(self) -> u8 {
        match self {
            TxTag::EthTransfer => 1,
            TxTag::Swap => 1 << 1,
            TxTag::Liquidation => 1 << 2,
            TxTag::LiquidityOp => 1 << 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxTag::EthTransfer => "eth-transfer",
            TxTag::Swap => "swap",
            TxTag::Liquidation => "liquidation",
            TxTag::LiquidityOp => "liquidity-op",
        }
    }
}

impl fmt::Display for TxTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conjunto de tags. As tags não são exclusivas entre si; conjunto vazio
/// significa transação desconhecida.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TxTags(u8);

impl TxTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: TxTag) {
        self.0 |= tag.bit();
    }

    pub fn contains(&self, tag: TxTag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = TxTag> + '_ {
        TxTag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }
}

impl FromIterator<TxTag> for TxTags {
    fn from_iter<I: IntoIterator<Item = TxTag>>(iter: I) -> Self {
        let mut tags = TxTags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl fmt::Display for TxTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("unknown");
        }
        let names: Vec<_> = self.iter().map(TxTag::as_str).collect();
        f.write_str(&names.join("+"))
    }
}

/// Transação com suas tags e a chamada decodificada, se houver
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTx {
    pub tx: PendingTransaction,
    pub tags: TxTags,
    pub call: Option<DecodedCall>,
}

impl ClassifiedTx {
    /// Nome da função reconhecida
    pub fn function_name(&self) -> Option<&'static str> {
        self.call.as_ref().map(|c| c.call.name)
    }
}

/// Tagger responsável por inferir a natureza de uma transação.
///
/// Cada tag é calculada de forma independente: um seletor registrado em
/// mais de uma tabela recebe todas as tags correspondentes.
pub struct TxNatureTagger {
    selectors: HashMap<[u8; 4], Vec<TxTag>>,
}

impl Default for TxNatureTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl TxNatureTagger {
    /// Cria um tagger com as tabelas de seletores conhecidos
    pub fn new() -> Self {
        let mut selectors: HashMap<[u8; 4], Vec<TxTag>> = HashMap::new();
        for call in known_calls() {
            selectors.entry(call.selector).or_default().push(call.tag);
        }
        Self { selectors }
    }

    /// Registra um seletor extra em uma tabela
    pub fn with_selector(mut self, selector: [u8; 4], tag: TxTag) -> Self {
        let tags = self.selectors.entry(selector).or_default();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        self
    }

    /// Calcula apenas o conjunto de tags
    pub fn tags(&self, tx: &PendingTransaction) -> TxTags {
        let mut tags = TxTags::new();

        if !tx.value.is_zero() && tx.has_empty_input() {
            tags.insert(TxTag::EthTransfer);
        }

        if let Some(found) = tx.selector().and_then(|sel| self.selectors.get(&sel)) {
            for tag in found {
                tags.insert(*tag);
            }
        }

        tags
    }

    /// Classifica a transação e decodifica a chamada reconhecida
    pub fn tag(&self, tx: &PendingTransaction) -> ClassifiedTx {
        ClassifiedTx {
            tx: tx.clone(),
            tags: self.tags(tx),
            call: decode_call(tx.input.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_operations() {
        let mut tags = TxTags::new();
        assert!(tags.is_empty());
        assert_eq!(tags.to_string(), "unknown");

        tags.insert(TxTag::Swap);
        tags.insert(TxTag::Liquidation);
        tags.insert(TxTag::Swap);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains(TxTag::Liquidation));
        assert!(!tags.contains(TxTag::EthTransfer));
        assert_eq!(tags.to_string(), "swap+liquidation");

        let collected: TxTags = [TxTag::LiquidityOp, TxTag::EthTransfer].into_iter().collect();
        assert_eq!(collected.iter().collect::<Vec<_>>(), vec![TxTag::EthTransfer, TxTag::LiquidityOp]);
    }
}
