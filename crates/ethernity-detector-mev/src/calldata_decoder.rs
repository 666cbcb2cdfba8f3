//! Tabela de chamadas conhecidas indexada por seletor.
//!
//! Cada entrada declara a lista de parâmetros ABI e onde está o montante
//! negociado. Seletores fora da tabela nunca são decodificados.

use crate::tx_nature_tagger::TxTag;
use ethers::abi::{self, ParamType, Token};
use ethers::types::U256;

/// Onde o montante fica dentro dos parâmetros decodificados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    /// Montante vem do `value` da transação, não do calldata
    NativeValue,
    /// Parâmetro de topo na posição indicada
    Param(usize),
    /// Campo `field` da tupla na posição `param`
    TupleField { param: usize, field: usize },
    /// Maior entre os parâmetros indicados
    LargestOf(&'static [usize]),
}

/// Assinatura conhecida de uma função de DEX, lending ou liquidez
#[derive(Debug)]
pub struct KnownCall {
    pub selector: [u8; 4],
    pub name: &'static str,
    pub tag: TxTag,
    params: fn() -> Vec<ParamType>,
    pub amount: AmountField,
}

impl KnownCall {
    /// Lista de parâmetros ABI declarada para a chamada
    pub fn param_types(&self) -> Vec<ParamType> {
        (self.params)()
    }
}

/// Chamada reconhecida e decodificada
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCall {
    pub call: &'static KnownCall,
    /// Vazio quando o calldata não corresponde à assinatura declarada
    pub tokens: Vec<Token>,
    /// Montante bruto; `None` quando desconhecido
    pub amount: Option<U256>,
}

impl PartialEq for KnownCall {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector && self.name == other.name
    }
}

fn v2_tokens_in() -> Vec<ParamType> {
    // (amountA, amountB, path, to, deadline)
    vec![
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Array(Box::new(ParamType::Address)),
        ParamType::Address,
        ParamType::Uint(256),
    ]
}

fn v2_native_in() -> Vec<ParamType> {
    // (amountOut, path, to, deadline)
    vec![
        ParamType::Uint(256),
        ParamType::Array(Box::new(ParamType::Address)),
        ParamType::Address,
        ParamType::Uint(256),
    ]
}

fn v3_single() -> Vec<ParamType> {
    // (tokenIn, tokenOut, fee, recipient, deadline, amountA, amountB, sqrtPriceLimitX96)
    vec![ParamType::Tuple(vec![
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(24),
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(160),
    ])]
}

fn v3_path() -> Vec<ParamType> {
    // (path, recipient, deadline, amountA, amountB)
    vec![ParamType::Tuple(vec![
        ParamType::Bytes,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
    ])]
}

fn pair_swap() -> Vec<ParamType> {
    vec![
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Bytes,
    ]
}

fn liquidate_borrow() -> Vec<ParamType> {
    // (borrower, repayAmount, cTokenCollateral)
    vec![ParamType::Address, ParamType::Uint(256), ParamType::Address]
}

fn liquidation_call() -> Vec<ParamType> {
    // (collateralAsset, debtAsset, user, debtToCover, receiveAToken)
    vec![
        ParamType::Address,
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Bool,
    ]
}

fn no_params() -> Vec<ParamType> {
    Vec::new()
}

fn add_liquidity() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Uint(256),
    ]
}

fn add_liquidity_native() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Uint(256),
    ]
}

fn v3_mint() -> Vec<ParamType> {
    vec![ParamType::Tuple(vec![
        ParamType::Address,
        ParamType::Address,
        ParamType::Uint(24),
        ParamType::Int(24),
        ParamType::Int(24),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Uint(256),
        ParamType::Address,
        ParamType::Uint(256),
    ])]
}

fn v3_increase_liquidity() -> Vec<ParamType> {
    vec![ParamType::Tuple(vec![ParamType::Uint(256); 6])]
}

static KNOWN_CALLS: &[KnownCall] = &[
    // Uniswap V2 router
    KnownCall {
        selector: [0x7f, 0xf3, 0x6a, 0xb5],
        name: "swapExactETHForTokens",
        tag: TxTag::Swap,
        params: v2_native_in,
        amount: AmountField::NativeValue,
    },
    KnownCall {
        selector: [0xfb, 0x3b, 0xdb, 0x41],
        name: "swapETHForExactTokens",
        tag: TxTag::Swap,
        params: v2_native_in,
        amount: AmountField::NativeValue,
    },
    KnownCall {
        selector: [0x18, 0xcb, 0xaf, 0xe5],
        name: "swapExactTokensForETH",
        tag: TxTag::Swap,
        params: v2_tokens_in,
        amount: AmountField::Param(0),
    },
    KnownCall {
        selector: [0x4a, 0x25, 0xd9, 0x4a],
        name: "swapTokensForExactETH",
        tag: TxTag::Swap,
        params: v2_tokens_in,
        amount: AmountField::Param(1),
    },
    KnownCall {
        selector: [0x38, 0xed, 0x17, 0x39],
        name: "swapExactTokensForTokens",
        tag: TxTag::Swap,
        params: v2_tokens_in,
        amount: AmountField::Param(0),
    },
    KnownCall {
        selector: [0x88, 0x03, 0xdb, 0xee],
        name: "swapTokensForExactTokens",
        tag: TxTag::Swap,
        params: v2_tokens_in,
        amount: AmountField::Param(1),
    },
    // Uniswap V3 router
    KnownCall {
        selector: [0x41, 0x4b, 0xf3, 0x89],
        name: "exactInputSingle",
        tag: TxTag::Swap,
        params: v3_single,
        amount: AmountField::TupleField { param: 0, field: 5 },
    },
    KnownCall {
        selector: [0xc0, 0x4b, 0x8d, 0x59],
        name: "exactInput",
        tag: TxTag::Swap,
        params: v3_path,
        amount: AmountField::TupleField { param: 0, field: 3 },
    },
    KnownCall {
        selector: [0xdb, 0x3e, 0x21, 0x98],
        name: "exactOutputSingle",
        tag: TxTag::Swap,
        params: v3_single,
        amount: AmountField::TupleField { param: 0, field: 6 },
    },
    KnownCall {
        selector: [0xf2, 0x8c, 0x04, 0x98],
        name: "exactOutput",
        tag: TxTag::Swap,
        params: v3_path,
        amount: AmountField::TupleField { param: 0, field: 4 },
    },
    // Par V2 chamado diretamente
    KnownCall {
        selector: [0x02, 0x2c, 0x0d, 0x9f],
        name: "swap",
        tag: TxTag::Swap,
        params: pair_swap,
        amount: AmountField::LargestOf(&[0, 1]),
    },
    // Lending
    KnownCall {
        selector: [0x29, 0x86, 0xc0, 0xe5],
        name: "liquidateBorrow",
        tag: TxTag::Liquidation,
        params: liquidate_borrow,
        amount: AmountField::Param(1),
    },
    KnownCall {
        selector: [0xea, 0x8a, 0x1a, 0xf0],
        name: "liquidationCall",
        tag: TxTag::Liquidation,
        params: liquidation_call,
        amount: AmountField::Param(3),
    },
    KnownCall {
        selector: [0xdb, 0x00, 0x5a, 0x1c],
        name: "liquidate",
        tag: TxTag::Liquidation,
        params: no_params,
        amount: AmountField::NativeValue,
    },
    // Liquidez
    KnownCall {
        selector: [0xe8, 0xe3, 0x37, 0x00],
        name: "addLiquidity",
        tag: TxTag::LiquidityOp,
        params: add_liquidity,
        amount: AmountField::Param(2),
    },
    KnownCall {
        selector: [0xf3, 0x05, 0xd7, 0x19],
        name: "addLiquidityETH",
        tag: TxTag::LiquidityOp,
        params: add_liquidity_native,
        amount: AmountField::Param(1),
    },
    KnownCall {
        selector: [0x88, 0x31, 0x64, 0x56],
        name: "mint",
        tag: TxTag::LiquidityOp,
        params: v3_mint,
        amount: AmountField::TupleField { param: 0, field: 5 },
    },
    KnownCall {
        selector: [0x21, 0x9f, 0x5d, 0x17],
        name: "increaseLiquidity",
        tag: TxTag::LiquidityOp,
        params: v3_increase_liquidity,
        amount: AmountField::TupleField { param: 0, field: 1 },
    },
];

/// Todas as chamadas conhecidas
pub fn known_calls() -> &'static [KnownCall] {
    KNOWN_CALLS
}

/// Busca a entrada da tabela para um seletor
pub fn lookup(selector: [u8; 4]) -> Option<&'static KnownCall> {
    KNOWN_CALLS.iter().find(|call| call.selector == selector)
}

/// Decodifica o calldata de uma chamada conhecida.
///
/// Seletor desconhecido retorna `None`. Calldata truncado ou inválido para
/// um seletor conhecido retorna a chamada sem tokens e sem montante.
pub fn decode_call(input: &[u8]) -> Option<DecodedCall> {
    if input.len() < 4 {
        return None;
    }
    let call = lookup([input[0], input[1], input[2], input[3]])?;

    let tokens = match abi::decode(&call.param_types(), &input[4..]) {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::trace!(function = call.name, "Calldata não corresponde à assinatura: {}", e);
            return Some(DecodedCall { call, tokens: Vec::new(), amount: None });
        }
    };
    let amount = extract_amount(&tokens, call.amount);

    Some(DecodedCall { call, tokens, amount })
}

fn extract_amount(tokens: &[Token], field: AmountField) -> Option<U256> {
    match field {
        AmountField::NativeValue => None,
        AmountField::Param(index) => tokens.get(index)?.clone().into_uint(),
        AmountField::TupleField { param, field } => match tokens.get(param)? {
            Token::Tuple(fields) => fields.get(field)?.clone().into_uint(),
            _ => None,
        },
        AmountField::LargestOf(indexes) => indexes
            .iter()
            .filter_map(|i| tokens.get(*i).and_then(|t| t.clone().into_uint()))
            .max(),
    }
}
