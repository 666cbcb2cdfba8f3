/*!
 * Ethernity Utils
 * 
 * Utilitários comuns usados em toda a workspace Ethernity
 */

use ethereum_types::{Address, H256, U256};
use std::str::FromStr;

/// Número de wei em uma unidade nativa
pub const WEI_PER_NATIVE: f64 = 1e18;

/// Converte uma string hexadecimal para Address
pub fn hex_to_address(hex: &str) -> Option<Address> {
    let hex_str = hex.strip_prefix("0x").unwrap_or(hex);
    Address::from_str(hex_str).ok()
}

/// Converte uma string hexadecimal para H256
pub fn hex_to_h256(hex: &str) -> Option<H256> {
    let hex_str = hex.strip_prefix("0x").unwrap_or(hex);
    H256::from_str(hex_str).ok()
}

/// Formata um Address para exibição
pub fn format_address(address: &Address) -> String {
    format!("0x{:x}", address)
}

/// Formata um H256 para exibição
pub fn format_h256(hash: &H256) -> String {
    format!("0x{:x}", hash)
}

/// Formata um seletor de função para exibição
pub fn format_selector(selector: &[u8; 4]) -> String {
    format!(
        "0x{:02x}{:02x}{:02x}{:02x}",
        selector[0], selector[1], selector[2], selector[3]
    )
}

/// Converte U256 em f64 aceitando perda de precisão
pub fn u256_to_f64_lossy(value: &U256) -> f64 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    let mut result = 0f64;
    for &b in &bytes {
        result = result * 256f64 + b as f64;
    }
    result
}

/// Converte um valor em wei para unidades nativas (18 casas)
pub fn wei_to_native(wei: &U256) -> f64 {
    u256_to_f64_lossy(wei) / WEI_PER_NATIVE
}

/// Custo de gas em unidades nativas para um preço em wei e um limite de gas
pub fn gas_cost_native(gas_price_wei: &U256, gas_limit: u64) -> f64 {
    u256_to_f64_lossy(gas_price_wei) * gas_limit as f64 / WEI_PER_NATIVE
}
