/*!
 * Ethernity Detector MEV
 *
 * Classificação de transações pendentes, estimativa heurística de
 * oportunidades MEV em seis categorias e o pipeline que as conduz a partir
 * da inscrição na mempool.
 */

pub mod calldata_decoder;
pub mod tx_nature_tagger;
pub mod opportunity;
pub mod mev_params;
pub mod opportunity_detector;
pub mod traits;
pub mod events;
pub mod run_aggregator;
pub mod reporter;
pub mod mempool_supervisor;

pub use calldata_decoder::{decode_call, AmountField, DecodedCall, KnownCall};
pub use tx_nature_tagger::*;
pub use opportunity::*;
pub use mev_params::*;
pub use opportunity_detector::*;
pub use traits::*;
pub use events::*;
pub use run_aggregator::*;
pub use reporter::*;
pub use mempool_supervisor::*;
