use thiserror::Error;

/// Erros comuns da biblioteca Ethernity
#[derive(Error, Debug)]
pub enum Error {
    /// Erro de comunicação com o node Ethereum
    #[error("Erro de RPC: {0}")]
    RpcError(String),
    
    /// Erro de decodificação de dados
    #[error("Erro de decodificação: {0}")]
    DecodeError(String),
    
    /// Erro de codificação de dados
    #[error("Erro de codificação: {0}")]
    EncodeError(String),
    
    /// Erro de validação
    #[error("Erro de validação: {0}")]
    ValidationError(String),
    
    /// Erro de timeout
    #[error("Timeout: {0}")]
    TimeoutError(String),
    
    /// Recurso não encontrado
    #[error("Não encontrado: {0}")]
    NotFound(String),

    /// Falha ao abrir ou manter a conexão de streaming
    #[error("Erro de conexão: {0}")]
    ConnectionError(String),

    /// O node recusou ou não confirmou a inscrição
    #[error("Erro de inscrição: {0}")]
    SubscriptionError(String),

    /// Configuração inválida ou ilegível
    #[error("Erro de configuração: {0}")]
    ConfigError(String),
    
    /// Erro genérico
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Indica se o erro encerra a execução (perda do canal de streaming).
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConnectionError(_) | Error::SubscriptionError(_))
    }
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;
