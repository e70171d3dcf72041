/// Everything that can go wrong while building or using a code.
///
/// Symbols are carried in their `Debug` rendering so the error type does
/// not depend on the symbol type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("cannot build a code from an empty weight table")]
    EmptyInput,

    #[error("symbol {symbol} appears more than once in the weight table")]
    DuplicateSymbol { symbol: String },

    #[error("total weight does not fit in a u64")]
    WeightOverflow,

    #[error("code {code} is assigned to more than one symbol")]
    DuplicateCode { code: String },

    #[error("code {code} is a prefix of another code")]
    NotPrefixFree { code: String },

    #[error("symbol {symbol} has an empty code")]
    EmptyCode { symbol: String },

    #[error("unknown symbol {symbol} at position {position}")]
    UnknownSymbol { symbol: String, position: usize },

    #[error("no code matches the input at bit {position}")]
    NoMatchingCode { position: usize },

    #[error("invalid binary digit {found:?} at position {position}")]
    InvalidDigit { found: char, position: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
