pub mod config;
pub mod customer;
pub mod money;
pub mod sale;
pub mod vocab;

pub use config::{ConfigError, DbCredentials, EtlConfig};
pub use customer::{CleanCustomer, RawCustomer};
pub use money::{parse_amount, Money};
pub use sale::{CategoryRow, CleanSale, ProductRow, RawSale};
pub use vocab::{
    CategoryPattern, CategoryVocabulary, EmailRules, GenderMap, NameCorrections,
    ProductVocabulary, Vocabulary, VocabularyEntry, VocabularyError,
};
