pub mod adapter;
pub mod encoding;
pub mod error;
pub mod substitution;

pub use adapter::{Host, PipelineAdapter, Tokenized};
pub use encoding::Encoding;
pub use error::{BridgeError, BridgeResult, HydrationMiss};
pub use substitution::{hydrate, tokenize, Hydrated, Restore};
