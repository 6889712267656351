pub mod arithmetic;
pub mod error;
pub mod metric;
pub mod payload;
pub mod traits;
pub mod types;

pub use error::*;
pub use metric::*;
pub use payload::ProviderPayloads;
pub use traits::*;
pub use types::*;
