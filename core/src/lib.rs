pub mod corpus;
pub mod index;
pub mod search;
pub mod tokenizer;

pub use corpus::{load_problems, DocId, Problem};
pub use index::VectorIndex;
pub use search::{search, Hit, MAX_RESULTS};
