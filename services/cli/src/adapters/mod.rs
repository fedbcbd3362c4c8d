pub mod db;
pub mod extract;
pub mod generation_llm;

pub use db::DbAdapter;
pub use extract::FileTextExtractor;
pub use generation_llm::OpenAiGenerationAdapter;
