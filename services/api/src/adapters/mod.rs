pub mod catalog;
pub mod seed;
pub mod story_llm;

pub use catalog::MemoryCatalog;
pub use story_llm::OpenAiStoryAdapter;
