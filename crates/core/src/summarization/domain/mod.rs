pub mod prompt_builder;
pub mod summarizer;
pub mod summary_format;
