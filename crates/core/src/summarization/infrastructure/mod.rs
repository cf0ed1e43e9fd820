pub mod ollama_engine;
