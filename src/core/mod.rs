pub mod config;
pub mod corpus;
pub mod fallback;
pub mod llm;
pub mod pipeline;
pub mod post;
pub mod themes;
