// Resume analysis: the fixed prompts, the retrieval query engine and the per-request pipeline.
// All LLM calls go through llm_client.

pub mod engine;
pub mod form;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
