// Shared prompt fragments for retrieval-grounded questions.
// Analysis-specific instructions live in analysis/prompts.rs.

/// System prompt for answering a query from retrieved context.
pub const CONTEXT_QA_SYSTEM: &str = "You are an expert resume reviewer and career advisor. \
    Always answer the query using the provided context information, and not prior knowledge. \
    Never directly reference the given context in your answer. \
    Avoid statements like 'Based on the context' or 'The context information'.";

/// Context QA template. Replace `{context}` and `{query}` before sending.
pub const CONTEXT_QA_TEMPLATE: &str = "Context information is below.
---------------------
{context}
---------------------
Given the context information and not prior knowledge, answer the query.
Query: {query}
Answer: ";

/// Fills the context QA template. The query goes in first so braces inside
/// uploaded text are never treated as placeholders.
pub fn context_qa_prompt(context: &str, query: &str) -> String {
    CONTEXT_QA_TEMPLATE
        .replace("{query}", query)
        .replace("{context}", context)
}
