//! Reference-document search tool
//!
//! Lets personas quote the document a debate was given instead of arguing
//! from memory. Search is paragraph-based: the query is reduced to
//! keywords, paragraphs are scored by how many distinct keywords they
//! contain (case-insensitive substring match), and the top passages are
//! returned trimmed to a fixed excerpt budget.

use agora_application::ports::tool_executor::ToolContext;
use agora_domain::core::string::truncate;
use agora_domain::memory::keywords;
use agora_domain::tool::{ToolCall, ToolDefinition, ToolError, ToolParameter};

use super::registry::DebateTool;

pub const DOCUMENT_SEARCH: &str = "document_search";

/// Most passages returned per query
const MAX_PASSAGES: usize = 3;
/// Byte budget per returned passage
const PASSAGE_BUDGET: usize = 400;

/// Tool definition for document search
pub fn document_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        DOCUMENT_SEARCH,
        "Search the debate's reference document for passages matching a query. \
         Returns the most relevant passages.",
    )
    .with_parameter(ToolParameter::new(
        "query",
        "Keywords to look for in the document",
        true,
    ))
}

pub struct DocumentSearch;

impl DebateTool for DocumentSearch {
    fn definition(&self) -> ToolDefinition {
        document_search_definition()
    }

    fn execute(&self, call: &ToolCall, context: &ToolContext) -> Result<String, ToolError> {
        let query = call
            .require_str("query")
            .map_err(ToolError::invalid_argument)?;
        let Some(document) = context.document.as_deref() else {
            return Err(ToolError::execution_failed(
                "No reference document was provided for this debate",
            ));
        };
        Ok(search(document, query))
    }
}

/// Score paragraphs against the query and format the best matches.
pub fn search(document: &str, query: &str) -> String {
    // Queries made entirely of short words ("a tax", "CO2") produce no
    // keywords; fall back to matching the raw query text.
    let mut terms = keywords(query);
    if terms.is_empty() {
        let raw = query.trim().to_lowercase();
        if raw.is_empty() {
            return format!("No passages matched \"{query}\".");
        }
        terms.push(raw);
    }

    let mut scored: Vec<(usize, usize, &str)> = Vec::new();
    for (index, paragraph) in document.split("\n\n").enumerate() {
        let text = paragraph.trim();
        if text.is_empty() {
            continue;
        }
        let lowered = text.to_lowercase();
        let score = terms.iter().filter(|t| lowered.contains(t.as_str())).count();
        if score > 0 {
            scored.push((score, index, text));
        }
    }

    if scored.is_empty() {
        return format!("No passages matched \"{query}\".");
    }

    // Best score first; earlier paragraphs win ties.
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    scored
        .iter()
        .take(MAX_PASSAGES)
        .enumerate()
        .map(|(rank, (_, _, text))| format!("[passage {}] {}", rank + 1, truncate(text, PASSAGE_BUDGET)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ==================== Document Search Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "The proposed tram line would connect the harbour to the university.\n\n\
        Ridership projections estimate 12,000 daily passengers by the third year, \
        assuming fares stay below two euros.\n\n\
        Funding comes from a mix of municipal bonds and a small increase in parking taxes.\n\n\
        Critics argue the projections overstate demand because the university is \
        already served by two bus routes.";

    #[test]
    fn test_paragraph_with_more_distinct_terms_ranks_first() {
        let result = search(DOCUMENT, "ridership projections");
        assert!(result.starts_with("[passage 1] Ridership projections estimate"));
        // The critics paragraph mentions projections once and comes second.
        assert!(result.contains("[passage 2] Critics argue"));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let result = search(DOCUMENT, "TRAM University");
        assert!(result.contains("[passage 1] The proposed tram line"));
    }

    #[test]
    fn test_short_query_falls_back_to_raw_text() {
        // "tax" is below the keyword length floor but still matches "taxes".
        let result = search(DOCUMENT, "tax");
        assert!(result.contains("municipal bonds"));
    }

    #[test]
    fn test_no_match_reports_the_query() {
        let result = search(DOCUMENT, "submarine");
        assert_eq!(result, "No passages matched \"submarine\".");
    }

    #[test]
    fn test_at_most_three_passages() {
        let result = search(DOCUMENT, "the");
        // "the" is short, so the fallback matches every paragraph; only
        // three come back.
        assert!(result.contains("[passage 3]"));
        assert!(!result.contains("[passage 4]"));
    }

    #[test]
    fn test_long_passages_are_truncated() {
        let long = format!("tram {}", "x".repeat(600));
        let result = search(&long, "tram");
        assert!(result.ends_with("..."));
        assert!(result.len() < 450);
    }

    #[test]
    fn test_execute_without_document_fails() {
        let tool = DocumentSearch;
        let context = ToolContext::new("Should the city build the tram line?");
        let call = ToolCall::new("c1", DOCUMENT_SEARCH).with_arg("query", "ridership");

        let err = tool.execute(&call, &context).unwrap_err();
        assert_eq!(err.code, "EXECUTION_FAILED");
        assert!(err.message.contains("No reference document"));
    }

    #[test]
    fn test_execute_with_document_searches_it() {
        let tool = DocumentSearch;
        let context = ToolContext::new("task").with_document(DOCUMENT);
        let call = ToolCall::new("c1", DOCUMENT_SEARCH).with_arg("query", "funding parking");

        let output = tool.execute(&call, &context).unwrap();
        assert!(output.contains("municipal bonds"));
    }
}
