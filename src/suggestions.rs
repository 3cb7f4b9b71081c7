//! Suggestion synthesis
//!
//! Builds the suggestion prompt from the gathered context and parses the
//! model's reply into unique (title, explanation) pairs.

use crate::error::AdvisorError;
use crate::llm::{with_persona, LanguageModel};
use crate::models::{Intent, ReferenceData, Suggestion};
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info};

lazy_static! {
    static ref ORDINAL_PREFIX: Regex = Regex::new(r"^\s*\d+(?:[.)]\s*|\s+)").unwrap();
}

pub struct SuggestionSynthesizer;

impl SuggestionSynthesizer {
    pub fn build_prompt(
        context_summary: &str,
        intent: &Intent,
        reference: Option<&ReferenceData>,
    ) -> String {
        let mut prompt = format!(
            r#"Based on the user's situation summarized below, provide a diverse list of 4-5 actionable suggestions.
The user's intent is '{}'. Your suggestions must be highly relevant to this intent.
Write each suggestion on its own line as "Title: explanation".

- If 'Budgeting/Expense Control', suggest concrete strategies like the '50/30/20 rule', 'envelope system', or recommend types of budgeting apps.
- If 'Debt Management', use the static bank info provided below to suggest loan types, and also mention strategies like 'debt snowball' or 'debt avalanche'.
- If 'Saving/Investing' or 'Retirement', provide a mix of options that match the user's stated risk tolerance. Use real-world examples like 'Nifty 50 Index Fund' or 'Public Provident Fund'.

User Context:
{}"#,
            intent, context_summary
        );

        if let Some(data) = reference {
            prompt.push_str("\nStatic Reference Data (Use this for examples):\n");
            prompt.push_str(&data.to_prompt_block());
        }

        prompt
    }

    pub async fn synthesize(
        model: &dyn LanguageModel,
        context_summary: &str,
        intent: &Intent,
        reference: Option<&ReferenceData>,
    ) -> Result<Vec<Suggestion>> {
        let prompt = with_persona(&Self::build_prompt(context_summary, intent, reference));
        let reply = model.complete(&prompt).await?;

        if reply.trim().is_empty() {
            return Err(AdvisorError::EmptyGeneration(
                "suggestion synthesis returned no text".to_string(),
            ));
        }

        let suggestions = parse_unique_suggestions(&reply);
        info!(
            intent = %intent,
            count = suggestions.len(),
            with_reference = reference.is_some(),
            "Suggestions synthesized"
        );

        Ok(suggestions)
    }
}

/// Parse "Title: explanation" lines, deduplicating titles case-insensitively.
///
/// Lines without a colon are skipped. A leading ordinal (`1.`, `2)`, `3 `) is
/// removed from the title; digits that are part of the title itself
/// ("50/30/20 Rule", "401k Plan") are kept. The first occurrence of a title wins.
pub fn parse_unique_suggestions(text: &str) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let mut seen = HashSet::new();

    for line in text.lines() {
        let Some((title_part, explanation)) = line.split_once(':') else {
            continue;
        };

        let title = ORDINAL_PREFIX.replace(title_part, "").trim().to_string();
        if title.is_empty() {
            continue;
        }

        if !seen.insert(title.to_lowercase()) {
            debug!(title = %title, "Dropping duplicate suggestion");
            continue;
        }

        suggestions.push(Suggestion {
            title,
            explanation: explanation.trim().to_string(),
        });
    }

    suggestions
}
