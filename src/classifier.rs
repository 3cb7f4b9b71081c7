//! Intent Classifier
//!
//! Asks the model to place a goal into one of six categories:
//! - Four finance domains that lead to a clarifying-question round
//! - General Inquiry / Out of Domain, which send the user back to goal entry

use crate::error::AdvisorError;
use crate::llm::{with_persona, LanguageModel};
use crate::models::Intent;
use crate::Result;
use tracing::{info, warn};

/// Category list with examples, in the order shown to the model
const CATEGORIES: &[(&str, &str)] = &[
    (
        "Saving/Investing",
        "'save for a house', 'invest 10k', 'buy stocks'",
    ),
    (
        "Debt Management",
        "'get a home loan', 'pay off my credit card', 'loan options'",
    ),
    (
        "Budgeting/Expense Control",
        "'reduce my expenses', 'create a budget', 'track my spending'",
    ),
    (
        "Retirement Planning",
        "'plan for retirement', 'retire at 50'",
    ),
];

pub struct IntentClassifier;

impl IntentClassifier {
    pub fn build_prompt(goal: &str) -> String {
        let mut prompt = String::from(
            "Analyze the user's financial goal below and classify it into ONE of the following categories:\n",
        );

        for (name, examples) in CATEGORIES {
            prompt.push_str(&format!("- {} (e.g., {})\n", name, examples));
        }
        prompt.push_str("- General Inquiry (if it's a simple greeting or doesn't fit elsewhere)\n");
        prompt.push_str(
            "- Out of Domain (if it's clearly not about personal finance, like 'how to cook pasta')\n",
        );

        prompt.push_str(&format!(
            "\nUser's Goal: \"{}\"\n\nReturn only the category name and nothing else.",
            goal
        ));

        prompt
    }

    /// Classify a goal.
    ///
    /// Gateway failures and blank answers are errors; any non-blank answer is
    /// accepted, falling back to `Intent::Other` for unrecognised text.
    pub async fn classify(model: &dyn LanguageModel, goal: &str) -> Result<Intent> {
        let prompt = with_persona(&Self::build_prompt(goal));

        let raw = model.complete(&prompt).await.map_err(|e| {
            warn!("Intent classification failed: {}", e);
            e
        })?;

        if raw.trim().is_empty() {
            return Err(AdvisorError::EmptyGeneration(
                "classifier returned no category".to_string(),
            ));
        }

        let intent = Intent::from_model_output(&raw);
        if let Intent::Other(ref label) = intent {
            warn!(label = %label, "Classifier returned an unrecognised category");
        }
        info!(intent = %intent, "Goal classified");

        Ok(intent)
    }
}
