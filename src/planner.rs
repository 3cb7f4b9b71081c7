//! Clarifying question planner
//!
//! Asks the model for a warm acknowledgment followed by 3-4 questions tuned to
//! the goal's intent, one per line.

use crate::error::AdvisorError;
use crate::llm::{with_persona, LanguageModel};
use crate::models::Intent;
use crate::Result;
use tracing::{debug, info};

/// Phrases that make a line a request for information even without a `?`.
/// Each cue starts at a word boundary.
const REQUEST_CUES: &[&str] = &[
    " please", " tell me", " let me know", " could you", " can you", " would you",
    " share ", " describe", " like to know", " love to know", " what ", " how ",
    " which ", " when ", " do you", " are you",
];

/// True when a line asks the user for something.
fn asks_for_input(line: &str) -> bool {
    if line.contains('?') {
        return true;
    }

    let lowered = format!(" {}", line.to_lowercase());
    REQUEST_CUES.iter().any(|cue| lowered.contains(cue))
}

/// Parsed planner reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPlan {
    /// First non-empty line, shown to the user straight away
    pub opening: String,
    /// Remaining lines, in order
    pub queued: Vec<String>,
}

impl QuestionPlan {
    /// Split a reply into trimmed, non-empty lines. The first line becomes the
    /// opening and the other N-1 lines are queued.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let mut lines = reply
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        let opening = lines.next().ok_or_else(|| {
            AdvisorError::EmptyGeneration("question planner returned no lines".to_string())
        })?;

        Ok(Self {
            opening,
            queued: lines.collect(),
        })
    }

    /// True when the opening line asks something on its own, either as a
    /// question or as a request ("Please tell me your age.").
    pub fn opening_asks(&self) -> bool {
        asks_for_input(&self.opening)
    }

    /// Questions the user will answer, in order.
    ///
    /// A bare acknowledgment is not a question, so the round is the N-1 queued
    /// lines. An opening that already asks (acknowledgment plus first question)
    /// is the first question, so the round holds all N lines rather than N-1;
    /// otherwise its answer would be paired with the wrong question.
    pub fn questions(&self) -> Vec<String> {
        let mut questions = Vec::with_capacity(self.queued.len() + 1);
        if self.opening_asks() {
            questions.push(self.opening.clone());
        }
        questions.extend(self.queued.iter().cloned());
        questions
    }

    /// Message that starts the question round.
    pub fn opening_message(&self) -> String {
        match self.queued.first() {
            Some(first) if !self.opening_asks() => format!("{}\n\n{}", self.opening, first),
            _ => self.opening.clone(),
        }
    }
}

pub struct QuestionPlanner;

impl QuestionPlanner {
    pub fn build_prompt(goal: &str, intent: &Intent) -> String {
        format!(
            r#"The user's goal is '{}', which falls under the category of '{}'.
Acknowledge their goal in a friendly and encouraging tone.
Then, generate 3-4 essential, non-redundant questions to understand their situation better.
- For 'Saving/Investing' or 'Retirement', ALWAYS ask about their risk tolerance (Low, Medium, High).
- For 'Debt Management', ask about the type of loan and their existing financial commitments.
- For 'Budgeting/Expense Control', ask about their main challenge (e.g., overspending, not knowing where money goes).
Return ONLY the friendly acknowledgment followed by the questions, each on a new line.
The first line must be the acknowledgment alone and must not ask anything.
Every following line must be exactly one question.
Example: "That's a great goal! To help you with that, I have a few questions...""#,
            goal, intent
        )
    }

    pub async fn plan(model: &dyn LanguageModel, goal: &str, intent: &Intent) -> Result<QuestionPlan> {
        let prompt = with_persona(&Self::build_prompt(goal, intent));
        let reply = model.complete(&prompt).await?;

        let plan = QuestionPlan::from_reply(&reply)?;
        if plan.questions().is_empty() {
            return Err(AdvisorError::EmptyGeneration(
                "question planner returned an acknowledgment without questions".to_string(),
            ));
        }

        debug!(opening = %plan.opening, queued = plan.queued.len(), "Parsed question plan");
        info!(intent = %intent, questions = plan.questions().len(), "Question round planned");

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;

    #[test]
    fn test_n_lines_queue_n_minus_one() {
        let reply = "\n  That's a great goal!  \n\nWhat is your age?\n  \nWhen do you want to retire?\nWhat is your risk tolerance?\n";
        let plan = QuestionPlan::from_reply(reply).unwrap();
        assert_eq!(plan.opening, "That's a great goal!");
        assert_eq!(plan.queued.len(), 3);
        assert_eq!(plan.queued[0], "What is your age?");
    }

    #[test]
    fn test_empty_reply_fails() {
        assert!(matches!(
            QuestionPlan::from_reply(" \n\n  "),
            Err(AdvisorError::EmptyGeneration(_))
        ));
    }

    #[test]
    fn test_bare_acknowledgment_is_joined_with_first_question() {
        let plan = QuestionPlan::from_reply("Great goal! I have a few questions.\nQ1?\nQ2?").unwrap();
        assert_eq!(plan.opening_message(), "Great goal! I have a few questions.\n\nQ1?");
        assert_eq!(plan.questions(), vec!["Q1?", "Q2?"]);
    }

    #[test]
    fn test_combined_opening_counts_as_first_question() {
        let plan = QuestionPlan::from_reply("Great goal! How old are you?\nQ2?\nQ3?").unwrap();
        assert_eq!(plan.opening_message(), "Great goal! How old are you?");
        assert_eq!(plan.questions(), vec!["Great goal! How old are you?", "Q2?", "Q3?"]);
    }

    #[test]
    fn test_imperative_opening_counts_as_first_question() {
        let plan = QuestionPlan::from_reply(
            "Great goal! Please tell me your current age.\nWhat is your risk tolerance?\nWhen do you want to retire?",
        )
        .unwrap();
        assert!(plan.opening_asks());
        assert_eq!(plan.opening_message(), "Great goal! Please tell me your current age.");
        assert_eq!(
            plan.questions(),
            vec![
                "Great goal! Please tell me your current age.",
                "What is your risk tolerance?",
                "When do you want to retire?",
            ]
        );
    }

    #[test]
    fn test_acknowledgment_detection() {
        assert!(!asks_for_input("That's a great goal! To help you with that, I have a few questions..."));
        assert!(!asks_for_input("Wonderful, planning ahead pays off."));
        assert!(!asks_for_input("Thanks for showing initiative, I'm glad you shared this."));
        assert!(asks_for_input("Could you share your monthly income."));
        assert!(asks_for_input("I'd love to know your current savings."));
    }

    #[test]
    fn test_prompt_mentions_intent_rules() {
        let prompt = QuestionPlanner::build_prompt("pay off my card", &Intent::DebtManagement);
        assert!(prompt.contains("'pay off my card'"));
        assert!(prompt.contains("category of 'Debt Management'"));
        assert!(prompt.contains("risk tolerance"));
        assert!(prompt.contains("first line must be the acknowledgment alone"));
    }

    #[tokio::test]
    async fn test_acknowledgment_only_reply_is_rejected() {
        let model = ScriptedModel::with_replies(["Sounds great!"]);
        let result = QuestionPlanner::plan(&model, "save", &Intent::SavingInvesting).await;
        assert!(matches!(result, Err(AdvisorError::EmptyGeneration(_))));
    }
}
