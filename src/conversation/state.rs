//! Per-session conversation state
//!
//! One `ConversationState` backs exactly one conversation. The controller is
//! the only writer; readers (API snapshots, terminal progress) use the getters.

use crate::models::{ChatMessage, Intent, Suggestion};
use serde::Serialize;

/// Where the conversation currently is
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    AwaitingGoal,
    AskingQuestions,
    /// All answers are in but suggestions have not been delivered yet
    Suggesting,
    FollowUp,
}

/// A clarifying question and the user's answer, once given
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QuestionTurn {
    pub question: String,
    pub answer: Option<String>,
}

/// "Question k of n" while a question round is running
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationState {
    messages: Vec<ChatMessage>,
    goal: Option<String>,
    broad_intent: Option<Intent>,
    questions: Vec<QuestionTurn>,
    current_question_index: usize,
    conversation_complete: bool,
    suggestions: Vec<Suggestion>,
    phase: Phase,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    // =============================
    // Read access
    // =============================

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn broad_intent(&self) -> Option<&Intent> {
        self.broad_intent.as_ref()
    }

    pub fn questions(&self) -> &[QuestionTurn] {
        &self.questions
    }

    pub fn answers(&self) -> Vec<&str> {
        self.questions
            .iter()
            .filter_map(|t| t.answer.as_deref())
            .collect()
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn is_complete(&self) -> bool {
        self.conversation_complete
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> Option<Progress> {
        if self.phase != Phase::AskingQuestions || self.questions.is_empty() {
            return None;
        }

        Some(Progress {
            current: self.current_question_index + 1,
            total: self.questions.len(),
        })
    }

    /// Goal followed by every answered question, for the suggestion prompt.
    pub fn context_summary(&self) -> String {
        let mut summary = format!("Goal: {}\n", self.goal.as_deref().unwrap_or_default());

        for turn in &self.questions {
            if let Some(answer) = &turn.answer {
                summary.push_str(&format!("Q: {}\nA: {}\n", turn.question, answer));
            }
        }

        summary
    }

    // =============================
    // Transitions (controller only)
    // =============================

    pub(crate) fn push_user(&mut self, content: &str) {
        self.messages.push(ChatMessage::user(content));
    }

    pub(crate) fn push_assistant(&mut self, content: &str) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub(crate) fn set_goal(&mut self, goal: &str) {
        self.goal = Some(goal.to_string());
    }

    /// Drop the goal and intent and wait for a new goal.
    pub(crate) fn clear_goal(&mut self) {
        self.goal = None;
        self.broad_intent = None;
        self.phase = Phase::AwaitingGoal;
    }

    pub(crate) fn begin_questions(&mut self, intent: Intent, questions: Vec<String>) {
        self.broad_intent = Some(intent);
        self.questions = questions
            .into_iter()
            .map(|question| QuestionTurn {
                question,
                answer: None,
            })
            .collect();
        self.current_question_index = 0;
        self.conversation_complete = false;
        self.suggestions.clear();
        self.phase = Phase::AskingQuestions;
    }

    /// Record an answer to the current question.
    ///
    /// Returns the next question to ask, or `None` once the round is over, at
    /// which point the state moves to `Suggesting`.
    pub(crate) fn record_answer(&mut self, answer: &str) -> Option<String> {
        let turn = self.questions.get_mut(self.current_question_index)?;
        turn.answer = Some(answer.to_string());
        self.current_question_index += 1;

        if let Some(next) = self.questions.get(self.current_question_index) {
            return Some(next.question.clone());
        }

        if !self.conversation_complete {
            self.conversation_complete = true;
            self.phase = Phase::Suggesting;
        }
        None
    }

    pub(crate) fn finish_suggestions(&mut self, suggestions: Vec<Suggestion>) {
        self.suggestions = suggestions;
        self.questions.clear();
        self.current_question_index = 0;
        self.phase = Phase::FollowUp;
    }

    /// Wipe everything and start over.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
