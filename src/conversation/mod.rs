//! Conversation controller
//!
//! Drives one conversation through its phases:
//!
//! GOAL → CLASSIFY → QUESTIONS → SUGGEST → FOLLOW-UP
//!
//! Out-of-domain and general inputs go straight back to goal entry. Every
//! failure ends in a user-visible message and leaves the conversation resumable.

pub mod state;

pub use state::{ConversationState, Phase, Progress, QuestionTurn};

use crate::classifier::IntentClassifier;
use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::llm::{with_persona, GeminiClient, LanguageModel};
use crate::market::{MarketDataSource, NewsApiClient, NewsSource, YahooFinanceClient};
use crate::models::{Intent, NewsArticle, ReferenceData, StockPerformance, Suggestion};
use crate::planner::QuestionPlanner;
use crate::reference::reference_for;
use crate::suggestions::SuggestionSynthesizer;
use crate::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub const DECLINE_MESSAGE: &str = "I'm sorry, but I can only assist with personal finance topics like saving, loans, and budgeting. How can I help you with your finances?";
pub const GREETING_MESSAGE: &str = "Hello! I'm here to help you with your financial goals. What would you like to achieve? For example, you can tell me 'I want to save for a vacation' or 'I need to understand my loan options.'";
pub const FALLBACK_MESSAGE: &str = "I'm sorry, I couldn't process that. Could you try again?";
pub const REPHRASE_MESSAGE: &str = "I'm having a little trouble thinking of questions right now. Could you please rephrase your goal?";
pub const SUGGESTION_RETRY_MESSAGE: &str = "I couldn't put together suggestions just now. Send any message and I'll try again.";

const NEWS_LIMIT: usize = 3;

struct MarketSnapshot {
    source: Arc<dyn MarketDataSource>,
    tickers: Vec<String>,
    period: String,
}

pub struct ConversationController {
    model: Arc<dyn LanguageModel>,
    news: Arc<dyn NewsSource>,
    market: Option<MarketSnapshot>,
}

impl ConversationController {
    pub fn new(model: Arc<dyn LanguageModel>, news: Arc<dyn NewsSource>) -> Self {
        Self {
            model,
            news,
            market: None,
        }
    }

    /// Append a market snapshot for saving and retirement suggestions.
    pub fn with_market_data(
        mut self,
        source: Arc<dyn MarketDataSource>,
        tickers: Vec<String>,
        period: impl Into<String>,
    ) -> Self {
        if !tickers.is_empty() {
            self.market = Some(MarketSnapshot {
                source,
                tickers,
                period: period.into(),
            });
        }
        self
    }

    /// Wire Gemini, NewsAPI and Yahoo Finance from configuration.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let model = GeminiClient::new(config.gemini_api_key.clone(), &config.gemini_model)?;
        let news = NewsApiClient::new(config.news_api_key.clone(), config.fetch_timeout)?;
        let market = YahooFinanceClient::new(config.fetch_timeout)?;

        Ok(Self::new(Arc::new(model), Arc::new(news)).with_market_data(
            Arc::new(market),
            config.market_tickers.clone(),
            config.market_period.clone(),
        ))
    }

    /// Process one user utterance and return the assistant's reply.
    ///
    /// Both the utterance and the reply are appended to the message log.
    /// Blank input is rejected without touching the state.
    pub async fn respond(&self, state: &mut ConversationState, utterance: &str) -> Result<String> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(AdvisorError::EmptyInput);
        }

        state.push_user(utterance);

        let phase = state.phase();
        let reply = match phase {
            Phase::AwaitingGoal => self.handle_goal(state, utterance).await,
            Phase::AskingQuestions => self.handle_answer(state, utterance).await,
            Phase::Suggesting => self.deliver_suggestions(state).await,
            Phase::FollowUp => self.handle_follow_up(state, utterance).await,
        };

        info!(from = ?phase, to = ?state.phase(), "Turn processed");

        state.push_assistant(&reply);
        Ok(reply)
    }

    pub fn reset(&self, state: &mut ConversationState) {
        info!("Conversation reset");
        state.reset();
    }

    async fn handle_goal(&self, state: &mut ConversationState, goal: &str) -> String {
        state.set_goal(goal);

        let intent = match IntentClassifier::classify(self.model.as_ref(), goal).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Classification failed, asking user to retry: {}", e);
                state.clear_goal();
                return FALLBACK_MESSAGE.to_string();
            }
        };

        if intent.is_control() {
            info!(intent = %intent, "Goal is not a planning request");
            state.clear_goal();
            let reply = match intent {
                Intent::OutOfDomain => DECLINE_MESSAGE,
                _ => GREETING_MESSAGE,
            };
            return reply.to_string();
        }

        match QuestionPlanner::plan(self.model.as_ref(), goal, &intent).await {
            Ok(plan) => {
                state.begin_questions(intent, plan.questions());
                plan.opening_message()
            }
            Err(AdvisorError::EmptyGeneration(reason)) => {
                warn!(reason = %reason, "Question planner produced nothing");
                state.clear_goal();
                REPHRASE_MESSAGE.to_string()
            }
            Err(e) => {
                warn!("Question planning failed: {}", e);
                state.clear_goal();
                FALLBACK_MESSAGE.to_string()
            }
        }
    }

    async fn handle_answer(&self, state: &mut ConversationState, answer: &str) -> String {
        match state.record_answer(answer) {
            Some(next_question) => next_question,
            None => self.deliver_suggestions(state).await,
        }
    }

    async fn deliver_suggestions(&self, state: &mut ConversationState) -> String {
        let intent = state
            .broad_intent()
            .cloned()
            .unwrap_or_else(|| Intent::Other(String::new()));
        let reference = reference_for(&intent);
        let summary = state.context_summary();

        let suggestions = match SuggestionSynthesizer::synthesize(
            self.model.as_ref(),
            &summary,
            &intent,
            reference.as_ref(),
        )
        .await
        {
            Ok(suggestions) => suggestions,
            Err(AdvisorError::EmptyGeneration(reason)) => {
                warn!(reason = %reason, "No suggestions generated, waiting for retry");
                return SUGGESTION_RETRY_MESSAGE.to_string();
            }
            Err(e) => {
                warn!("Suggestion synthesis failed, waiting for retry: {}", e);
                return FALLBACK_MESSAGE.to_string();
            }
        };

        let goal = state.goal().unwrap_or_default().to_string();
        let news = self.news.fetch_news(&goal, NEWS_LIMIT).await;
        let market = match (&self.market, &intent) {
            (Some(snapshot), Intent::SavingInvesting | Intent::RetirementPlanning) => {
                snapshot
                    .source
                    .fetch_performance(&snapshot.tickers, &snapshot.period)
                    .await
            }
            _ => Vec::new(),
        };
        let period = self.market.as_ref().map(|m| m.period.as_str()).unwrap_or_default();

        let response = compose_response(&suggestions, &news, &market, period, reference.as_ref());
        state.finish_suggestions(suggestions);
        response
    }

    async fn handle_follow_up(&self, state: &ConversationState, question: &str) -> String {
        let titles: Vec<&str> = state.suggestions().iter().map(|s| s.title.as_str()).collect();
        let prompt = format!(
            r#"The user says: "{}"
Based on our previous suggestions:
{:?}

Provide a detailed, helpful response addressing their question.
If they ask about something new, acknowledge it and provide relevant information."#,
            question, titles
        );

        match self.model.complete(&with_persona(&prompt)).await {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                warn!("Follow-up answer was empty");
                FALLBACK_MESSAGE.to_string()
            }
            Err(e) => {
                warn!("Follow-up answer failed: {}", e);
                FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

/// Numbered suggestions, then news, market snapshot and disclaimer when available.
fn compose_response(
    suggestions: &[Suggestion],
    news: &[NewsArticle],
    market: &[StockPerformance],
    period: &str,
    reference: Option<&ReferenceData>,
) -> String {
    let mut out =
        String::from("Based on our conversation, here are a few tailored suggestions for you:\n\n");

    for (i, suggestion) in suggestions.iter().enumerate() {
        out.push_str(&format!(
            "{}. *{}*: {}\n",
            i + 1,
            suggestion.title,
            suggestion.explanation
        ));
    }

    if !news.is_empty() {
        out.push_str("\n\n*Relevant News:*\n");
        for article in news {
            out.push_str(&format!("- [{}]({})\n", article.title, article.url));
        }
    }

    if !market.is_empty() {
        out.push_str(&format!("\n\n*Market Snapshot ({}):*\n", period));
        for perf in market {
            out.push_str(&format!("- {}: {:+.2}%\n", perf.ticker, perf.change_pct));
        }
    }

    if let Some(data) = reference {
        out.push_str(&format!("\n\n*{}*", data.disclaimer));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;
    use async_trait::async_trait;

    struct FixedNews(Vec<NewsArticle>);

    #[async_trait]
    impl NewsSource for FixedNews {
        async fn fetch_news(&self, _query: &str, limit: usize) -> Vec<NewsArticle> {
            self.0.iter().take(limit).cloned().collect()
        }
    }

    struct FixedMarket;

    #[async_trait]
    impl MarketDataSource for FixedMarket {
        async fn fetch_performance(&self, tickers: &[String], _period: &str) -> Vec<StockPerformance> {
            tickers
                .iter()
                .map(|t| StockPerformance {
                    ticker: t.clone(),
                    change_pct: 4.5,
                })
                .collect()
        }
    }

    fn controller(model: &Arc<ScriptedModel>) -> ConversationController {
        ConversationController::new(model.clone(), Arc::new(FixedNews(vec![])))
    }

    const RETIREMENT_QUESTIONS: &str = "That's a wonderful goal! I have a few questions to get started.\nHow old are you today?\nAt what age would you like to retire?\nWhat is your risk tolerance (Low, Medium, High)?";

    #[tokio::test]
    async fn test_out_of_domain_returns_to_goal_entry() {
        let model = Arc::new(ScriptedModel::with_replies(["Out of Domain"]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let reply = controller.respond(&mut state, "how to cook pasta").await.unwrap();

        assert_eq!(reply, DECLINE_MESSAGE);
        assert!(state.goal().is_none());
        assert_eq!(state.phase(), Phase::AwaitingGoal);
        assert_eq!(state.messages().len(), 2);
        assert_eq!(model.prompts().len(), 1, "planner must not run for control intents");
    }

    #[tokio::test]
    async fn test_general_inquiry_greets() {
        let model = Arc::new(ScriptedModel::with_replies(["General Inquiry"]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let reply = controller.respond(&mut state, "hello there").await.unwrap();

        assert_eq!(reply, GREETING_MESSAGE);
        assert!(state.goal().is_none());
        assert!(state.broad_intent().is_none());
        assert_eq!(state.phase(), Phase::AwaitingGoal);
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_retirement_scenario() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Retirement Planning",
            RETIREMENT_QUESTIONS,
            "1. Start an SIP: Invest monthly in a Nifty 50 index fund\n2. start an sip: duplicate\nSome filler line\n3. Public Provident Fund: Tax-free, 15 year lock-in",
        ]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let opening = controller
            .respond(&mut state, "I want to save for retirement")
            .await
            .unwrap();
        assert_eq!(
            opening,
            "That's a wonderful goal! I have a few questions to get started.\n\nHow old are you today?"
        );
        assert_eq!(state.phase(), Phase::AskingQuestions);
        assert_eq!(state.questions().len(), 3);
        assert_eq!(state.broad_intent(), Some(&Intent::RetirementPlanning));

        let second = controller.respond(&mut state, "35").await.unwrap();
        assert_eq!(second, "At what age would you like to retire?");
        assert!(!state.is_complete());

        let third = controller.respond(&mut state, "55").await.unwrap();
        assert_eq!(third, "What is your risk tolerance (Low, Medium, High)?");

        let response = controller.respond(&mut state, "Medium").await.unwrap();
        assert!(state.is_complete());
        assert_eq!(state.phase(), Phase::FollowUp);
        assert!(state.questions().is_empty());
        assert!(state.answers().is_empty());

        let titles: Vec<_> = state.suggestions().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Start an SIP", "Public Provident Fund"]);
        assert!(response.starts_with("Based on our conversation"));
        assert!(response.contains("1. *Start an SIP*: Invest monthly in a Nifty 50 index fund\n"));
        assert!(response.contains("2. *Public Provident Fund*"));
        assert!(!response.contains("Relevant News"));

        let prompts = model.prompts();
        let suggestion_prompt = &prompts[2];
        assert!(suggestion_prompt.contains("Q: How old are you today?\nA: 35\n"));
        assert!(suggestion_prompt.contains("Q: At what age would you like to retire?\nA: 55\n"));
        assert!(!suggestion_prompt.contains("Static Reference Data"));
    }

    #[tokio::test]
    async fn test_debt_management_adds_news_and_disclaimer() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Debt Management",
            "Let's get your debt sorted! What type of loan are you considering?\nWhat are your existing monthly commitments?",
            "Debt Avalanche: Pay highest interest first\nHome Loan: 8.5% - 9.5% p.a.",
        ]));
        let news = FixedNews(vec![NewsArticle {
            title: "Banks cut home loan rates".to_string(),
            url: "https://news.example/loans".to_string(),
        }]);
        let controller = ConversationController::new(model.clone(), Arc::new(news));
        let mut state = ConversationState::new();

        let opening = controller.respond(&mut state, "I need a home loan").await.unwrap();
        assert_eq!(opening, "Let's get your debt sorted! What type of loan are you considering?");
        assert_eq!(state.questions().len(), 2);

        controller.respond(&mut state, "Home loan").await.unwrap();
        let response = controller.respond(&mut state, "A car EMI").await.unwrap();

        assert!(response.contains("*Relevant News:*\n- [Banks cut home loan rates](https://news.example/loans)\n"));
        assert!(response.ends_with("*Note: These are estimated interest rates and terms. Please verify directly with banks for current, personalized offers.*"));
        assert!(model.prompts()[2].contains("Static Reference Data"));
        assert!(model.prompts()[2].contains("Q: Let's get your debt sorted! What type of loan are you considering?\nA: Home loan\n"));
    }

    #[tokio::test]
    async fn test_market_snapshot_for_saving() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Saving/Investing",
            "Great! What is your risk tolerance?",
            "Index Fund: Low cost diversification",
        ]));
        let controller = controller(&model).with_market_data(
            Arc::new(FixedMarket),
            vec!["NIFTYBEES.NS".to_string()],
            "6mo",
        );
        let mut state = ConversationState::new();

        controller.respond(&mut state, "invest 10k").await.unwrap();
        let response = controller.respond(&mut state, "Low").await.unwrap();

        assert!(response.contains("*Market Snapshot (6mo):*\n- NIFTYBEES.NS: +4.50%\n"));
        assert!(response.contains("Senior citizen rates"));
    }

    #[tokio::test]
    async fn test_classifier_failure_keeps_awaiting_goal() {
        let model = Arc::new(ScriptedModel::new());
        model.push_failure("connection refused");
        model.push_reply("General Inquiry");
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let reply = controller.respond(&mut state, "save money").await.unwrap();
        assert_eq!(reply, FALLBACK_MESSAGE);
        assert!(state.goal().is_none());
        assert_eq!(state.phase(), Phase::AwaitingGoal);

        let reply = controller.respond(&mut state, "hi").await.unwrap();
        assert_eq!(reply, GREETING_MESSAGE);
    }

    #[tokio::test]
    async fn test_empty_planner_reply_asks_to_rephrase() {
        let model = Arc::new(ScriptedModel::with_replies(["Budgeting/Expense Control", "  \n"]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let reply = controller.respond(&mut state, "cut my spending").await.unwrap();

        assert_eq!(reply, REPHRASE_MESSAGE);
        assert_eq!(state.phase(), Phase::AwaitingGoal);
        assert!(state.goal().is_none());
        assert!(state.questions().is_empty());
    }

    #[tokio::test]
    async fn test_unrecognised_intent_still_asks_questions() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Tax Planning",
            "Happy to help! Which tax regime are you on?",
        ]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        controller.respond(&mut state, "reduce my taxes").await.unwrap();

        assert_eq!(state.phase(), Phase::AskingQuestions);
        assert_eq!(state.broad_intent(), Some(&Intent::Other("Tax Planning".to_string())));
        assert!(model.prompts()[1].contains("category of 'Tax Planning'"));
    }

    #[tokio::test]
    async fn test_synthesis_failure_retries_on_next_message() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Budgeting/Expense Control",
            "Let's build a budget! What is your main challenge?",
        ]));
        model.push_failure("503");
        model.push_reply("50/30/20 Rule: Split income into needs, wants and savings");
        let controller = controller(&model);
        let mut state = ConversationState::new();

        controller.respond(&mut state, "create a budget").await.unwrap();
        let reply = controller.respond(&mut state, "overspending").await.unwrap();

        assert_eq!(reply, FALLBACK_MESSAGE);
        assert_eq!(state.phase(), Phase::Suggesting);
        assert!(state.is_complete());
        assert_eq!(state.answers(), vec!["overspending"]);

        let reply = controller.respond(&mut state, "try again").await.unwrap();
        assert!(reply.contains("1. *50/30/20 Rule*"));
        assert_eq!(state.phase(), Phase::FollowUp);
        assert!(model.prompts()[3].contains("A: overspending"));
    }

    #[tokio::test]
    async fn test_follow_up_includes_previous_titles() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Saving/Investing",
            "Nice! What is your risk tolerance?",
            "Index Fund: Low cost\nRecurring Deposit: Safe",
            "An index fund tracks the market.",
        ]));
        model.push_failure("quota");
        let controller = controller(&model);
        let mut state = ConversationState::new();

        controller.respond(&mut state, "save for a house").await.unwrap();
        controller.respond(&mut state, "Low").await.unwrap();

        let reply = controller
            .respond(&mut state, "What is an index fund?")
            .await
            .unwrap();
        assert_eq!(reply, "An index fund tracks the market.");
        assert_eq!(state.phase(), Phase::FollowUp);

        let prompt = &model.prompts()[3];
        assert!(prompt.contains("The user says: \"What is an index fund?\""));
        assert!(prompt.contains(r#"["Index Fund", "Recurring Deposit"]"#));

        let reply = controller.respond(&mut state, "And RDs?").await.unwrap();
        assert_eq!(reply, FALLBACK_MESSAGE);
        assert_eq!(state.phase(), Phase::FollowUp);
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected() {
        let model = Arc::new(ScriptedModel::new());
        let controller = controller(&model);
        let mut state = ConversationState::new();

        let result = controller.respond(&mut state, "   ").await;
        tokio_test::assert_err!(result);
        assert!(state.messages().is_empty());
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_reset_mid_conversation() {
        let model = Arc::new(ScriptedModel::with_replies([
            "Retirement Planning",
            RETIREMENT_QUESTIONS,
            "General Inquiry",
        ]));
        let controller = controller(&model);
        let mut state = ConversationState::new();

        controller.respond(&mut state, "retire at 50").await.unwrap();
        controller.respond(&mut state, "40").await.unwrap();
        controller.reset(&mut state);

        assert_eq!(state.phase(), Phase::AwaitingGoal);
        assert!(state.messages().is_empty());
        assert!(state.questions().is_empty());
        assert!(state.suggestions().is_empty());

        let reply = tokio_test::assert_ok!(controller.respond(&mut state, "hello").await);
        assert_eq!(reply, GREETING_MESSAGE);
    }
}
