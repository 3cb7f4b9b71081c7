//! Fintech Advisor
//!
//! A conversational personal-finance assistant that:
//! - Classifies a user's goal into a finance category
//! - Asks model-generated clarifying questions one at a time
//! - Synthesizes deduplicated, intent-tailored suggestions
//! - Answers follow-up questions about those suggestions
//!
//! CONVERSATION LOOP:
//! GOAL → CLASSIFY → QUESTIONS → SUGGEST → FOLLOW-UP

pub mod api;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod market;
pub mod models;
pub mod planner;
pub mod reference;
pub mod state;
pub mod suggestions;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use conversation::{ConversationController, ConversationState, Phase};
pub use classifier::IntentClassifier;
