//! Core data models for the fintech advisor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Intent =================
//

pub const SAVING_INVESTING: &str = "Saving/Investing";
pub const DEBT_MANAGEMENT: &str = "Debt Management";
pub const BUDGETING: &str = "Budgeting/Expense Control";
pub const RETIREMENT_PLANNING: &str = "Retirement Planning";
pub const GENERAL_INQUIRY: &str = "General Inquiry";
pub const OUT_OF_DOMAIN: &str = "Out of Domain";

/// Coarse classification of a user's goal.
///
/// The four domain categories and the two control categories are closed tags.
/// Anything the model returns that matches none of them is carried verbatim in
/// `Other` and treated as a valid domain intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Intent {
    SavingInvesting,
    DebtManagement,
    Budgeting,
    RetirementPlanning,
    GeneralInquiry,
    OutOfDomain,
    Other(String),
}

impl Intent {
    /// Map raw classifier output onto an intent.
    ///
    /// Control categories win over domain categories, and matching is by
    /// containment so decorated answers ("Category: Debt Management.") still resolve.
    pub fn from_model_output(raw: &str) -> Self {
        let text = raw.trim();

        if text.contains(OUT_OF_DOMAIN) {
            Intent::OutOfDomain
        } else if text.contains(GENERAL_INQUIRY) {
            Intent::GeneralInquiry
        } else if text.contains(SAVING_INVESTING) {
            Intent::SavingInvesting
        } else if text.contains(DEBT_MANAGEMENT) {
            Intent::DebtManagement
        } else if text.contains(BUDGETING) {
            Intent::Budgeting
        } else if text.contains(RETIREMENT_PLANNING) {
            Intent::RetirementPlanning
        } else {
            Intent::Other(text.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Intent::SavingInvesting => SAVING_INVESTING,
            Intent::DebtManagement => DEBT_MANAGEMENT,
            Intent::Budgeting => BUDGETING,
            Intent::RetirementPlanning => RETIREMENT_PLANNING,
            Intent::GeneralInquiry => GENERAL_INQUIRY,
            Intent::OutOfDomain => OUT_OF_DOMAIN,
            Intent::Other(raw) => raw,
        }
    }

    /// True for the two categories that never lead to a question round.
    pub fn is_control(&self) -> bool {
        matches!(self, Intent::GeneralInquiry | Intent::OutOfDomain)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.label().to_string()
    }
}

//
// ================= Messages =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

//
// ================= Suggestions =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub explanation: String,
}

//
// ================= Reference Data =================
//

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReferenceOption {
    pub title: &'static str,
    pub explanation: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReferenceData {
    pub title: &'static str,
    pub disclaimer: &'static str,
    pub options: Vec<ReferenceOption>,
}

//
// ================= External Data =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockPerformance {
    pub ticker: String,
    pub change_pct: f64,
}
