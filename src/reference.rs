//! Static reference data
//!
//! Representative product rates used as illustrative examples when live bank
//! data is not available. Pure lookup, no network.

use crate::models::{Intent, ReferenceData, ReferenceOption};

const LOAN_OPTIONS: &[ReferenceOption] = &[
    ReferenceOption {
        title: "Personal Loan",
        explanation: "Typically 10.5% - 16% p.a. Flexible use, shorter tenure (1-5 years).",
    },
    ReferenceOption {
        title: "Home Loan",
        explanation: "Typically 8.5% - 9.5% p.a. For property purchase, long tenure (15-30 years).",
    },
    ReferenceOption {
        title: "Car Loan",
        explanation: "Typically 9% - 11% p.a. For new or used cars, tenure up to 7 years.",
    },
];

const DEPOSIT_OPTIONS: &[ReferenceOption] = &[
    ReferenceOption {
        title: "Major Private Bank FD (e.g., HDFC/ICICI)",
        explanation: "Approx. 7.0% - 7.25% p.a. for 1-2 year tenures.",
    },
    ReferenceOption {
        title: "Major Public Bank FD (e.g., SBI)",
        explanation: "Approx. 6.8% - 7.10% p.a. for 1-2 year tenures.",
    },
];

/// Reference data for an intent, if any exists.
pub fn reference_for(intent: &Intent) -> Option<ReferenceData> {
    match intent {
        Intent::DebtManagement => Some(ReferenceData {
            title: "Indicative Loan Options",
            disclaimer: "Note: These are estimated interest rates and terms. Please verify directly with banks for current, personalized offers.",
            options: LOAN_OPTIONS.to_vec(),
        }),
        Intent::SavingInvesting => Some(ReferenceData {
            title: "Indicative Fixed Deposit Rates",
            disclaimer: "Note: These are sample rates for general citizens. Senior citizen rates are often higher. Please verify with the bank.",
            options: DEPOSIT_OPTIONS.to_vec(),
        }),
        _ => None,
    }
}

impl ReferenceData {
    /// Render as a prompt block.
    pub fn to_prompt_block(&self) -> String {
        let mut block = format!("{}\n", self.title);
        for option in &self.options {
            block.push_str(&format!("- {}: {}\n", option.title, option.explanation));
        }
        block.push_str(self.disclaimer);
        block
    }
}
