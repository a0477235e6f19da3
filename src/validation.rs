// ✅ Validator / Filter - data-quality rules + optional user criteria
//
// Partitions parsed transactions into three disjoint buckets:
//   invalid      → failed a data-quality rule (counted in invalid_count)
//   filtered out → valid, but excluded by region / amount criteria
//   valid        → everything else
//
// Identity: final_count = total_input - invalid - filtered_out

use crate::transaction::{
    Transaction, CUSTOMER_ID_PREFIX, PRODUCT_ID_PREFIX, TRANSACTION_ID_PREFIX,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// INVALID REASONS
// ============================================================================

/// First rule a transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvalidReason {
    NonPositiveQuantity,
    NonPositiveUnitPrice,
    BadTransactionId,
    BadProductId,
    BadCustomerId,
    MissingField,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::NonPositiveQuantity => "quantity must be > 0",
            InvalidReason::NonPositiveUnitPrice => "unit price must be > 0",
            InvalidReason::BadTransactionId => "transaction id must start with T",
            InvalidReason::BadProductId => "product id must start with P",
            InvalidReason::BadCustomerId => "customer id must start with C",
            InvalidReason::MissingField => "required field is empty",
        }
    }
}

// ============================================================================
// FILTER CRITERIA
// ============================================================================

/// Optional user-supplied filters, applied in order region → min → max
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub region: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: keep only this region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder pattern: drop transactions below this amount
    pub fn with_min_amount(mut self, amount: f64) -> Self {
        self.min_amount = Some(amount);
        self
    }

    /// Builder pattern: drop transactions above this amount
    pub fn with_max_amount(mut self, amount: f64) -> Self {
        self.max_amount = Some(amount);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.min_amount.is_none() && self.max_amount.is_none()
    }
}

// ============================================================================
// VALIDATION OUTCOME
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Transactions that passed every rule and every filter, input order kept
    pub valid: Vec<Transaction>,
    pub total_input: usize,
    pub invalid_count: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub invalid_by_reason: BTreeMap<InvalidReason, usize>,
}

impl ValidationOutcome {
    pub fn filtered_out(&self) -> usize {
        self.filtered_by_region + self.filtered_by_amount
    }

    pub fn final_count(&self) -> usize {
        self.valid.len()
    }

    /// Counts only, for display and serialization
    pub fn summary(&self) -> ValidationSummary {
        ValidationSummary {
            total_input: self.total_input,
            invalid: self.invalid_count,
            filtered_by_region: self.filtered_by_region,
            filtered_by_amount: self.filtered_by_amount,
            final_count: self.final_count(),
            invalid_by_reason: self.invalid_by_reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total_input: usize,
    pub invalid: usize,
    pub filtered_by_region: usize,
    pub filtered_by_amount: usize,
    pub final_count: usize,
    pub invalid_by_reason: BTreeMap<InvalidReason, usize>,
}

// ============================================================================
// FILTER OPTIONS (shown to the user before filtering)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Distinct regions, first-seen order
    pub regions: Vec<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
}

impl FilterOptions {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut options = FilterOptions::default();

        for tx in transactions {
            if !options.regions.iter().any(|r| r == &tx.region) {
                options.regions.push(tx.region.clone());
            }

            let amount = tx.amount();
            options.min_amount = Some(options.min_amount.map_or(amount, |m| m.min(amount)));
            options.max_amount = Some(options.max_amount.map_or(amount, |m| m.max(amount)));
        }

        options
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Validator
    }

    /// Check one transaction against the data-quality rules
    pub fn validate(&self, tx: &Transaction) -> Result<(), InvalidReason> {
        // Rule 1: positive quantity and price
        if tx.quantity <= 0 {
            return Err(InvalidReason::NonPositiveQuantity);
        }
        if tx.unit_price <= 0.0 {
            return Err(InvalidReason::NonPositiveUnitPrice);
        }

        // Rule 2: id prefixes
        if !tx.transaction_id.starts_with(TRANSACTION_ID_PREFIX) {
            return Err(InvalidReason::BadTransactionId);
        }
        if !tx.product_id.starts_with(PRODUCT_ID_PREFIX) {
            return Err(InvalidReason::BadProductId);
        }
        if !tx.customer_id.starts_with(CUSTOMER_ID_PREFIX) {
            return Err(InvalidReason::BadCustomerId);
        }

        // Rule 3: every field present
        if !tx.missing_fields().is_empty() {
            return Err(InvalidReason::MissingField);
        }

        Ok(())
    }

    /// Validate every transaction, then apply the optional filters
    pub fn validate_and_filter(
        &self,
        transactions: &[Transaction],
        criteria: &FilterCriteria,
    ) -> ValidationOutcome {
        let mut outcome = ValidationOutcome {
            total_input: transactions.len(),
            ..Default::default()
        };

        for tx in transactions {
            if let Err(reason) = self.validate(tx) {
                debug!("Invalid transaction {:?}: {}", tx.transaction_id, reason.as_str());
                outcome.invalid_count += 1;
                *outcome.invalid_by_reason.entry(reason).or_insert(0) += 1;
                continue;
            }

            if let Some(region) = &criteria.region {
                if &tx.region != region {
                    outcome.filtered_by_region += 1;
                    continue;
                }
            }

            let amount = tx.amount();
            if criteria.min_amount.is_some_and(|min| amount < min)
                || criteria.max_amount.is_some_and(|max| amount > max)
            {
                outcome.filtered_by_amount += 1;
                continue;
            }

            outcome.valid.push(tx.clone());
        }

        info!(
            "Validation: {} input, {} invalid, {} filtered by region, {} filtered by amount, {} valid",
            outcome.total_input,
            outcome.invalid_count,
            outcome.filtered_by_region,
            outcome.filtered_by_amount,
            outcome.final_count()
        );

        outcome
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
