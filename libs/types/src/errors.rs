//! Error types for the aggregation core
//!
//! Two kinds only: the caller asked for something structurally invalid, or an
//! external collaborator failed. Neither is retried here.

use std::fmt;

use thiserror::Error;

/// Top-level aggregation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregatorError {
    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("Collaborator failure: {0}")]
    Collaborator(#[from] CollaboratorFailure),
}

/// A caller-supplied query is structurally invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
    #[error("page must be at least 1")]
    InvalidPage,

    #[error("per_page must be between 1 and {max}, got {actual}")]
    InvalidPerPage { actual: usize, max: usize },

    #[error("base and quote token are identical: {token}")]
    IdenticalTokens { token: String },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// The external system that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    OrderSource,
    CollateralOracle,
    MarketDiscovery,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::OrderSource => "order source",
            Collaborator::CollateralOracle => "collateral oracle",
            Collaborator::MarketDiscovery => "market discovery",
        };
        f.write_str(name)
    }
}

/// An I/O failure reported by an external collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{collaborator} failed: {message}")]
pub struct CollaboratorFailure {
    pub collaborator: Collaborator,
    pub message: String,
}

impl CollaboratorFailure {
    pub fn new(collaborator: Collaborator, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }

    pub fn order_source(message: impl Into<String>) -> Self {
        Self::new(Collaborator::OrderSource, message)
    }

    pub fn collateral_oracle(message: impl Into<String>) -> Self {
        Self::new(Collaborator::CollateralOracle, message)
    }

    pub fn market_discovery(message: impl Into<String>) -> Self {
        Self::new(Collaborator::MarketDiscovery, message)
    }
}
