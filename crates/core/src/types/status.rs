//! Status enums for catalog entities.
//!
//! Only `Active` products are ever shown on the storefront; the remaining
//! states belong to the moderation pipeline that feeds the catalog.

use serde::{Deserialize, Serialize};

/// Product publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.product_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Visible to shoppers.
    Active,
    /// Queued for automated review.
    WaitForIa,
    /// Queued for a moderator.
    WaitForHumanReview,
    /// Hidden by the seller.
    Pause,
    #[default]
    Draft,
}

impl ProductStatus {
    /// Whether products in this state are listed on the storefront.
    #[must_use]
    pub const fn is_listed(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::WaitForIa => write!(f, "wait_for_ia"),
            Self::WaitForHumanReview => write!(f, "wait_for_human_review"),
            Self::Pause => write!(f, "pause"),
            Self::Draft => write!(f, "draft"),
        }
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "wait_for_ia" => Ok(Self::WaitForIa),
            "wait_for_human_review" => Ok(Self::WaitForHumanReview),
            "pause" => Ok(Self::Pause),
            "draft" => Ok(Self::Draft),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Review moderation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.review_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    #[default]
    WaitForIa,
    WaitForHumanReview,
    Hidden,
}

/// Product question status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.question_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    #[default]
    WaitForIa,
    WaitForHumanReview,
    Hidden,
    Answered,
}
