//! Status enums and caller roles.
//!
//! Every enum here is persisted as a lowercase/snake_case TEXT column in
//! SQLite, so each type carries an `as_str` / `parse` pair alongside its
//! serde representation.  Soft deletion is modelled as a status flip, never
//! a row deletion -- aggregate queries filter on the "active" value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A status string in the database did not match any known variant.
#[derive(Debug, Error)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            pub fn parse(s: &str) -> Result<Self, ParseStatusError> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum!(
    /// Moderation state of a solution.  Only `published` solutions count
    /// toward party/campaign caps and analytics.
    SolutionStatus, "solution", {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
);

status_enum!(
    /// The kind of a like/dislike/share action on a solution.
    InteractionKind, "interaction kind", {
        Like => "like",
        Dislike => "dislike",
        Share => "share",
    }
);

status_enum!(
    /// Soft-removal state for interactions and pledges.
    ActivityStatus, "activity", {
        Active => "active",
        Removed => "removed",
    }
);

status_enum!(
    /// Soft-removal state for comments (moderators may hide without deleting).
    CommentStatus, "comment", {
        Active => "active",
        Deleted => "deleted",
        Hidden => "hidden",
    }
);

status_enum!(
    /// Peace Seal application lifecycle.  Transitions are advisor-triggered:
    /// `application_submitted -> audit_in_progress -> under_review ->
    /// {verified | conditional | did_not_pass}`.
    CompanyStatus, "company", {
        ApplicationSubmitted => "application_submitted",
        AuditInProgress => "audit_in_progress",
        UnderReview => "under_review",
        Verified => "verified",
        Conditional => "conditional",
        DidNotPass => "did_not_pass",
    }
);

status_enum!(
    /// Whether the Peace Seal application fee has been settled.
    PaymentStatus, "payment", {
        Unpaid => "unpaid",
        Paid => "paid",
    }
);

status_enum!(
    /// Caller role attached to a user account.
    Role, "role", {
        User => "user",
        Moderator => "moderator",
        Admin => "admin",
        SuperAdmin => "superAdmin",
    }
);

impl Role {
    /// Admin-analytics routes are restricted to moderators and above.
    pub fn can_view_analytics(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin | Role::SuperAdmin)
    }
}
