/// Endpoint badge schema version understood by badge renderers.
pub const BADGE_SCHEMA_VERSION: u8 = 1;

/// Label shown on the left side of the badge.
pub const BADGE_LABEL: &str = "Profile View";

/// Badge color for the count side.
pub const BADGE_COLOR: &str = "blue";

/// Badge projection of a view count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBadge {
    message: String,
}

impl ViewBadge {
    /// Projects a counter value onto the fixed badge shape.
    #[must_use]
    pub fn for_count(count: u64) -> Self {
        Self {
            message: count.to_string(),
        }
    }

    /// Returns the badge schema version.
    #[must_use]
    pub fn schema_version(&self) -> u8 {
        BADGE_SCHEMA_VERSION
    }

    /// Returns the badge label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        BADGE_LABEL
    }

    /// Returns the rendered count.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Returns the badge color.
    #[must_use]
    pub fn color(&self) -> &'static str {
        BADGE_COLOR
    }
}
