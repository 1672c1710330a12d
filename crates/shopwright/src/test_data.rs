//! Personas, checkout customers and suite-wide constants.

use serde::Serialize;
use std::fmt;

/// Default storefront under test
pub const DEFAULT_BASE_URL: &str = "https://qa-challenge.codesubmit.io";

/// Password shared by every persona
pub const DEFAULT_PASSWORD: &str = "secret_sauce";

/// A fixed test user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct User {
    /// Login name
    pub username: &'static str,
    /// Password
    pub password: &'static str,
    /// What the persona exercises
    pub description: &'static str,
}

impl User {
    /// The site works as expected for this user
    pub const STANDARD: Self = Self {
        username: "standard_user",
        password: DEFAULT_PASSWORD,
        description: "The site should work as expected for this user",
    };

    /// Cannot log in
    pub const LOCKED_OUT: Self = Self {
        username: "locked_out_user",
        password: DEFAULT_PASSWORD,
        description: "User is locked out and should not be able to log in",
    };

    /// Broken images and a misbehaving checkout form
    pub const PROBLEM: Self = Self {
        username: "problem_user",
        password: DEFAULT_PASSWORD,
        description: "Images are not loading for this user",
    };

    /// Slow page loads
    pub const PERFORMANCE_GLITCH: Self = Self {
        username: "performance_glitch_user",
        password: DEFAULT_PASSWORD,
        description: "This user has high loading times",
    };

    /// Every persona, standard first
    #[must_use]
    pub const fn personas() -> [Self; 4] {
        [
            Self::STANDARD,
            Self::LOCKED_OUT,
            Self::PROBLEM,
            Self::PERFORMANCE_GLITCH,
        ]
    }

    /// Look up a persona by short key (`standard`, `locked_out`, `problem`,
    /// `performance_glitch`, dashes or underscores) or by full username
    #[must_use]
    pub fn by_key(key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        let short = normalized.strip_suffix("_user").unwrap_or(&normalized);
        match short {
            "standard" => Some(Self::STANDARD),
            "locked_out" | "locked" => Some(Self::LOCKED_OUT),
            "problem" => Some(Self::PROBLEM),
            "performance_glitch" | "glitch" => Some(Self::PERFORMANCE_GLITCH),
            _ => None,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.username)
    }
}

/// Customer details typed into the checkout information form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutInfo {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub postal_code: String,
}

impl CheckoutInfo {
    /// Create checkout info
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }

    /// John Doe, 12345
    #[must_use]
    pub fn default_customer() -> Self {
        Self::new("John", "Doe", "12345")
    }
}

impl Default for CheckoutInfo {
    fn default() -> Self {
        Self::default_customer()
    }
}

/// Named timeouts (milliseconds)
#[derive(Debug, Clone, Copy)]
pub struct Timeouts;

impl Timeouts {
    /// 5 seconds
    pub const SHORT: u64 = 5_000;
    /// 10 seconds
    pub const MEDIUM: u64 = 10_000;
    /// 30 seconds
    pub const LONG: u64 = 30_000;
}
