use std::fmt;
use std::str::FromStr;

use auth::Token;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::errors::EmailError;
use super::errors::UserIdError;
use super::errors::WindowError;

/// Registered user as persisted by the credential store.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub password_hash: String,
    /// Reserved for account confirmation; stored with its default and never read.
    pub valid: bool,
}

/// User unique identifier type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a user identifier.
    ///
    /// # Errors
    /// * `Empty` - Identifier is empty
    pub fn new(id: String) -> Result<Self, UserIdError> {
        if id.is_empty() {
            return Err(UserIdError::Empty);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    ///
    /// # Returns
    /// Email string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Inclusive `[start, end]` interval during which a token is live.
///
/// Both bounds are held at millisecond resolution, matching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ValidityWindow {
    /// Build a window, truncating both bounds to whole milliseconds.
    ///
    /// # Errors
    /// * `StartAfterEnd` - `start` is later than `end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        let start = truncate_to_millis(start);
        let end = truncate_to_millis(end);
        if start > end {
            return Err(WindowError::StartAfterEnd);
        }
        Ok(Self { start, end })
    }

    /// Window opening `skew` before `now` and closing `lifetime` after it.
    pub fn around(
        now: DateTime<Utc>,
        skew: Duration,
        lifetime: Duration,
    ) -> Result<Self, WindowError> {
        Self::new(now - skew, now + lifetime)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.start <= now && now <= self.end
    }
}

/// Drop sub-millisecond precision.
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// A token handed back to the caller after a successful login.
///
/// A plain copy; it holds no reference back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: Token,
    pub user_id: UserId,
    pub window: ValidityWindow,
}

/// How long issued tokens live and how far back they are back-dated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    pub lifetime: Duration,
    pub clock_skew: Duration,
}

impl TokenPolicy {
    pub fn new(lifetime: Duration, clock_skew: Duration) -> Self {
        Self {
            lifetime,
            clock_skew,
        }
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::hours(24),
            clock_skew: Duration::seconds(1),
        }
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub id: UserId,
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// Construct a new register command.
    ///
    /// # Arguments
    /// * `id` - Validated user identifier
    /// * `email` - Validated email address
    /// * `password` - Plain text password (hashed by the credential store)
    pub fn new(id: UserId, email: EmailAddress, password: String) -> Self {
        Self {
            id,
            email,
            password,
        }
    }

    /// Command for the signup form, which uses the email as the identifier.
    pub fn for_email(email: EmailAddress, password: String) -> Self {
        Self {
            id: UserId(email.as_str().to_string()),
            email,
            password,
        }
    }
}
