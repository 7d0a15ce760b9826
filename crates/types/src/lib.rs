/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when creating validated contact types.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The input was not a plausible e-mail address
    #[error("email address must contain a single '@' with non-empty local part and domain")]
    InvalidEmail,
    /// The mobile number did not start with a '+' country code prefix
    #[error("mobile number must include a country code prefix (e.g. +447700900123)")]
    MissingCountryCode,
    /// The mobile number contained something other than 7-15 digits after the prefix
    #[error("mobile number must be 7-15 digits after the country code prefix")]
    InvalidMobileNumber,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A validated e-mail address.
///
/// Validation is deliberately shallow: the address must contain exactly one `@`
/// separating a non-empty local part from a non-empty domain, with no embedded
/// whitespace. Deliverability is the sending channel's concern, not ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and validates an e-mail address.
    ///
    /// The input is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::InvalidEmail` if the trimmed input does not have
    /// the shape `local@domain`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, ContactError> {
        let trimmed = input.as_ref().trim();
        let mut parts = trimmed.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();

        let shape_ok = !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && !trimmed.chars().any(char::is_whitespace);

        if !shape_ok {
            return Err(ContactError::InvalidEmail);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A mobile number in international form.
///
/// SMS gateways require the country code, so the number must start with `+`
/// followed by 7 to 15 digits (E.164). Spaces and hyphens in the input are
/// stripped during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNumber(String);

impl MobileNumber {
    /// Parses and validates a mobile number.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::MissingCountryCode` if the number does not start
    /// with `+`, or `ContactError::InvalidMobileNumber` if the remainder is not
    /// 7-15 digits.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, ContactError> {
        let compact: String = input
            .as_ref()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let Some(digits) = compact.strip_prefix('+') else {
            return Err(ContactError::MissingCountryCode);
        };

        let digits_ok =
            (7..=15).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
        if !digits_ok {
            return Err(ContactError::InvalidMobileNumber);
        }

        Ok(Self(compact))
    }

    /// Returns the number as a string slice, including the `+` prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MobileNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for MobileNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for MobileNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for MobileNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        MobileNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_accepts() {
        let text = NonEmptyText::new("  Aanya  ").unwrap();
        assert_eq!(text.as_str(), "Aanya");
    }

    #[test]
    fn non_empty_text_rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn email_accepts_plain_address() {
        let email = EmailAddress::parse("parent@example.com").unwrap();
        assert_eq!(email.as_str(), "parent@example.com");
    }

    #[test]
    fn email_rejects_missing_at_and_empty_parts() {
        assert!(EmailAddress::parse("no-at-sign").is_err());
        assert!(EmailAddress::parse("@example.com").is_err());
        assert!(EmailAddress::parse("parent@").is_err());
        assert!(EmailAddress::parse("pa rent@example.com").is_err());
    }

    #[test]
    fn mobile_requires_country_code_prefix() {
        assert!(matches!(
            MobileNumber::parse("07700900123"),
            Err(ContactError::MissingCountryCode)
        ));
    }

    #[test]
    fn mobile_accepts_e164_and_strips_separators() {
        let number = MobileNumber::parse("+44 7700 900-123").unwrap();
        assert_eq!(number.as_str(), "+447700900123");
    }

    #[test]
    fn mobile_rejects_non_digits_and_bad_lengths() {
        assert!(MobileNumber::parse("+44abc").is_err());
        assert!(MobileNumber::parse("+123").is_err());
        assert!(MobileNumber::parse("+1234567890123456").is_err());
    }
}
