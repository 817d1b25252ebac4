//! Strongly typed identifiers for the client and tenant domain.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const MAX_IDENTIFIER_LEN: usize = 128;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

def_id!(
	RealmId,
	"Company (tenant) identifier bound to a token pair and required on every resource request.",
	"RealmId"
);
def_id!(ClientId, "OAuth 2.0 client identifier issued during app registration.", "ClientId");

/// Errors emitted when validating identifier values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum IdentifierError {
	/// Identifiers cannot be empty.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Identifier kind label.
		kind: &'static str,
	},
	/// Identifiers are bounded in length.
	#[error("{kind} exceeds {limit} characters.")]
	TooLong {
		/// Identifier kind label.
		kind: &'static str,
		/// Maximum accepted length.
		limit: usize,
	},
	/// Identifiers cannot contain whitespace or control characters.
	#[error("{kind} contains whitespace or control characters.")]
	InvalidCharacters {
		/// Identifier kind label.
		kind: &'static str,
	},
}

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.len() > MAX_IDENTIFIER_LEN {
		return Err(IdentifierError::TooLong { kind, limit: MAX_IDENTIFIER_LEN });
	}
	if view.chars().any(|c| c.is_whitespace() || c.is_control()) {
		return Err(IdentifierError::InvalidCharacters { kind });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn realm_accepts_numeric_company_ids() {
		let realm = RealmId::new("9130000000000").expect("Numeric realm should be valid.");

		assert_eq!(realm.as_ref(), "9130000000000");
		assert_eq!(format!("{realm:?}"), "RealmId(9130000000000)");
		assert_eq!(realm.to_string(), "9130000000000");
	}

	#[test]
	fn identifiers_reject_bad_input() {
		assert!(matches!(RealmId::new(""), Err(IdentifierError::Empty { .. })));
		assert!(matches!(
			ClientId::new("has space"),
			Err(IdentifierError::InvalidCharacters { .. })
		));
		assert!(matches!(
			RealmId::new("x".repeat(200)),
			Err(IdentifierError::TooLong { .. })
		));
	}

	#[test]
	fn serde_round_trips_through_validation() {
		let realm: RealmId =
			serde_json::from_str("\"4620816365\"").expect("Valid realm JSON should deserialize.");

		assert_eq!(realm.as_ref(), "4620816365");
		assert!(serde_json::from_str::<RealmId>("\"\"").is_err());
	}
}
