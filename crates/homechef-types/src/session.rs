//! Caller session passed explicitly into every data source call.
//!
//! The session replaces ambient client state: whoever calls the data source
//! states who they are and how they authenticate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::SecretString;

/// Who is looking at the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	/// A home chef managing incoming orders.
	Chef,
	/// A customer following their own orders.
	Customer,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Chef => "chef",
			Role::Customer => "customer",
		}
	}

	/// Whether this role may move orders forward along the happy path.
	pub fn can_advance(&self) -> bool {
		matches!(self, Role::Chef)
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Identity and credentials of the current caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	/// Chef id or user id, depending on the role.
	pub principal_id: String,
	/// Role of the caller.
	pub role: Role,
	/// Bearer token for the order API.
	pub auth_token: SecretString,
}

impl Session {
	pub fn new(principal_id: impl Into<String>, role: Role, auth_token: SecretString) -> Self {
		Self {
			principal_id: principal_id.into(),
			role,
			auth_token,
		}
	}
}
