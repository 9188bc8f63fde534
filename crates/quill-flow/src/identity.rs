// SPDX-FileCopyrightText: 2026 Quill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps an inbound phone number to a user record, creating one if absent.
//!
//! Creation is an at-least-once upsert: concurrent resolves for the same
//! unseen phone all attempt the insert, the phone UNIQUE constraint picks
//! one winner, and losers re-fetch the winning row. Absence is a valid
//! input, never an error.

use std::sync::Arc;

use quill_core::types::User;
use quill_core::{QuillError, Store};

/// Resolves inbound phone numbers to user rows.
pub struct IdentityResolver {
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Returns the user for `phone`, creating one with only the phone set
    /// when none exists.
    pub async fn resolve(&self, phone: &str) -> Result<User, QuillError> {
        if let Some(user) = self.store.find_user_by_phone(phone).await? {
            return Ok(user);
        }

        let id = uuid::Uuid::new_v4().to_string();
        match self.store.create_user_with_phone(&id, phone).await {
            Ok(()) => {}
            // Lost the creation race; the winner's row is authoritative.
            Err(QuillError::Conflict { .. }) => {}
            Err(e) => return Err(e),
        }

        self.store
            .find_user_by_phone(phone)
            .await?
            .ok_or_else(|| {
                QuillError::Internal(format!("user vanished after upsert for phone {phone}"))
            })
    }
}
