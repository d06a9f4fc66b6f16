//! # Borrower Directory
//!
//! Library members known to the ledger. Borrowing, paying and summaries all
//! fail with `NotFound` for an id that is not registered here.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use libris_core::validation::{validate_email, validate_new_borrower};
use libris_core::{Borrower, CoreError, CoreResult, NewBorrower, Role};

#[derive(Debug, Clone, Default)]
pub struct BorrowerDirectory {
    borrowers: HashMap<String, Borrower>,
    order: Vec<String>,
}

impl BorrowerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Inserts a fully formed borrower (seed data, imports).
    pub fn insert(&mut self, borrower: Borrower) -> CoreResult<()> {
        validate_email(&borrower.email)?;

        if self.borrowers.contains_key(&borrower.id) {
            return Err(CoreError::Duplicate {
                field: "id".to_string(),
                value: borrower.id,
            });
        }
        self.ensure_email_free(&borrower.email, None)?;

        debug!(borrower_id = %borrower.id, "Inserting borrower");
        self.order.push(borrower.id.clone());
        self.borrowers.insert(borrower.id.clone(), borrower);
        Ok(())
    }

    /// Registers a new borrower from the admin form.
    pub fn register(&mut self, form: NewBorrower, member_since: NaiveDate) -> CoreResult<Borrower> {
        validate_new_borrower(&form)?;

        let borrower = Borrower {
            id: Uuid::new_v4().to_string(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            role: form.role,
            member_since,
            phone_number: form.phone_number,
            address: form.address,
        };

        self.insert(borrower.clone())?;
        Ok(borrower)
    }

    pub fn get(&self, borrower_id: &str) -> CoreResult<&Borrower> {
        self.borrowers
            .get(borrower_id)
            .ok_or_else(|| CoreError::not_found("Borrower", borrower_id))
    }

    pub fn contains(&self, borrower_id: &str) -> bool {
        self.borrowers.contains_key(borrower_id)
    }

    /// Replaces the editable fields of a borrower. `member_since` is kept.
    pub fn update(&mut self, borrower_id: &str, form: NewBorrower) -> CoreResult<Borrower> {
        validate_new_borrower(&form)?;
        self.get(borrower_id)?;
        self.ensure_email_free(&form.email, Some(borrower_id))?;

        let borrower = self
            .borrowers
            .get_mut(borrower_id)
            .ok_or_else(|| CoreError::not_found("Borrower", borrower_id))?;
        borrower.name = form.name.trim().to_string();
        borrower.email = form.email.trim().to_string();
        borrower.role = form.role;
        borrower.phone_number = form.phone_number;
        borrower.address = form.address;
        Ok(borrower.clone())
    }

    /// Removes a borrower. The ledger checks for active loans first.
    pub fn remove(&mut self, borrower_id: &str) -> CoreResult<Borrower> {
        let borrower = self
            .borrowers
            .remove(borrower_id)
            .ok_or_else(|| CoreError::not_found("Borrower", borrower_id))?;
        self.order.retain(|id| id != borrower_id);
        Ok(borrower)
    }

    /// All borrowers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Borrower> {
        self.order.iter().filter_map(move |id| self.borrowers.get(id))
    }

    /// Case-insensitive match on name or email, optionally by role.
    pub fn search<'a>(&'a self, term: &str, role: Option<Role>) -> impl Iterator<Item = &'a Borrower> + 'a {
        let term = term.trim().to_lowercase();
        self.iter().filter(move |b| {
            let term_ok = term.is_empty()
                || b.name.to_lowercase().contains(&term)
                || b.email.to_lowercase().contains(&term);
            let role_ok = role.map_or(true, |r| b.role == r);
            term_ok && role_ok
        })
    }

    fn ensure_email_free(&self, email: &str, except_id: Option<&str>) -> CoreResult<()> {
        let wanted = email.trim().to_lowercase();
        let taken = self
            .borrowers
            .values()
            .any(|b| Some(b.id.as_str()) != except_id && b.email.to_lowercase() == wanted);

        if taken {
            return Err(CoreError::Duplicate {
                field: "email".to_string(),
                value: email.trim().to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, role: Role) -> NewBorrower {
        NewBorrower {
            name: name.to_string(),
            email: email.to_string(),
            role,
            phone_number: None,
            address: None,
        }
    }

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 5, 15).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut dir = BorrowerDirectory::new();
        let jane = dir
            .register(form("Jane Smith", "jane@example.com", Role::Member), since())
            .unwrap();

        assert_eq!(dir.get(&jane.id).unwrap().name, "Jane Smith");
        assert_eq!(jane.member_since, since());
        assert!(matches!(dir.get("nobody"), Err(CoreError::NotFound { .. })));
    }

    #[test]
    fn test_duplicate_email_is_rejected() {
        let mut dir = BorrowerDirectory::new();
        dir.register(form("Jane", "jane@example.com", Role::Member), since())
            .unwrap();
        let err = dir
            .register(form("Other Jane", "JANE@example.com", Role::Member), since())
            .unwrap_err();
        assert!(matches!(err, CoreError::Duplicate { .. }));
    }

    #[test]
    fn test_update_keeps_member_since() {
        let mut dir = BorrowerDirectory::new();
        let jane = dir
            .register(form("Jane", "jane@example.com", Role::Member), since())
            .unwrap();

        let updated = dir
            .update(&jane.id, form("Jane Doe", "jane@example.com", Role::Admin))
            .unwrap();
        assert_eq!(updated.name, "Jane Doe");
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.member_since, since());
    }

    #[test]
    fn test_search_by_term_and_role() {
        let mut dir = BorrowerDirectory::new();
        dir.register(form("John Doe", "user@example.com", Role::Member), since())
            .unwrap();
        dir.register(form("Admin", "admin@example.com", Role::Admin), since())
            .unwrap();

        assert_eq!(dir.search("", None).count(), 2);
        assert_eq!(dir.search("JOHN", None).count(), 1);
        assert_eq!(dir.search("example", Some(Role::Admin)).count(), 1);
    }

    #[test]
    fn test_remove() {
        let mut dir = BorrowerDirectory::new();
        let jane = dir
            .register(form("Jane", "jane@example.com", Role::Member), since())
            .unwrap();
        dir.remove(&jane.id).unwrap();
        assert!(dir.is_empty());
        assert!(dir.remove(&jane.id).is_err());
    }
}
