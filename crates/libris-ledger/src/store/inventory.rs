//! # Book Inventory
//!
//! Titles and their copy counts.
//!
//! ## Copy Count Transitions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   available = 0 ◄──── decrement ──── available = n ──── increment ────► │
//! │        │                                                   │            │
//! │        ▼                                                   ▼            │
//! │   decrement → Unavailable              available == total → Invariant   │
//! │                                                          Violation      │
//! │                                                                         │
//! │   0 <= available_copies <= total_copies, always                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::debug;
use uuid::Uuid;

use libris_core::validation::{
    normalize_isbn, validate_copies, validate_new_title, validate_search_query,
    validate_title_details,
};
use libris_core::{
    Availability, CatalogQuery, CoreError, CoreResult, NewTitle, Title, TitleDetails,
    ValidationError,
};

/// Titles keyed by id, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    titles: HashMap<String, Title>,
    order: Vec<String>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Inserts a fully formed title (seed data, imports).
    ///
    /// ## Errors
    /// - `Validation` if copy counts are out of range
    /// - `Duplicate` if the id or ISBN is taken
    pub fn insert(&mut self, title: Title) -> CoreResult<()> {
        validate_copies(title.total_copies, title.available_copies)?;

        if self.titles.contains_key(&title.id) {
            return Err(CoreError::Duplicate {
                field: "id".to_string(),
                value: title.id,
            });
        }
        self.ensure_isbn_free(&title.isbn, None)?;

        debug!(title_id = %title.id, isbn = %title.isbn, "Inserting title");
        self.order.push(title.id.clone());
        self.titles.insert(title.id.clone(), title);
        Ok(())
    }

    /// Adds a title from the admin form and assigns it a new id.
    pub fn add_title(&mut self, new_title: NewTitle) -> CoreResult<Title> {
        validate_new_title(&new_title)?;

        let title = Title {
            id: Uuid::new_v4().to_string(),
            title: new_title.title.trim().to_string(),
            author: new_title.author.trim().to_string(),
            isbn: new_title.isbn.trim().to_string(),
            publication_year: new_title.publication_year,
            publisher: new_title.publisher.trim().to_string(),
            genre: new_title.genre.trim().to_string(),
            description: new_title.description,
            cover_image: new_title.cover_image,
            total_copies: new_title.total_copies,
            available_copies: new_title.available_copies,
        };

        self.insert(title.clone())?;
        Ok(title)
    }

    pub fn get(&self, title_id: &str) -> CoreResult<&Title> {
        self.titles
            .get(title_id)
            .ok_or_else(|| CoreError::not_found("Title", title_id))
    }

    fn get_mut(&mut self, title_id: &str) -> CoreResult<&mut Title> {
        self.titles
            .get_mut(title_id)
            .ok_or_else(|| CoreError::not_found("Title", title_id))
    }

    /// Copy counts of a title.
    pub fn get_availability(&self, title_id: &str) -> CoreResult<Availability> {
        self.get(title_id).map(Title::availability)
    }

    /// Takes one copy off the shelf.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown title
    /// - `Unavailable` if no copies are left; nothing changes
    pub fn decrement_available(&mut self, title_id: &str) -> CoreResult<Availability> {
        let title = self.get_mut(title_id)?;

        if title.available_copies == 0 {
            return Err(CoreError::Unavailable {
                title_id: title_id.to_string(),
            });
        }

        title.available_copies -= 1;
        debug!(title_id = %title_id, available = title.available_copies, "Copy checked out");
        Ok(title.availability())
    }

    /// Puts one copy back on the shelf.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown title
    /// - `InvariantViolation` if every copy is already on the shelf
    pub fn increment_available(&mut self, title_id: &str) -> CoreResult<Availability> {
        self.check_increment(title_id)?;

        let title = self.get_mut(title_id)?;
        title.available_copies += 1;
        debug!(title_id = %title_id, available = title.available_copies, "Copy checked in");
        Ok(title.availability())
    }

    /// Runs the checks of [`Inventory::increment_available`] without
    /// changing anything.
    pub fn check_increment(&self, title_id: &str) -> CoreResult<()> {
        let title = self.get(title_id)?;

        if title.available_copies >= title.total_copies {
            return Err(CoreError::InvariantViolation(format!(
                "title {} already has all {} copies on the shelf",
                title_id, title.total_copies
            )));
        }
        Ok(())
    }

    /// Replaces the bibliographic fields. Copy counts are untouched.
    pub fn update_details(&mut self, title_id: &str, details: TitleDetails) -> CoreResult<Title> {
        validate_title_details(&details)?;
        self.get(title_id)?;
        self.ensure_isbn_free(&details.isbn, Some(title_id))?;

        let title = self.get_mut(title_id)?;
        title.title = details.title.trim().to_string();
        title.author = details.author.trim().to_string();
        title.isbn = details.isbn.trim().to_string();
        title.publication_year = details.publication_year;
        title.publisher = details.publisher.trim().to_string();
        title.genre = details.genre.trim().to_string();
        title.description = details.description;
        title.cover_image = details.cover_image;
        Ok(title.clone())
    }

    /// Changes the number of copies the library owns.
    ///
    /// The number of copies out on loan stays the same, so the available
    /// count moves by the same delta as the total.
    ///
    /// ## Errors
    /// `Validation` if `total` is zero or below the copies on loan.
    pub fn set_total_copies(&mut self, title_id: &str, total: u32) -> CoreResult<Title> {
        let title = self.get_mut(title_id)?;
        let on_loan = title.on_loan();

        if total == 0 {
            return Err(ValidationError::MustBePositive {
                field: "total_copies".to_string(),
            }
            .into());
        }
        if total < on_loan {
            return Err(ValidationError::OutOfRange {
                field: "total_copies".to_string(),
                min: i64::from(on_loan),
                max: i64::from(u32::MAX),
            }
            .into());
        }

        title.total_copies = total;
        title.available_copies = total - on_loan;
        Ok(title.clone())
    }

    /// Removes a title. The ledger checks for active loans first.
    pub fn remove(&mut self, title_id: &str) -> CoreResult<Title> {
        let title = self
            .titles
            .remove(title_id)
            .ok_or_else(|| CoreError::not_found("Title", title_id))?;
        self.order.retain(|id| id != title_id);
        Ok(title)
    }

    /// All titles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Title> {
        self.order.iter().filter_map(move |id| self.titles.get(id))
    }

    /// Titles matching a catalog query, in insertion order.
    pub fn search(&self, query: &CatalogQuery) -> CoreResult<Vec<Title>> {
        let term = validate_search_query(&query.term)?;
        let query = CatalogQuery {
            term,
            ..query.clone()
        };

        let results: Vec<Title> = self.iter().filter(|t| query.matches(t)).cloned().collect();
        debug!(term = %query.term, genre = %query.genre, count = results.len(), "Catalog search");
        Ok(results)
    }

    /// Distinct genres, sorted.
    pub fn genres(&self) -> Vec<String> {
        self.iter()
            .map(|t| t.genre.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn ensure_isbn_free(&self, isbn: &str, except_id: Option<&str>) -> CoreResult<()> {
        let wanted = normalize_isbn(isbn);
        let taken = self
            .titles
            .values()
            .any(|t| Some(t.id.as_str()) != except_id && normalize_isbn(&t.isbn) == wanted);

        if taken {
            return Err(CoreError::Duplicate {
                field: "isbn".to_string(),
                value: isbn.to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
