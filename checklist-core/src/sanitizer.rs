//! Input sanitization for checklist form fields
//!
//! Every user-supplied string goes through the same steps: Unicode NFC
//! normalisation, HTML tag stripping, trimming, then length and
//! control-character checks.

use crate::error::{ChecklistError, Result};
use crate::types::{ItemStatus, Selection};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Max length of an industry or location value
pub const MAX_SELECTION_LENGTH: usize = 64;

/// Max length of a control id (matches the `control_id` column width)
pub const MAX_CONTROL_ID_LENGTH: usize = 50;

/// Default max length of free-text notes
pub const DEFAULT_NOTES_MAX_LENGTH: usize = 2000;

/// Sanitized input for a status/notes update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemUpdate {
    pub control_id: String,
    pub status: ItemStatus,
    pub notes: String,
}

pub struct InputSanitizer {
    tag_regex: Regex,
    notes_max_length: usize,
}

impl InputSanitizer {
    pub fn new() -> Self {
        Self::with_notes_limit(DEFAULT_NOTES_MAX_LENGTH)
    }

    pub fn with_notes_limit(notes_max_length: usize) -> Self {
        // Pattern is a literal, compiling it cannot fail.
        // A tag needs a name right after `<`, so "a < b" is kept.
        let tag_regex = Regex::new(r"</?[A-Za-z!][^>]*>").unwrap();

        Self {
            tag_regex,
            notes_max_length,
        }
    }

    pub fn notes_max_length(&self) -> usize {
        self.notes_max_length
    }

    /// Normalise, strip tags and trim. `allow_whitespace_controls` lets
    /// newlines and tabs through for multi-line fields.
    pub fn sanitize_string(
        &self,
        input: &str,
        max_length: usize,
        allow_whitespace_controls: bool,
    ) -> Result<String> {
        let normalized: String = input.nfc().collect();
        let stripped = self.tag_regex.replace_all(&normalized, "");
        let cleaned = stripped.trim();

        let length = cleaned.chars().count();
        if length > max_length {
            return Err(ChecklistError::TooLong {
                max: max_length,
                actual: length,
            });
        }

        for ch in cleaned.chars() {
            let permitted = allow_whitespace_controls && matches!(ch, '\n' | '\r' | '\t');
            if ch.is_control() && !permitted {
                return Err(ChecklistError::ForbiddenCharacter(ch));
            }
        }

        Ok(cleaned.to_string())
    }

    /// Validate the generate form. Both fields must be present and non-empty
    /// once sanitized.
    pub fn sanitize_selection(
        &self,
        industry: Option<&str>,
        location: Option<&str>,
    ) -> Result<Selection> {
        let (Some(industry), Some(location)) = (industry, location) else {
            return Err(ChecklistError::MissingSelection);
        };

        let industry = self.sanitize_string(industry, MAX_SELECTION_LENGTH, false)?;
        let location = self.sanitize_string(location, MAX_SELECTION_LENGTH, false)?;

        Selection::new(industry, location)
    }

    /// Validate the update form. Missing notes clear the field.
    pub fn sanitize_update(
        &self,
        control_id: Option<&str>,
        status: Option<&str>,
        notes: Option<&str>,
    ) -> Result<ItemUpdate> {
        let control_id = self.sanitize_string(
            control_id.unwrap_or_default(),
            MAX_CONTROL_ID_LENGTH,
            false,
        )?;
        if control_id.is_empty() {
            return Err(ChecklistError::InvalidInput(
                "control_id is required".to_string(),
            ));
        }

        let status = match status {
            Some(raw) => self.sanitize_string(raw, MAX_SELECTION_LENGTH, false)?.parse()?,
            None => {
                return Err(ChecklistError::InvalidInput(
                    "status is required".to_string(),
                ))
            }
        };

        let notes = self.sanitize_string(notes.unwrap_or_default(), self.notes_max_length, true)?;

        Ok(ItemUpdate {
            control_id,
            status,
            notes,
        })
    }
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new()
    }
}
