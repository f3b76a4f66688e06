use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecklistError {
    #[error("Please select both industry and location.")]
    MissingSelection,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Input too long: max {max}, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Forbidden character: {0:?}")]
    ForbiddenCharacter(char),

    #[error("Unknown checklist status: {0}")]
    UnknownStatus(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] toml::de::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ChecklistError>;
