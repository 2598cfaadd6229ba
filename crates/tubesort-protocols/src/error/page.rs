//! Page observation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Page source unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid page snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Item index {index} out of range (container has {len} items)")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_out_of_range_display() {
        let err = PageError::ItemOutOfRange { index: 7, len: 3 };
        let display = err.to_string();
        assert!(display.contains('7'));
        assert!(display.contains('3'));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "snapshot missing");
        let err = PageError::from(io_err);
        assert!(err.to_string().contains("snapshot missing"));
    }
}
