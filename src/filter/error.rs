use thiserror::Error;

/// Rejections produced while translating filter parameters into a
/// predicate. Messages name the offending field and the violated rule;
/// the first failure aborts the request.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("\"{field}\" must be one of [gt, lt, eq]")]
    UnsupportedOperator { field: &'static str },

    #[error("\"{field}\" must be a number")]
    InvalidNumber { field: &'static str },

    #[error("\"{field}\" must be an integer")]
    InvalidInteger { field: &'static str },
}
