use uuid::Uuid;

use super::error::FilterError;
use crate::database::models::ApartmentStatus;

/// Comparison operators accepted on listing filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Eq,
}

impl CompareOp {
    /// Parse a raw operator string; `field` is the query-parameter name
    /// used in the rejection message.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, FilterError> {
        match raw {
            "gt" => Ok(CompareOp::Gt),
            "lt" => Ok(CompareOp::Lt),
            "eq" => Ok(CompareOp::Eq),
            _ => Err(FilterError::UnsupportedOperator { field }),
        }
    }

    pub fn to_sql(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "=",
        }
    }
}

/// A single field constraint of the form `column <op> value`
#[derive(Debug, Clone)]
pub struct Condition {
    pub column: &'static str,
    pub op: CompareOp,
    pub value: SqlParam,
}

/// Typed bind parameter. Columns are static identifiers chosen by the
/// builder; only values travel as parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Float(f64),
    Int(i64),
    Uuid(Uuid),
    Status(ApartmentStatus),
}

/// A rendered WHERE fragment plus its parameters, ready to append to a
/// base query.
#[derive(Debug, Clone)]
pub struct SqlResult {
    pub clause: String,
    pub params: Vec<SqlParam>,
}
