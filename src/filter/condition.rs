use serde::Deserialize;

use super::error::FilterError;
use super::types::{CompareOp, Condition, SqlParam, SqlResult};
use crate::database::models::ApartmentStatus;
use crate::policy::ListingScope;

/// Raw filter parameters as they arrive on the query string. Everything
/// is optional and untyped; the builder validates and pairs them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilterParams {
    pub size_op: Option<String>,
    pub size_val: Option<String>,
    pub price_op: Option<String>,
    pub price_val: Option<String>,
    pub rooms_op: Option<String>,
    pub rooms_val: Option<String>,
}

/// An AND-combined set of field constraints over the apartments table.
/// Built from user-supplied filter parameters, then widened with the
/// role scope the policy engine forces.
#[derive(Debug, Default)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// Validate and pair the filter triples. Operators and values are
    /// each checked whenever present; a triple only contributes a
    /// condition when both halves are supplied.
    pub fn from_params(params: &ListingFilterParams) -> Result<Self, FilterError> {
        let mut predicate = Predicate::default();

        let size_op = parse_op("sizeOp", &params.size_op)?;
        let size_val = parse_number("sizeVal", &params.size_val)?;
        if let (Some(op), Some(val)) = (size_op, size_val) {
            predicate.push("floor_area_size", op, SqlParam::Float(val));
        }

        let price_op = parse_op("priceOp", &params.price_op)?;
        let price_val = parse_number("priceVal", &params.price_val)?;
        if let (Some(op), Some(val)) = (price_op, price_val) {
            predicate.push("price_per_month", op, SqlParam::Float(val));
        }

        let rooms_op = parse_op("roomsOp", &params.rooms_op)?;
        let rooms_val = parse_integer("roomsVal", &params.rooms_val)?;
        if let (Some(op), Some(val)) = (rooms_op, rooms_val) {
            predicate.push("number_of_rooms", op, SqlParam::Int(val));
        }

        Ok(predicate)
    }

    /// Merge the role scope as a further AND term. Not optional
    /// post-filtering: the scope constrains the query itself.
    pub fn apply_scope(&mut self, scope: &ListingScope) {
        match scope {
            ListingScope::All => {}
            ListingScope::AvailableOnly => {
                self.push("status", CompareOp::Eq, SqlParam::Status(ApartmentStatus::Available));
            }
            ListingScope::OwnedBy(owner) => {
                self.push("realtor", CompareOp::Eq, SqlParam::Uuid(*owner));
            }
        }
    }

    fn push(&mut self, column: &'static str, op: CompareOp, value: SqlParam) {
        self.conditions.push(Condition { column, op, value });
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Render to a WHERE fragment with `$n` placeholders starting after
    /// `start_index` parameters already bound by the caller.
    pub fn to_sql(&self, start_index: usize) -> SqlResult {
        let mut parts = Vec::with_capacity(self.conditions.len());
        let mut params = Vec::with_capacity(self.conditions.len());

        for condition in &self.conditions {
            params.push(condition.value.clone());
            parts.push(format!(
                "\"{}\" {} ${}",
                condition.column,
                condition.op.to_sql(),
                start_index + params.len()
            ));
        }

        SqlResult {
            clause: parts.join(" AND "),
            params,
        }
    }
}

fn parse_op(field: &'static str, raw: &Option<String>) -> Result<Option<CompareOp>, FilterError> {
    raw.as_deref().map(|r| CompareOp::parse(field, r)).transpose()
}

fn parse_number(field: &'static str, raw: &Option<String>) -> Result<Option<f64>, FilterError> {
    let Some(raw) = raw.as_deref() else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(FilterError::InvalidNumber { field }),
    }
}

fn parse_integer(field: &'static str, raw: &Option<String>) -> Result<Option<i64>, FilterError> {
    let Some(raw) = raw.as_deref() else {
        return Ok(None);
    };
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Some(n));
    }
    // Distinguish a fractional value from something that is not numeric
    // at all, to keep the message precise
    if raw.parse::<f64>().map(|n| n.is_finite()).unwrap_or(false) {
        Err(FilterError::InvalidInteger { field })
    } else {
        Err(FilterError::InvalidNumber { field })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn params(pairs: &[(&str, &str)]) -> ListingFilterParams {
        let mut p = ListingFilterParams::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "sizeOp" => p.size_op = v,
                "sizeVal" => p.size_val = v,
                "priceOp" => p.price_op = v,
                "priceVal" => p.price_val = v,
                "roomsOp" => p.rooms_op = v,
                "roomsVal" => p.rooms_val = v,
                other => panic!("unknown param {other}"),
            }
        }
        p
    }

    #[test]
    fn empty_params_build_empty_predicate() {
        let predicate = Predicate::from_params(&ListingFilterParams::default()).unwrap();
        assert!(predicate.is_empty());
        assert_eq!(predicate.to_sql(0).clause, "");
    }

    #[test]
    fn triples_combine_with_and() {
        let predicate = Predicate::from_params(&params(&[
            ("sizeOp", "gt"),
            ("sizeVal", "90"),
            ("roomsOp", "eq"),
            ("roomsVal", "3"),
        ]))
        .unwrap();

        let sql = predicate.to_sql(0);
        assert_eq!(sql.clause, "\"floor_area_size\" > $1 AND \"number_of_rooms\" = $2");
        assert_eq!(sql.params, vec![SqlParam::Float(90.0), SqlParam::Int(3)]);
    }

    #[test]
    fn start_index_offsets_placeholders() {
        let predicate = Predicate::from_params(&params(&[("priceOp", "lt"), ("priceVal", "250")])).unwrap();
        let sql = predicate.to_sql(2);
        assert_eq!(sql.clause, "\"price_per_month\" < $3");
    }

    #[test]
    fn unsupported_operator_names_field_and_allowed_set() {
        let err = Predicate::from_params(&params(&[("priceOp", "lte"), ("priceVal", "100")])).unwrap_err();
        assert_eq!(err.to_string(), "\"priceOp\" must be one of [gt, lt, eq]");
    }

    #[test]
    fn operator_without_value_is_still_validated() {
        let err = Predicate::from_params(&params(&[("sizeOp", "between")])).unwrap_err();
        assert_eq!(err, FilterError::UnsupportedOperator { field: "sizeOp" });

        // A valid operator without a value imposes no constraint
        let predicate = Predicate::from_params(&params(&[("sizeOp", "gt")])).unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn value_without_operator_imposes_no_constraint() {
        let predicate = Predicate::from_params(&params(&[("sizeVal", "90")])).unwrap();
        assert!(predicate.is_empty());
    }

    #[test]
    fn rooms_value_must_be_an_integer() {
        let err = Predicate::from_params(&params(&[("roomsOp", "eq"), ("roomsVal", "2.5")])).unwrap_err();
        assert_eq!(err.to_string(), "\"roomsVal\" must be an integer");

        let err = Predicate::from_params(&params(&[("roomsOp", "eq"), ("roomsVal", "two")])).unwrap_err();
        assert_eq!(err.to_string(), "\"roomsVal\" must be a number");
    }

    #[test]
    fn numeric_values_must_be_finite() {
        let err = Predicate::from_params(&params(&[("sizeOp", "gt"), ("sizeVal", "inf")])).unwrap_err();
        assert_eq!(err, FilterError::InvalidNumber { field: "sizeVal" });
    }

    #[test]
    fn scope_merges_as_additional_condition() {
        let mut predicate = Predicate::from_params(&params(&[("sizeOp", "gt"), ("sizeVal", "90")])).unwrap();
        predicate.apply_scope(&ListingScope::AvailableOnly);
        let sql = predicate.to_sql(0);
        assert_eq!(sql.clause, "\"floor_area_size\" > $1 AND \"status\" = $2");
        assert_eq!(sql.params[1], SqlParam::Status(ApartmentStatus::Available));

        let owner = Uuid::new_v4();
        let mut predicate = Predicate::default();
        predicate.apply_scope(&ListingScope::OwnedBy(owner));
        let sql = predicate.to_sql(0);
        assert_eq!(sql.clause, "\"realtor\" = $1");
        assert_eq!(sql.params, vec![SqlParam::Uuid(owner)]);
    }

    #[test]
    fn admin_scope_adds_nothing() {
        let mut predicate = Predicate::default();
        predicate.apply_scope(&ListingScope::All);
        assert!(predicate.is_empty());
    }
}
