//! Query-string options shared by the list endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::{ListOptions, SortOrder};

use super::validation::{ErrorCode, FieldName, field_error};

/// Largest page a client may request.
pub const LIST_LIMIT_MAX: u32 = 1000;

/// `?limit=50&order=asc`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum rows to return (1 to 1000); all rows when absent.
    pub limit: Option<u32>,
    /// `desc` (newest first, default) or `asc`.
    pub order: Option<String>,
}

impl ListQuery {
    /// Validate into port-level list options.
    pub fn into_options(self) -> Result<ListOptions, Error> {
        let order = match self.order.as_deref() {
            None | Some("desc") => SortOrder::NewestFirst,
            Some("asc") => SortOrder::OldestFirst,
            Some(_) => {
                return Err(field_error(
                    FieldName::new("order"),
                    ErrorCode::UnknownValue,
                    "order must be `asc` or `desc`",
                ));
            }
        };
        let mut options = ListOptions::default().with_order(order);
        if let Some(limit) = self.limit {
            if !(1..=LIST_LIMIT_MAX).contains(&limit) {
                return Err(field_error(
                    FieldName::new("limit"),
                    ErrorCode::OutOfRange,
                    format!("limit must be between 1 and {LIST_LIMIT_MAX}"),
                ));
            }
            options = options.with_limit(limit);
        }
        Ok(options)
    }
}
