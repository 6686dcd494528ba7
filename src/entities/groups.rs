use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;
use crate::validation::{FieldErrors, Validate};

/// Generic label/value row backing the "Category" and "Type" pick lists.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub group_name: String,
    pub group_type: String,
    pub group_value: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GroupPayload {
    pub group_name: String,
    pub group_type: String,
    pub group_value: i32,
}

impl Validate for GroupPayload {
    fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors.required("groupName", &self.group_name);
        errors.max_len("groupName", &self.group_name, 100);
        errors.required("groupType", &self.group_type);
        errors.max_len("groupType", &self.group_type, 100);
        errors.into_result()
    }
}
