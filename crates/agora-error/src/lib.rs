mod category;
pub use self::category::ErrorCategory;

#[cfg(feature = "axum")]
mod axum;

pub mod ext;

use error_stack::{Context, Report};

/// Lazily typed [`std::result::Result`] where the error is an
/// [`error_stack::Report`] over some context type.
pub type Result<T, C> = error_stack::Result<T, C>;

/// An error as presented to API consumers: one taxonomy kind and an
/// optional short message.
///
/// Internal reports are converted into this at the service boundary;
/// anything without a recognized category surfaces as
/// [`ErrorCategory::Unknown`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ApiError {
    pub category: ErrorCategory,
    pub message: Option<String>,
}

impl ApiError {
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            message: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(ErrorCategory::Unknown)
    }

    pub fn message(self, message: impl Into<String>) -> Self {
        Self {
            category: self.category,
            message: Some(message.into()),
        }
    }

    /// The stable wire code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.category.code()
    }
}

impl PartialEq for ApiError {
    fn eq(&self, other: &Self) -> bool {
        self.category == other.category
    }
}

impl Eq for ApiError {}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code()),
            None => f.write_str(self.code()),
        }
    }
}

impl serde::Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let fields = 1 + usize::from(self.message.is_some());
        let mut state = serializer.serialize_struct("ApiError", fields)?;
        state.serialize_field("code", self.code())?;
        if let Some(message) = &self.message {
            state.serialize_field("message", message)?;
        }
        state.end()
    }
}

// Reports reaching this conversion carry no recognized category, so they
// resolve to `Unknown`. The full report is logged before the details are
// dropped from the response.
impl<C: Context> From<Report<C>> for ApiError {
    #[track_caller]
    fn from(report: Report<C>) -> Self {
        tracing::error!("internal error: {report:?}");
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    #[test]
    fn serializes_code_and_message() {
        let error = ApiError::new(ErrorCategory::NotFound).message("Could not find post");
        assert_json_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "code": "not_found", "message": "Could not find post" })
        );
    }

    #[test]
    fn omits_missing_message() {
        let error = ApiError::new(ErrorCategory::InvalidRequest);
        assert_json_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "code": "invalid_request" })
        );
    }

    #[test]
    fn reports_resolve_to_unknown() {
        #[derive(Debug, thiserror::Error)]
        #[error("boom")]
        struct Boom;

        let error = ApiError::from(Report::new(Boom));
        assert_eq!(error.category, ErrorCategory::Unknown);
    }
}
