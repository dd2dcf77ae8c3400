/// Every error the API can return resolves to exactly one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// We don't know what caused this error; the report behind it has been
    /// logged on the server.
    Unknown,
    /// The request itself is malformed: bad sort key, bad vote value,
    /// malformed id, unparsable body.
    InvalidRequest,
    /// The requested target does not exist.
    NotFound,
    /// The caller lacks a valid identity, or is acting on behalf of
    /// somebody else.
    AccessDenied,
    /// A uniqueness constraint (username, topic name) is already taken.
    Conflict,
}

impl ErrorCategory {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::InvalidRequest => "invalid_request",
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCategory::Unknown.code(), "unknown");
        assert_eq!(ErrorCategory::InvalidRequest.code(), "invalid_request");
        assert_eq!(ErrorCategory::NotFound.code(), "not_found");
        assert_eq!(ErrorCategory::AccessDenied.code(), "access_denied");
        assert_eq!(ErrorCategory::Conflict.code(), "conflict");
    }
}
