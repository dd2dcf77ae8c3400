use agora_api_types::Sensitive;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// Secret key used to sign and verify login tokens (HS256).
    ///
    /// When unset, a key is generated for the lifetime of the process;
    /// set one explicitly so sessions survive restarts.
    #[serde(default = "Auth::generate_jwt_secret")]
    pub(crate) jwt_secret: Sensitive<String>,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: Self::generate_jwt_secret(),
        }
    }
}

impl Auth {
    pub const MIN_JWT_SECRET_LENGTH: usize = 24;

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.value()
    }

    /// Generates a new JWT secret key with alphanumeric and special
    /// characters scrambled into the minimum accepted length.
    pub(crate) fn generate_jwt_secret() -> Sensitive<String> {
        const CHARSET: &str =
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

        Sensitive::new(random_string::generate(
            Self::MIN_JWT_SECRET_LENGTH,
            CHARSET,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::Auth;

    #[test]
    fn generated_secret_meets_minimum_length() {
        let auth = Auth::default();
        assert!(auth.jwt_secret().len() >= Auth::MIN_JWT_SECRET_LENGTH);
    }
}
