use std::fmt;
use std::sync::Arc;

/// Caller authenticated at login, held for the session only
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    username: String,
    password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Decides whether a mailbox/password pair may log in
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, username: &str, password: &str) -> bool;
}

/// Resolves a dialed number into a transfer destination
pub trait DialOutDirectory: Send + Sync {
    fn resolve(&self, number: &str) -> Option<String>;
}

/// Resolves an extension into the mailbox that receives the message
pub trait ExtensionDirectory: Send + Sync {
    fn lookup(&self, extension: &str) -> Option<String>;
}

/// Accepts exactly one mailbox/password pair
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialValidator for StaticCredentials {
    fn validate(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Accepts a single number and dials it as a `tel:` URI
#[derive(Debug, Clone)]
pub struct FixedDialOut {
    number: String,
}

impl FixedDialOut {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
        }
    }
}

impl DialOutDirectory for FixedDialOut {
    fn resolve(&self, number: &str) -> Option<String> {
        (number == self.number).then(|| format!("tel:{}", number))
    }
}

/// Accepts a single extension
#[derive(Debug, Clone)]
pub struct FixedExtension {
    extension: String,
}

impl FixedExtension {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl ExtensionDirectory for FixedExtension {
    fn lookup(&self, extension: &str) -> Option<String> {
        (extension == self.extension).then(|| format!("mailbox-{}", extension))
    }
}

/// Collaborators the dialogue consults; shared across sessions
#[derive(Clone)]
pub struct DialogueServices {
    pub credentials: Arc<dyn CredentialValidator>,
    pub dial_out: Arc<dyn DialOutDirectory>,
    pub extensions: Arc<dyn ExtensionDirectory>,
}

impl DialogueServices {
    pub fn new(
        credentials: Arc<dyn CredentialValidator>,
        dial_out: Arc<dyn DialOutDirectory>,
        extensions: Arc<dyn ExtensionDirectory>,
    ) -> Self {
        Self {
            credentials,
            dial_out,
            extensions,
        }
    }
}

impl Default for DialogueServices {
    fn default() -> Self {
        Self::new(
            Arc::new(StaticCredentials::new("4069", "6522")),
            Arc::new(FixedDialOut::new("1234")),
            Arc::new(FixedExtension::new("1234")),
        )
    }
}

impl fmt::Debug for DialogueServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogueServices").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_credentials_need_both_parts() {
        let credentials = StaticCredentials::new("4069", "6522");
        assert!(credentials.validate("4069", "6522"));
        assert!(!credentials.validate("4069", "4243"));
        assert!(!credentials.validate("1111", "6522"));
    }

    #[test]
    fn fixed_directories() {
        assert_eq!(FixedDialOut::new("1234").resolve("1234").as_deref(), Some("tel:1234"));
        assert_eq!(FixedDialOut::new("1234").resolve("9999"), None);
        assert_eq!(
            FixedExtension::new("1234").lookup("1234").as_deref(),
            Some("mailbox-1234")
        );
        assert_eq!(FixedExtension::new("1234").lookup("9999"), None);
    }

    #[test]
    fn user_debug_hides_password() {
        let user = User::new("4069", "6522");
        let rendered = format!("{:?}", user);
        assert!(rendered.contains("4069"));
        assert!(!rendered.contains("6522"));
    }
}
