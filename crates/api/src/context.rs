/// The acting user for a request.
///
/// Carries the handle an upstream authenticator vouched for; the market
/// resolves it to a registered user on every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    username: String,
}

impl ActorContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
