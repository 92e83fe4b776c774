/// Outcome of a sign-in or sign-out attempt. A refused attempt is not an
/// error; `status` tells the person what to scan instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInOutResult {
    pub succeeded: bool,
    pub status: String,
}

impl SignInOutResult {
    pub fn success(status: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            status: status.into(),
        }
    }

    pub fn failure(status: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            status: status.into(),
        }
    }
}
