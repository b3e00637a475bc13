pub mod openai;

use std::fmt;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use tracing::warn;

/// Errors raised while talking to the refinement backend.
#[derive(Debug)]
pub enum Error {
    /// The backend could not be reached or rejected the request.
    ConnectFailed(String),

    /// The backend answered with something that could not be interpreted.
    ResponseParsingFailed(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConnectFailed(s) => write!(f, "Failed to connect to refinement backend: {}", s),
            Error::ResponseParsingFailed(s) => write!(f, "Failed to parse response: {}", s),
        }
    }
}

pub type SharedRefiner = Arc<dyn Refiner>;

/// Best-effort review text editor.
///
/// Implementations improve grammar, clarity and tone of a review without
/// changing its opinion. The collaborator is strictly optional: callers
/// must be prepared for any invocation to fail and to continue with the
/// unedited text (see [`refine_or_original`]).
pub trait Refiner: Send + Sync {

    /// Returns a cleaned-up copy of `content`.
    fn refine(&self, content: &str) -> Result<String, Error>;
}

/// Degradation wrapper around [`Refiner::refine`]: any failure is logged and
/// the input comes back unchanged, so refinement can never break the path
/// that requested it.
pub fn refine_or_original(refiner: &dyn Refiner, content: &str) -> String {
    match refiner.refine(content) {
        Ok(refined) => refined,
        Err(err) => {
            warn!("review refinement failed, keeping original text: {}", err);
            content.to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uppercase;

    impl Refiner for Uppercase {
        fn refine(&self, content: &str) -> Result<String, Error> {
            Ok(content.to_uppercase())
        }
    }

    struct AlwaysFails;

    impl Refiner for AlwaysFails {
        fn refine(&self, _content: &str) -> Result<String, Error> {
            Err(Error::ConnectFailed("timed out".to_owned()))
        }
    }

    #[test]
    fn wrapper_passes_through_successful_refinement() {
        assert_eq!(refine_or_original(&Uppercase, "great book"), "GREAT BOOK");
    }

    #[test]
    fn wrapper_returns_input_on_failure() {
        assert_eq!(refine_or_original(&AlwaysFails, "great book"), "great book");
    }
}
