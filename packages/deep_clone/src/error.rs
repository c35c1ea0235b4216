use std::rc::Rc;

use thiserror::Error;

/// Errors that can occur when cloning a value with [`Cloner::try_clone()`][crate::Cloner::try_clone].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CloneError {
    /// The value contained an object of a kind the cloner does not know how to copy.
    #[error("cloning objects of type '{type_name}' is not supported")]
    Unsupported {
        /// The type name of the object that could not be cloned.
        type_name: Rc<str>,
    },
}
