//

use std::any::TypeId;

use failure::Fail;

// dispatch and shared-handle failures, surfaced at call time
#[derive(Debug, Fail)]
pub enum ObjectError {
    #[fail(display = "call to undefined method {}::{}()", type_name, method)]
    UndefinedMethod {
        type_name: &'static str,
        method: String,
    },
    #[fail(display = "expected type {:?}, found {:?}", expected, actual)]
    TypeMismatch { expected: TypeId, actual: TypeId },
    #[fail(display = "access conflict on shared object")]
    AccessConflict,
}

// install-time validation failures, surfaced before any mutation
#[derive(Debug, Fail)]
pub enum DecorateError {
    #[fail(display = "{} cannot be decorated", type_name)]
    NotDecoratable { type_name: &'static str },
    #[fail(display = "{} does not satisfy required type {}", type_name, required)]
    TypeConstraint {
        type_name: &'static str,
        required: &'static str,
    },
    #[fail(display = "method {} not found in {}", method, type_name)]
    MissingOriginalMethod {
        type_name: &'static str,
        method: String,
    },
    #[fail(display = "{}", _0)]
    Object(#[fail(cause)] ObjectError),
}

impl From<ObjectError> for DecorateError {
    fn from(object_err: ObjectError) -> Self {
        DecorateError::Object(object_err)
    }
}
