//

use std::any::Any;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use log::trace;

use crate::core::error::ObjectError;

pub type Value = Box<dyn Any + Send + Sync>;
pub type Args = Vec<Value>;

// an installed method; the receiver is passed explicitly on every call
pub type MethodFn =
    Arc<dyn Fn(&mut dyn Extensible, Args) -> Result<Value, ObjectError> + Send + Sync>;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait Object: AsAny + Send + 'static {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_extensible(&self) -> Option<&dyn Extensible> {
        None
    }

    fn as_extensible_mut(&mut self) -> Option<&mut dyn Extensible> {
        None
    }
}

// per-instance member tables; only the decorator path can write them
pub struct Extension {
    methods: HashMap<String, MethodFn>,
    properties: HashMap<String, Value>,
}

impl Extension {
    pub fn new() -> Self {
        Extension {
            methods: HashMap::new(),
            properties: HashMap::new(),
        }
    }

    pub(crate) fn install_method(&mut self, name: &str, method: MethodFn) {
        self.methods.insert(name.to_string(), method);
    }

    pub(crate) fn install_property(&mut self, name: &str, value: Value) {
        self.properties.insert(name.to_string(), value);
    }

    pub(crate) fn method(&self, name: &str) -> Option<MethodFn> {
        self.methods.get(name).cloned()
    }

    pub(crate) fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

impl Default for Extension {
    fn default() -> Self {
        Extension::new()
    }
}

impl Debug for Extension {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        let mut properties: Vec<&str> = self.properties.keys().map(String::as_str).collect();
        methods.sort_unstable();
        properties.sort_unstable();
        f.debug_struct("Extension")
            .field("methods", &methods)
            .field("properties", &properties)
            .finish()
    }
}

pub trait Extensible: Object {
    fn extension(&self) -> &Extension;
    fn extension_mut(&mut self) -> &mut Extension;

    // methods defined on the concrete type itself, reachable from wrappers
    fn has_method(&self, _name: &str) -> bool {
        false
    }

    fn call_method(&mut self, name: &str, _args: Args) -> Result<Value, ObjectError> {
        Err(ObjectError::UndefinedMethod {
            type_name: self.type_name(),
            method: name.to_string(),
        })
    }

    // consulted when the method table misses
    fn fallback_call(&mut self, _name: &str, _args: Args) -> Option<Result<Value, ObjectError>> {
        None
    }

    // consulted when the property table misses
    fn fallback_get(&self, _name: &str) -> Option<&dyn Any> {
        None
    }
}

pub trait Dispatch {
    fn invoke(&mut self, name: &str, args: Args) -> Result<Value, ObjectError>;
    fn read_property(&self, name: &str) -> Option<&dyn Any>;
}

impl Dispatch for dyn Extensible {
    fn invoke(&mut self, name: &str, args: Args) -> Result<Value, ObjectError> {
        // clone the callable out of the table first, it may re-enter dispatch
        if let Some(method) = self.extension().method(name) {
            trace!("dispatch {}::{} through method table", self.type_name(), name);
            return (*method)(self, args);
        }
        if let Some(result) = self.fallback_call(name, args) {
            return result;
        }
        Err(ObjectError::UndefinedMethod {
            type_name: self.type_name(),
            method: name.to_string(),
        })
    }

    fn read_property(&self, name: &str) -> Option<&dyn Any> {
        if let Some(value) = self.extension().property(name) {
            return Some(&**value as &dyn Any);
        }
        self.fallback_get(name)
    }
}

impl<T: Extensible> Dispatch for T {
    fn invoke(&mut self, name: &str, args: Args) -> Result<Value, ObjectError> {
        (self as &mut dyn Extensible).invoke(name, args)
    }

    fn read_property(&self, name: &str) -> Option<&dyn Any> {
        (self as &dyn Extensible).read_property(name)
    }
}
