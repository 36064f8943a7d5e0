//

use std::any::{Any, TypeId};
use std::sync::Arc;

use log::debug;

use crate::core::error::{DecorateError, ObjectError};
use crate::core::object::{Args, Extensible, MethodFn, Object, Value};

// names with this prefix wrap the like-named method of the target's type
pub const WRAP_PREFIX: &str = "decorated";

// the genuine method of the target, handed to wrappers as a first-class value
pub type Original<'a> = dyn Fn(&mut dyn Extensible) -> Result<Value, ObjectError> + 'a;

pub type WrapFn = Arc<
    dyn for<'a> Fn(&'a Original<'a>, &'a mut dyn Extensible, Args) -> Result<Value, ObjectError>
        + Send
        + Sync,
>;

pub enum Decoration {
    Method(MethodFn),
    Wrapper(WrapFn),
    Property(Value),
}

impl Decoration {
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Extensible, Args) -> Result<Value, ObjectError> + Send + Sync + 'static,
    {
        Decoration::Method(Arc::new(f))
    }

    pub fn wrapper<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a Original<'a>, &'a mut dyn Extensible, Args) -> Result<Value, ObjectError>
            + Send
            + Sync
            + 'static,
    {
        Decoration::Wrapper(Arc::new(f))
    }

    pub fn property<V: Any + Send + Sync>(value: V) -> Self {
        Decoration::Property(Box::new(value))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Constraint {
    id: TypeId,
    name: &'static str,
}

impl Constraint {
    pub fn of<T: Any>() -> Self {
        Constraint {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    fn check(&self, target: &dyn Extensible) -> Result<(), DecorateError> {
        if Any::type_id(target.as_any()) == self.id {
            Ok(())
        } else {
            Err(DecorateError::TypeConstraint {
                type_name: target.type_name(),
                required: self.name,
            })
        }
    }
}

// hands a companion method checked access to the object it was attached to
pub struct Context<'a> {
    target: &'a mut dyn Extensible,
}

impl<'a> Context<'a> {
    pub(crate) fn new(target: &'a mut dyn Extensible) -> Self {
        Context { target }
    }

    // runs `f` only when the target is a `T`; no-op otherwise
    pub fn with<T: Any, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.target.as_any_mut().downcast_mut::<T>().map(f)
    }

    pub fn target(&mut self) -> &mut dyn Extensible {
        &mut *self.target
    }
}

// a bundle of named extension methods and data, attachable as one unit
pub trait Companion: Send + Sync {
    fn method_names(&self) -> Vec<String>;

    fn call(&self, name: &str, context: &mut Context, args: Args) -> Result<Value, ObjectError>;

    fn properties(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

pub struct Decorator;

impl Decorator {
    pub fn attach(
        target: &mut dyn Object,
        name: &str,
        value: Decoration,
    ) -> Result<(), DecorateError> {
        Self::attach_with(target, name, value, None)
    }

    pub fn attach_with(
        target: &mut dyn Object,
        name: &str,
        value: Decoration,
        constraint: Option<Constraint>,
    ) -> Result<(), DecorateError> {
        let type_name = target.type_name();
        let extensible = target
            .as_extensible_mut()
            .ok_or(DecorateError::NotDecoratable { type_name })?;
        if let Some(constraint) = constraint {
            constraint.check(&*extensible)?;
        }
        match value {
            Decoration::Method(method) => extensible.extension_mut().install_method(name, method),
            Decoration::Wrapper(wrapper) => Self::install_wrapper(extensible, name, wrapper)?,
            Decoration::Property(value) => extensible.extension_mut().install_property(name, value),
        }
        Ok(())
    }

    pub fn attach_all(
        target: &mut dyn Object,
        entries: impl IntoIterator<Item = (String, Decoration)>,
        constraint: Option<Constraint>,
    ) -> Result<(), DecorateError> {
        for (name, value) in entries {
            Self::attach_with(&mut *target, &name, value, constraint)?;
        }
        Ok(())
    }

    pub fn attach_from_object(
        target: &mut dyn Object,
        companion: Arc<dyn Companion>,
        constraint: Option<Constraint>,
    ) -> Result<(), DecorateError> {
        let names = companion.method_names();
        debug!(
            "attach {} companion methods to {}",
            names.len(),
            target.type_name()
        );
        for name in names {
            let instance = Arc::clone(&companion);
            let method_name = name.clone();
            let method: MethodFn = Arc::new(move |this, args| {
                let mut context = Context::new(this);
                instance.call(&method_name, &mut context, args)
            });
            Self::attach_with(&mut *target, &name, Decoration::Method(method), constraint)?;
        }
        for (name, value) in companion.properties() {
            Self::attach_with(&mut *target, &name, Decoration::Property(value), constraint)?;
        }
        Ok(())
    }

    // later companions overwrite earlier installations of the same name
    pub fn attach_from_objects(
        target: &mut dyn Object,
        companions: &[Arc<dyn Companion>],
        constraint: Option<Constraint>,
    ) -> Result<(), DecorateError> {
        for companion in companions {
            Self::attach_from_object(&mut *target, Arc::clone(companion), constraint)?;
        }
        Ok(())
    }

    // target.name(args) becomes wrapper(original, target, args); the genuine
    // method stays in place and runs only when the wrapper asks for it
    fn install_wrapper(
        target: &mut dyn Extensible,
        name: &str,
        wrapper: WrapFn,
    ) -> Result<(), DecorateError> {
        let base_name = match name.strip_prefix(WRAP_PREFIX) {
            Some(rest) => rest.trim_start_matches('_'),
            None => name,
        };
        if !target.has_method(base_name) {
            return Err(DecorateError::MissingOriginalMethod {
                type_name: target.type_name(),
                method: base_name.to_string(),
            });
        }
        debug!("wrap {}::{} as {}", target.type_name(), base_name, name);
        let base = base_name.to_string();
        let method: MethodFn = Arc::new(move |this, args| {
            let original = |this: &mut dyn Extensible| this.call_method(&base, Args::new());
            (*wrapper)(&original, this, args)
        });
        target.extension_mut().install_method(name, method);
        Ok(())
    }
}
