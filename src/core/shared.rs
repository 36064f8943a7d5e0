//

use std::any::{Any, TypeId};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::decorator::{Companion, Constraint, Decoration, Decorator};
use crate::core::error::{DecorateError, ObjectError};
use crate::core::object::Object;

// clonable per-instance handle; all access goes through the instance lock
pub struct SharedObject(Arc<RwLock<dyn Object + Sync>>);

impl SharedObject {
    pub fn new<T: Object + Sync>(content: T) -> Self {
        SharedObject(Arc::new(RwLock::new(content)))
    }

    pub fn read(&self) -> Result<ReadShared, ObjectError> {
        Ok(ReadShared(
            self.0.try_read().map_err(|_| ObjectError::AccessConflict)?,
        ))
    }

    pub fn write(&self) -> Result<WriteShared, ObjectError> {
        Ok(WriteShared(
            self.0
                .try_write()
                .map_err(|_| ObjectError::AccessConflict)?,
        ))
    }

    pub fn share(&self) -> SharedObject {
        SharedObject(Arc::clone(&self.0))
    }

    pub fn decorate(&self, name: &str, value: Decoration) -> Result<SharedObject, DecorateError> {
        self.decorate_with(name, value, None)
    }

    pub fn decorate_with(
        &self,
        name: &str,
        value: Decoration,
        constraint: Option<Constraint>,
    ) -> Result<SharedObject, DecorateError> {
        Decorator::attach_with(&mut *self.write()?, name, value, constraint)?;
        Ok(self.share())
    }

    pub fn decorate_all(
        &self,
        entries: impl IntoIterator<Item = (String, Decoration)>,
        constraint: Option<Constraint>,
    ) -> Result<SharedObject, DecorateError> {
        Decorator::attach_all(&mut *self.write()?, entries, constraint)?;
        Ok(self.share())
    }

    pub fn decorate_from(
        &self,
        companion: Arc<dyn Companion>,
        constraint: Option<Constraint>,
    ) -> Result<SharedObject, DecorateError> {
        Decorator::attach_from_object(&mut *self.write()?, companion, constraint)?;
        Ok(self.share())
    }

    pub fn decorate_from_all(
        &self,
        companions: &[Arc<dyn Companion>],
        constraint: Option<Constraint>,
    ) -> Result<SharedObject, DecorateError> {
        Decorator::attach_from_objects(&mut *self.write()?, companions, constraint)?;
        Ok(self.share())
    }
}

pub struct ReadShared<'a>(RwLockReadGuard<'a, dyn Object + Sync>);

impl<'a> ReadShared<'a> {
    pub fn to_ref<T: Any>(&self) -> Result<&T, ObjectError> {
        let object = self.0.as_any();
        object.downcast_ref::<T>().ok_or(ObjectError::TypeMismatch {
            expected: TypeId::of::<T>(),
            actual: Any::type_id(object),
        })
    }
}

impl<'a> Deref for ReadShared<'a> {
    type Target = dyn Object + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

pub struct WriteShared<'a>(RwLockWriteGuard<'a, dyn Object + Sync>);

impl<'a> WriteShared<'a> {
    pub fn to_ref<T: Any>(&self) -> Result<&T, ObjectError> {
        let object = self.0.as_any();
        object.downcast_ref::<T>().ok_or(ObjectError::TypeMismatch {
            expected: TypeId::of::<T>(),
            actual: Any::type_id(object),
        })
    }

    pub fn to_mut<T: Any>(&mut self) -> Result<&mut T, ObjectError> {
        let actual = Any::type_id(self.0.as_any());
        self.0
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(ObjectError::TypeMismatch {
                expected: TypeId::of::<T>(),
                actual,
            })
    }
}

impl<'a> Deref for WriteShared<'a> {
    type Target = dyn Object + Sync;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl<'a> DerefMut for WriteShared<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.0
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::core::object::{Args, Dispatch, Value};
    use crate::objects::record::RecordObject;

    #[test]
    fn guard_downcasts_check_the_concrete_type() {
        let shared = SharedObject::new(RecordObject::new());
        assert!(shared.read().unwrap().to_ref::<i32>().is_err());
        assert!(shared.read().unwrap().to_ref::<RecordObject>().is_ok());
    }

    #[test]
    fn held_read_guard_makes_write_conflict() {
        let shared = SharedObject::new(RecordObject::new());
        {
            let _read = shared.read().unwrap();
            assert!(shared.read().is_ok());
            match shared.write() {
                Err(ObjectError::AccessConflict) => {}
                other => panic!("unexpected result: {:?}", other.map(|_| ())),
            }
        }
        assert!(shared.write().is_ok());
    }

    #[test]
    fn decorate_chains_left_to_right() {
        let shared = SharedObject::new(RecordObject::new())
            .decorate("rate", Decoration::property(0.1_f64))
            .unwrap()
            .decorate(
                "greet",
                Decoration::method(|_this, _args| Ok(Box::new("hi".to_string()) as Value)),
            )
            .unwrap();
        let guard = shared.read().unwrap();
        let extensible = guard.as_extensible().unwrap();
        assert!(extensible.read_property("rate").is_some());
    }

    #[test]
    fn decoration_crosses_threads() {
        let shared = SharedObject::new(RecordObject::new());
        let remote = shared.share();
        let handle = thread::spawn(move || {
            remote
                .decorate(
                    "greet",
                    Decoration::method(|_this, _args| Ok(Box::new("hi".to_string()) as Value)),
                )
                .unwrap();
        });
        handle.join().unwrap();

        let mut guard = shared.write().unwrap();
        let extensible = guard.as_extensible_mut().unwrap();
        let result = extensible.invoke("greet", Args::new()).unwrap();
        assert_eq!(*result.downcast::<String>().unwrap(), "hi");
    }

    #[test]
    fn contended_installs_all_land() {
        let shared = SharedObject::new(RecordObject::new());
        crossbeam::thread::scope(|scope| {
            for i in 0..4_i64 {
                let local = shared.share();
                scope.spawn(move |_| loop {
                    let result = local.decorate(
                        &format!("method{}", i),
                        Decoration::method(move |_this, _args| Ok(Box::new(i) as Value)),
                    );
                    match result {
                        Ok(_) => break,
                        Err(DecorateError::Object(ObjectError::AccessConflict)) => continue,
                        Err(other) => panic!("unexpected error: {}", other),
                    }
                });
            }
        })
        .unwrap();

        let mut guard = shared.write().unwrap();
        let extensible = guard.as_extensible_mut().unwrap();
        for i in 0..4_i64 {
            let result = extensible
                .invoke(&format!("method{}", i), Args::new())
                .unwrap();
            assert_eq!(*result.downcast::<i64>().unwrap(), i);
        }
    }
}
