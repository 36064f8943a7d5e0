//

use crate::core::object::{Extensible, Extension, Object};

// a free-form object whose whole surface comes from decoration
#[derive(Debug)]
pub struct RecordObject {
    extension: Extension,
}

impl RecordObject {
    pub fn new() -> Self {
        RecordObject {
            extension: Extension::new(),
        }
    }
}

impl Default for RecordObject {
    fn default() -> Self {
        RecordObject::new()
    }
}

impl Object for RecordObject {
    fn as_extensible(&self) -> Option<&dyn Extensible> {
        Some(self)
    }

    fn as_extensible_mut(&mut self) -> Option<&mut dyn Extensible> {
        Some(self)
    }
}

impl Extensible for RecordObject {
    fn extension(&self) -> &Extension {
        &self.extension
    }

    fn extension_mut(&mut self) -> &mut Extension {
        &mut self.extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::decorator::{Decoration, Decorator};
    use crate::core::object::{Args, Dispatch, Value};

    #[test]
    fn record_is_decoratable_out_of_the_box() {
        let mut record = RecordObject::new();
        Decorator::attach(
            &mut record,
            "greet",
            Decoration::method(|_this, _args| Ok(Box::new("hi".to_string()) as Value)),
        )
        .unwrap();
        Decorator::attach(&mut record, "rate", Decoration::property(0.1_f64)).unwrap();

        let result = record.invoke("greet", Args::new()).unwrap();
        assert_eq!(*result.downcast::<String>().unwrap(), "hi");
        assert_eq!(
            record.read_property("rate").unwrap().downcast_ref::<f64>(),
            Some(&0.1)
        );
    }
}
