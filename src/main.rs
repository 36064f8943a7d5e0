//

use std::collections::HashMap;
use std::sync::Arc;

use garnish::core::decorator::{Companion, Constraint, Context, Decoration, Decorator};
use garnish::core::error::ObjectError;
use garnish::core::object::{Args, Dispatch, Extensible, Extension, Object, Value};
use garnish::core::shared::SharedObject;
use garnish::objects::record::RecordObject;

struct PostEntity {
    id: i64,
    title: String,
    content: String,
    extension: Extension,
}

impl PostEntity {
    fn new() -> Self {
        PostEntity {
            id: 0,
            title: "None".to_string(),
            content: "--empty--".to_string(),
            extension: Extension::new(),
        }
    }
}

impl Object for PostEntity {
    fn as_extensible(&self) -> Option<&dyn Extensible> {
        Some(self)
    }

    fn as_extensible_mut(&mut self) -> Option<&mut dyn Extensible> {
        Some(self)
    }
}

impl Extensible for PostEntity {
    fn extension(&self) -> &Extension {
        &self.extension
    }

    fn extension_mut(&mut self) -> &mut Extension {
        &mut self.extension
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(name, "get_id" | "get_title" | "get_content")
    }

    fn call_method(&mut self, name: &str, _args: Args) -> Result<Value, ObjectError> {
        match name {
            "get_id" => Ok(Box::new(self.id) as Value),
            "get_title" => Ok(Box::new(self.title.clone()) as Value),
            "get_content" => Ok(Box::new(self.content.clone()) as Value),
            _ => Err(ObjectError::UndefinedMethod {
                type_name: self.type_name(),
                method: name.to_string(),
            }),
        }
    }
}

struct CommentEntity {
    post_id: Option<i64>,
    comment: String,
    extension: Extension,
}

impl CommentEntity {
    fn new() -> Self {
        CommentEntity {
            post_id: None,
            comment: "--empty comment--".to_string(),
            extension: Extension::new(),
        }
    }
}

impl Object for CommentEntity {
    fn as_extensible(&self) -> Option<&dyn Extensible> {
        Some(self)
    }

    fn as_extensible_mut(&mut self) -> Option<&mut dyn Extensible> {
        Some(self)
    }
}

impl Extensible for CommentEntity {
    fn extension(&self) -> &Extension {
        &self.extension
    }

    fn extension_mut(&mut self) -> &mut Extension {
        &mut self.extension
    }

    fn has_method(&self, name: &str) -> bool {
        matches!(name, "get_post_id" | "get_comment")
    }

    fn call_method(&mut self, name: &str, _args: Args) -> Result<Value, ObjectError> {
        match name {
            "get_post_id" => Ok(Box::new(self.post_id) as Value),
            "get_comment" => Ok(Box::new(self.comment.clone()) as Value),
            _ => Err(ObjectError::UndefinedMethod {
                type_name: self.type_name(),
                method: name.to_string(),
            }),
        }
    }
}

// fills whichever entity it was attached to from a string map
struct EntityHydrator {
    source: &'static str,
}

impl Companion for EntityHydrator {
    fn method_names(&self) -> Vec<String> {
        vec!["hydrate".to_string()]
    }

    fn call(&self, name: &str, context: &mut Context, mut args: Args) -> Result<Value, ObjectError> {
        match name {
            "hydrate" => {
                let data = args
                    .remove(0)
                    .downcast::<HashMap<String, String>>()
                    .unwrap();
                context.with::<PostEntity, _>(|post| {
                    post.id = data.get("id").and_then(|id| id.parse().ok()).unwrap_or(0);
                    post.title = data
                        .get("title")
                        .cloned()
                        .unwrap_or_else(|| "--missing title--".to_string());
                    post.content = data
                        .get("content")
                        .cloned()
                        .unwrap_or_else(|| "--no content--".to_string());
                    println!("hydrated post from source '{}'", self.source);
                });
                context.with::<CommentEntity, _>(|comment| {
                    comment.post_id = data.get("post_id").and_then(|id| id.parse().ok());
                    comment.comment = data
                        .get("comment")
                        .cloned()
                        .unwrap_or_else(|| "--no content--".to_string());
                });
                Ok(Box::new(()) as Value)
            }
            _ => Err(ObjectError::UndefinedMethod {
                type_name: "EntityHydrator",
                method: name.to_string(),
            }),
        }
    }
}

struct CrudCompanion;

impl Companion for CrudCompanion {
    fn method_names(&self) -> Vec<String> {
        vec!["create".to_string()]
    }

    fn call(&self, name: &str, context: &mut Context, _args: Args) -> Result<Value, ObjectError> {
        match name {
            "create" => {
                context.with::<PostEntity, _>(|post| {
                    println!("create draft from post '{}'", post.title);
                });
                Ok(Box::new(()) as Value)
            }
            _ => Err(ObjectError::UndefinedMethod {
                type_name: "CrudCompanion",
                method: name.to_string(),
            }),
        }
    }
}

fn main() {
    let companions: Vec<Arc<dyn Companion>> = vec![
        Arc::new(CrudCompanion),
        Arc::new(EntityHydrator { source: "demo" }),
    ];

    let mut post = PostEntity::new();
    Decorator::attach_from_objects(&mut post, &companions, None).unwrap();

    let mut data = HashMap::new();
    data.insert("id".to_string(), "1".to_string());
    data.insert("title".to_string(), "My first post!".to_string());
    data.insert("content".to_string(), "Hello, World!".to_string());
    post.invoke("hydrate", vec![Box::new(data) as Value]).unwrap();
    post.invoke("create", Args::new()).unwrap();

    println!("Title: {}", post.title);
    println!("Content: {}", post.content);

    // wrap the genuine getter; the wrapper decides when it runs
    Decorator::attach_with(
        &mut post,
        "decorated_get_title",
        Decoration::wrapper(|original, this, mut args| {
            let prefix = args.remove(0).downcast::<String>().unwrap();
            let title = original(this)?.downcast::<String>().unwrap();
            Ok(Box::new(format!("{} {}", prefix, title)) as Value)
        }),
        Some(Constraint::of::<PostEntity>()),
    )
    .unwrap();
    let headline = post
        .invoke(
            "decorated_get_title",
            vec![Box::new("Breaking:".to_string()) as Value],
        )
        .unwrap();
    println!("Headline: {}", headline.downcast::<String>().unwrap());

    let mut comment = CommentEntity::new();
    Decorator::attach_from_objects(&mut comment, &companions, None).unwrap();
    let mut data = HashMap::new();
    data.insert("post_id".to_string(), post.id.to_string());
    data.insert(
        "comment".to_string(),
        "and here we have my first comment :)".to_string(),
    );
    comment
        .invoke("hydrate", vec![Box::new(data) as Value])
        .unwrap();
    println!("Post: {:?}", comment.post_id);
    println!("Comment: {}", comment.comment);

    // free-form record through the shared, chaining flavor
    let record = SharedObject::new(RecordObject::new())
        .decorate("rate", Decoration::property(0.1_f64))
        .unwrap()
        .decorate(
            "describe",
            Decoration::method(|this, _args| {
                let rate = this
                    .read_property("rate")
                    .and_then(|value| value.downcast_ref::<f64>().cloned())
                    .unwrap_or(0.0);
                Ok(Box::new(format!("rate is {}", rate)) as Value)
            }),
        )
        .unwrap();
    let mut guard = record.write().unwrap();
    let description = guard
        .as_extensible_mut()
        .unwrap()
        .invoke("describe", Args::new())
        .unwrap();
    println!("{}", description.downcast::<String>().unwrap());
}
