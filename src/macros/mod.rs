// ABOUTME: Macro stage for the rockslide application
// ABOUTME: Applies an ordered list of per-slide content transforms with per-macro fault isolation

mod code;
mod images;
mod markers;

pub use code::CodeHighlightingMacro;
pub use images::{EmbedImagesMacro, FixImagePathsMacro};
pub use markers::{FxMacro, NotesMacro, QrMacro};

use crate::errors::{RockslideError, Result};
use crate::logging::Logger;
use std::path::Path;

/// Settings every macro is constructed with.
#[derive(Debug, Clone, Default)]
pub struct MacroContext {
    pub logger: Logger,
    pub embed: bool,
}

/// A per-slide content transform.
///
/// `source` is the absolute path of the file the slide came from, when known.
/// The returned classes are appended to the slide's class list.
pub trait Macro {
    fn name(&self) -> &'static str;

    fn process(&self, content: &str, source: Option<&Path>) -> Result<(String, Vec<String>)>;
}

/// Builds a fresh macro for one invocation.
pub type MacroFactory = Box<dyn Fn(&MacroContext) -> Box<dyn Macro>>;

/// The transforms shipped with rockslide, in their default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinMacro {
    Code,
    EmbedImages,
    FixImagePaths,
    Fx,
    Notes,
    Qr,
}

impl BuiltinMacro {
    pub const ALL: [BuiltinMacro; 6] = [
        BuiltinMacro::Code,
        BuiltinMacro::EmbedImages,
        BuiltinMacro::FixImagePaths,
        BuiltinMacro::Fx,
        BuiltinMacro::Notes,
        BuiltinMacro::Qr,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinMacro::Code => "code",
            BuiltinMacro::EmbedImages => "embed_images",
            BuiltinMacro::FixImagePaths => "fix_image_paths",
            BuiltinMacro::Fx => "fx",
            BuiltinMacro::Notes => "notes",
            BuiltinMacro::Qr => "qr",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn build(self, context: &MacroContext) -> Box<dyn Macro> {
        match self {
            BuiltinMacro::Code => Box::new(CodeHighlightingMacro::new(context)),
            BuiltinMacro::EmbedImages => Box::new(EmbedImagesMacro::new(context)),
            BuiltinMacro::FixImagePaths => Box::new(FixImagePathsMacro::new(context)),
            BuiltinMacro::Fx => Box::new(FxMacro),
            BuiltinMacro::Notes => Box::new(NotesMacro),
            BuiltinMacro::Qr => Box::new(QrMacro),
        }
    }
}

struct RegisteredMacro {
    name: String,
    factory: MacroFactory,
}

/// Ordered list of registered macros.
pub struct MacroStage {
    macros: Vec<RegisteredMacro>,
}

impl Default for MacroStage {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MacroStage {
    /// A stage with no macros at all.
    pub fn empty() -> Self {
        Self { macros: Vec::new() }
    }

    /// The built-in macros in their default order.
    pub fn with_defaults() -> Self {
        let mut stage = Self::empty();
        for builtin in BuiltinMacro::ALL {
            stage.register_builtin(builtin);
        }
        stage
    }

    /// A stage made of the named built-in macros, in the given order.
    pub fn with_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let mut stage = Self::empty();
        for name in names {
            stage.register_named(name.as_ref())?;
        }
        Ok(stage)
    }

    pub fn register_builtin(&mut self, builtin: BuiltinMacro) {
        self.macros.push(RegisteredMacro {
            name: builtin.name().to_string(),
            factory: Box::new(move |context| builtin.build(context)),
        });
    }

    /// Register a built-in macro by name; unknown names fail right away.
    pub fn register_named(&mut self, name: &str) -> Result<()> {
        let builtin = BuiltinMacro::from_name(name.trim()).ok_or_else(|| {
            RockslideError::InvalidMacro(format!(
                "unknown macro \"{}\", expected one of: {}",
                name,
                BuiltinMacro::ALL.map(BuiltinMacro::name).join(", ")
            ))
        })?;
        self.register_builtin(builtin);
        Ok(())
    }

    /// Register a custom macro factory.
    pub fn register<F>(&mut self, name: &str, factory: F) -> Result<()>
    where
        F: Fn(&MacroContext) -> Box<dyn Macro> + 'static,
    {
        if name.trim().is_empty() {
            return Err(RockslideError::InvalidMacro(
                "a macro must be registered under a non-empty name".to_string(),
            ));
        }
        self.macros.push(RegisteredMacro {
            name: name.to_string(),
            factory: Box::new(factory),
        });
        Ok(())
    }

    pub fn names(&self) -> Vec<&str> {
        self.macros.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// Run every macro over `content` in registration order.
    ///
    /// A failing macro leaves the content as it was before that macro ran
    /// and contributes no classes; the following macros still run.
    pub fn process(
        &self,
        content: &str,
        source: Option<&Path>,
        context: &MacroContext,
    ) -> (String, Vec<String>) {
        let mut content = content.to_string();
        let mut classes = Vec::new();

        for registered in &self.macros {
            let instance = (registered.factory)(context);
            match instance.process(&content, source) {
                Ok((new_content, added)) => {
                    content = new_content;
                    classes.extend(added);
                }
                Err(e) => {
                    context.logger.warning(&format!(
                        "{} processing failed in {}: {}",
                        registered.name,
                        source
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<unknown source>".to_string()),
                        e
                    ));
                }
            }
        }

        (content, classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::recording_logger;

    struct FailingMacro;

    impl Macro for FailingMacro {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn process(&self, _content: &str, _source: Option<&Path>) -> Result<(String, Vec<String>)> {
            Err(RockslideError::macro_error(self.name(), "always fails"))
        }
    }

    struct TagMacro(&'static str);

    impl Macro for TagMacro {
        fn name(&self) -> &'static str {
            "tag"
        }

        fn process(&self, content: &str, _source: Option<&Path>) -> Result<(String, Vec<String>)> {
            Ok((content.to_string(), vec![self.0.to_string()]))
        }
    }

    #[test]
    fn test_failing_macro_is_isolated() {
        let (logger, records) = recording_logger();
        let context = MacroContext {
            logger,
            embed: false,
        };

        let mut stage = MacroStage::empty();
        stage
            .register("failing", |_| Box::new(FailingMacro))
            .expect("Failed to register");
        stage.register_named("notes").expect("Failed to register");
        stage
            .register("tag", |_| Box::new(TagMacro("tagged")))
            .expect("Failed to register");

        let input = "<p>Body</p>";
        let (content, classes) = stage.process(input, Some(Path::new("/deck/a.md")), &context);

        assert_eq!(content, input);
        assert_eq!(classes, vec!["tagged".to_string()]);

        let records = records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].0.contains("failing processing failed in /deck/a.md"));
        assert!(records[0].0.contains("always fails"));
    }

    #[test]
    fn test_content_threads_and_classes_accumulate_in_order() {
        let mut stage = MacroStage::with_names(&["fx", "notes"]).expect("Failed to build stage");
        stage
            .register("tag", |_| Box::new(TagMacro("has_notes")))
            .expect("Failed to register");

        let (content, classes) = stage.process(
            "<p>.fx: zoom</p>\n<p>Hello</p>\n<p>.notes: remember</p>",
            None,
            &MacroContext::default(),
        );

        assert_eq!(content, "<p>Hello</p>\n<p class=\"notes\">remember</p>");
        // duplicates are kept
        assert_eq!(classes, vec!["zoom", "has_notes", "has_notes"]);
    }

    #[test]
    fn test_unknown_macro_name_is_rejected_at_registration() {
        let mut stage = MacroStage::empty();
        let result = stage.register_named("sparkles");
        assert!(matches!(result, Err(RockslideError::InvalidMacro(_))));
        assert!(stage.is_empty());

        let result = stage.register("  ", |_| Box::new(FxMacro));
        assert!(matches!(result, Err(RockslideError::InvalidMacro(_))));
    }

    #[test]
    fn test_default_registration_order() {
        let stage = MacroStage::with_defaults();
        assert_eq!(
            stage.names(),
            vec!["code", "embed_images", "fix_image_paths", "fx", "notes", "qr"]
        );
    }
}
