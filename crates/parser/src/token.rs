//! Input tokens, as delivered by the external lexer and entity linker.
//!
//! A token carries its surface form, a part-of-speech tag, and optionally a
//! logical macro name (a knowledge-base identifier or combinator name) with
//! its pre-parsed lambda term. The logical type is derived once at
//! construction; a token with no attached term has no type and can only be
//! dropped by the parser.

use lambdaqa_core::{LambdaTerm, LambdaType};

/// One input token.
#[derive(Debug, Clone)]
pub struct Token {
    form: String,
    pos_tag: String,
    macro_name: Option<String>,
    logical_form: Option<LambdaTerm>,
    logical_type: Option<LambdaType>,
}

impl Token {
    /// A token with an attached logical term.
    pub fn new(
        form: impl Into<String>,
        pos_tag: impl Into<String>,
        macro_name: Option<String>,
        logical_form: Option<LambdaTerm>,
    ) -> Self {
        let logical_type = logical_form.as_ref().map(LambdaTerm::typecheck);
        Self {
            form: form.into(),
            pos_tag: pos_tag.into(),
            macro_name,
            logical_form,
            logical_type,
        }
    }

    /// A purely surface token with no logical content.
    pub fn surface(form: impl Into<String>, pos_tag: impl Into<String>) -> Self {
        Self::new(form, pos_tag, None, None)
    }

    /// The raw surface string.
    pub fn form(&self) -> &str {
        &self.form
    }

    /// The part-of-speech tag.
    pub fn pos_tag(&self) -> &str {
        &self.pos_tag
    }

    /// The logical macro name, when the linker attached one.
    pub fn macro_name(&self) -> Option<&str> {
        self.macro_name.as_deref()
    }

    /// The attached lambda term, when present.
    pub fn logical_form(&self) -> Option<&LambdaTerm> {
        self.logical_form.as_ref()
    }

    /// The derived logical type, when a term is attached.
    pub fn logical_type(&self) -> Option<&LambdaType> {
        self.logical_type.as_ref()
    }

    /// True for tokens linked to a `P…` property identifier.
    pub fn is_predicate(&self) -> bool {
        self.macro_name
            .as_deref()
            .is_some_and(|name| name.starts_with('P'))
    }

    /// True for tokens linked to a `Q…` entity identifier.
    pub fn is_entity(&self) -> bool {
        self.macro_name
            .as_deref()
            .is_some_and(|name| name.starts_with('Q'))
    }
}
