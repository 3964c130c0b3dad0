use serde::Serialize;
use sfcl_source::Span;

/// A single attribute on a block's opening tag.
///
/// `value` is `None` for bare attributes such as `scoped` or `functional`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attr {
    pub name: String,
    pub value: Option<String>,
}

/// Attributes in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attrs(Vec<Attr>);

impl Attrs {
    #[must_use]
    pub fn new(attrs: Vec<Attr>) -> Self {
        Self(attrs)
    }

    /// Add an attribute. A repeated name keeps its first position and takes
    /// the latest value.
    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        if let Some(existing) = self.0.iter_mut().find(|attr| attr.name == name) {
            existing.value = value;
        } else {
            self.0.push(Attr { name, value });
        }
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|attr| attr.name == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Attr> {
        self.0.iter().find(|attr| attr.name == name)
    }

    /// The textual value of an attribute, if it has one.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|attr| attr.value.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Attr> for Attrs {
    fn from_iter<T: IntoIterator<Item = Attr>>(iter: T) -> Self {
        let mut attrs = Attrs::default();
        for attr in iter {
            attrs.insert(attr.name, attr.value);
        }
        attrs
    }
}

/// An opaque v3 source map produced by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceMap(pub serde_json::Value);

/// One sub-document of a composite file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub content: String,
    pub attrs: Attrs,
    /// Location of `content` in the composite file.
    pub span: Span,
    pub map: Option<SourceMap>,
}

impl Block {
    #[must_use]
    pub fn new(content: impl Into<String>, attrs: Attrs, span: Span) -> Self {
        Self {
            content: content.into(),
            attrs,
            span,
            map: None,
        }
    }

    #[must_use]
    pub fn lang(&self) -> Option<&str> {
        self.attrs.value("lang")
    }

    /// External source path for `<style src="./a.css">` style blocks.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        self.attrs.value("src")
    }

    #[must_use]
    pub fn scoped(&self) -> bool {
        self.attrs.has("scoped")
    }

    #[must_use]
    pub fn functional(&self) -> bool {
        self.attrs.has("functional")
    }

    /// CSS-modules binding name; a bare `module` attribute binds `$style`.
    #[must_use]
    pub fn css_module(&self) -> Option<&str> {
        self.attrs
            .get("module")
            .map(|attr| attr.value.as_deref().unwrap_or("$style"))
    }

    /// No external source and nothing but whitespace inside.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.src().is_none() && self.content.trim().is_empty()
    }
}

/// A block whose tag is not one of `template`, `script` or `style`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomBlock {
    pub block_type: String,
    #[serde(flatten)]
    pub block: Block,
}

/// Parsed representation of one composite file.
///
/// Style and custom block order matches source order; the position of a
/// block in its list is part of that block's identity in sub-requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    pub template: Option<Block>,
    pub script: Option<Block>,
    pub script_setup: Option<Block>,
    pub styles: Vec<Block>,
    pub custom_blocks: Vec<CustomBlock>,
}

impl Descriptor {
    #[must_use]
    pub fn has_scoped_styles(&self) -> bool {
        self.styles.iter().any(Block::scoped)
    }

    #[must_use]
    pub fn has_functional_template(&self) -> bool {
        self.template.as_ref().is_some_and(Block::functional)
    }

    #[must_use]
    pub fn has_script(&self) -> bool {
        self.script.is_some() || self.script_setup.is_some()
    }

    /// Script language, preferring `<script>` over `<script setup>`.
    #[must_use]
    pub fn script_lang(&self) -> Option<&str> {
        self.script
            .as_ref()
            .and_then(Block::lang)
            .or_else(|| self.script_setup.as_ref().and_then(Block::lang))
    }
}
