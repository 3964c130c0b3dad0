use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Serialize;
use sfcl_descriptor::Attrs;

use crate::query::Query;
use crate::RequestError;

/// Query key that marks a request as a block of a composite file.
pub const MARKER: &str = "vue";

/// Attributes that describe the block itself rather than how to process it.
const IGNORED_ATTRS: [&str; 4] = ["id", "index", "src", "type"];

/// Keys owned by the sub-request protocol. Pass-through pairs never use them.
const RESERVED_KEYS: [&str; 11] = [
    MARKER,
    "type",
    "index",
    "blockType",
    "issuerPath",
    "id",
    "inline",
    "scoped",
    "ts",
    "lang",
    "external",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Script,
    Template,
    Style,
    Custom,
}

impl BlockKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Template => "template",
            Self::Style => "style",
            Self::Custom => "custom",
        }
    }

    /// Style and custom blocks are addressed by position.
    #[must_use]
    pub fn is_indexed(self) -> bool {
        matches!(self, Self::Style | Self::Custom)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "script" => Ok(Self::Script),
            "template" => Ok(Self::Template),
            "style" => Ok(Self::Style),
            "custom" => Ok(Self::Custom),
            other => Err(RequestError::UnknownBlockType(other.to_string())),
        }
    }
}

/// A request for one block of a composite file.
///
/// Serializes to
/// `<path>?vue&type=<kind>[&index=n][&blockType=t][&issuerPath=p][&id=x][&inline][&scoped=true][&ts=true][&lang=l][&pass-through...][&external]`
/// and parses back to an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubRequest {
    /// The composite file, or the external source a block points at.
    pub path: Utf8PathBuf,
    pub kind: BlockKind,
    pub index: Option<usize>,
    /// Tag name of a custom block.
    pub block_type: Option<String>,
    /// Composite file that owns an external custom block.
    pub issuer_path: Option<String>,
    pub scope_id: Option<String>,
    pub inline: bool,
    pub scoped: bool,
    pub ts: bool,
    pub lang: Option<String>,
    pub external: bool,
    /// Block attributes and the importer's own query.
    pub query: Query,
}

impl SubRequest {
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, kind: BlockKind) -> Self {
        Self {
            path: path.into(),
            kind,
            index: None,
            block_type: None,
            issuer_path: None,
            scope_id: None,
            inline: false,
            scoped: false,
            ts: false,
            lang: None,
            external: false,
            query: Query::new(),
        }
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn with_block_type(mut self, block_type: impl Into<String>) -> Self {
        self.block_type = Some(block_type.into());
        self
    }

    #[must_use]
    pub fn with_issuer_path(mut self, issuer: impl Into<String>) -> Self {
        self.issuer_path = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_scope_id(mut self, id: impl Into<String>) -> Self {
        self.scope_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    #[must_use]
    pub fn with_scoped(mut self, scoped: bool) -> Self {
        self.scoped = scoped;
        self
    }

    #[must_use]
    pub fn with_ts(mut self, ts: bool) -> Self {
        self.ts = ts;
        self
    }

    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    #[must_use]
    pub fn with_external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    /// Carry block attributes on the request.
    ///
    /// `lang` and `scoped` land in their own fields; `lang_fallback` applies
    /// when the block has no `lang` attribute.
    #[must_use]
    pub fn with_attrs(mut self, attrs: &Attrs, lang_fallback: Option<&str>) -> Self {
        for attr in attrs.iter() {
            match attr.name.as_str() {
                name if IGNORED_ATTRS.contains(&name) => {}
                "lang" => self.lang = attr.value.clone(),
                "scoped" => self.scoped = true,
                name => self.push_passthrough(name, attr.value.clone()),
            }
        }
        if self.lang.is_none() {
            self.lang = lang_fallback.map(str::to_string);
        }
        self
    }

    /// Forward the importer's query, dropping keys the protocol owns.
    #[must_use]
    pub fn with_resource_query(mut self, query: &Query) -> Self {
        for param in query.iter() {
            self.push_passthrough(&param.key, param.value.clone());
        }
        self
    }

    fn push_passthrough(&mut self, key: &str, value: Option<String>) {
        if !RESERVED_KEYS.contains(&key) {
            self.query.push(key, value);
        }
    }

    /// Query part only, starting with `?`.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut query = Query::new();
        query.push(MARKER, None);
        query.push("type", Some(self.kind.as_str().to_string()));
        if let Some(index) = self.index {
            query.push("index", Some(index.to_string()));
        }
        if let Some(block_type) = &self.block_type {
            query.push("blockType", Some(block_type.clone()));
        }
        if let Some(issuer) = &self.issuer_path {
            query.push("issuerPath", Some(issuer.clone()));
        }
        if let Some(id) = &self.scope_id {
            query.push("id", Some(id.clone()));
        }
        if self.inline {
            query.push("inline", None);
        }
        if self.scoped {
            query.push("scoped", Some("true".to_string()));
        }
        if self.ts {
            query.push("ts", Some("true".to_string()));
        }
        if let Some(lang) = &self.lang {
            query.push("lang", Some(lang.clone()));
        }
        for param in self.query.iter() {
            query.push(param.key.clone(), param.value.clone());
        }
        if self.external {
            query.push("external", None);
        }
        format!("?{query}")
    }

    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}{}", self.path, self.query_string())
    }

    /// Parse a request produced by [`SubRequest::encode`].
    pub fn decode(request: &str) -> Result<Self, RequestError> {
        let (path, raw_query) = request
            .split_once('?')
            .ok_or_else(|| RequestError::NotABlockRequest(request.to_string()))?;
        Self::from_parts(Utf8Path::new(path), &Query::parse(raw_query))
    }

    /// Build from a resource path and its already parsed query.
    pub fn from_parts(path: &Utf8Path, query: &Query) -> Result<Self, RequestError> {
        if !query.contains(MARKER) {
            return Err(RequestError::NotABlockRequest(format!("{path}?{query}")));
        }
        let kind: BlockKind = query
            .get("type")
            .ok_or(RequestError::MissingType)?
            .parse()?;

        let mut request = Self::new(path, kind);
        for param in query.iter() {
            let value = param.value.clone();
            match param.key.as_str() {
                MARKER | "type" => {}
                "index" => {
                    let raw = value.unwrap_or_default();
                    request.index = Some(
                        raw.parse()
                            .map_err(|_| RequestError::InvalidIndex(raw.clone()))?,
                    );
                }
                "blockType" => request.block_type = value,
                "issuerPath" => request.issuer_path = value,
                "id" => request.scope_id = value,
                "inline" => request.inline = true,
                "scoped" => request.scoped = flag(value.as_deref()),
                "ts" => request.ts = flag(value.as_deref()),
                "lang" => request.lang = value,
                "external" => request.external = true,
                key => request.query.push(key, value),
            }
        }

        if kind.is_indexed() && request.index.is_none() {
            return Err(RequestError::MissingIndex(kind));
        }
        Ok(request)
    }
}

fn flag(value: Option<&str>) -> bool {
    !matches!(value, Some("false"))
}

impl fmt::Display for SubRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SubRequest {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
