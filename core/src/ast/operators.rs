use serde::{Deserialize, Serialize};
use std::fmt;

/// Lookups available on a JSON column or on a key transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LookupKind {
    /// `exact` (JSON equality; `null` means JSON null)
    Exact,
    /// `isnull` (SQL NULL on the column, key absence on a key transform)
    IsNull,
    /// `has_key`
    HasKey,
    /// `has_keys` (all of)
    HasKeys,
    /// `has_any_keys` (any of)
    HasAnyKeys,
    /// `contains` on a JSON value (structural containment)
    Contains,
    /// `contained_by`
    ContainedBy,
    /// `iexact` on an extracted key
    IExact,
    /// `contains` on an extracted key (substring)
    TextContains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Regex,
    IRegex,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl LookupKind {
    pub const ALL: [LookupKind; 20] = [
        LookupKind::Exact,
        LookupKind::IsNull,
        LookupKind::HasKey,
        LookupKind::HasKeys,
        LookupKind::HasAnyKeys,
        LookupKind::Contains,
        LookupKind::ContainedBy,
        LookupKind::IExact,
        LookupKind::TextContains,
        LookupKind::IContains,
        LookupKind::StartsWith,
        LookupKind::IStartsWith,
        LookupKind::EndsWith,
        LookupKind::IEndsWith,
        LookupKind::Regex,
        LookupKind::IRegex,
        LookupKind::Lt,
        LookupKind::Lte,
        LookupKind::Gt,
        LookupKind::Gte,
    ];

    /// Filter-key name of the lookup.
    pub fn name(&self) -> &'static str {
        match self {
            LookupKind::Exact => "exact",
            LookupKind::IsNull => "isnull",
            LookupKind::HasKey => "has_key",
            LookupKind::HasKeys => "has_keys",
            LookupKind::HasAnyKeys => "has_any_keys",
            LookupKind::Contains | LookupKind::TextContains => "contains",
            LookupKind::ContainedBy => "contained_by",
            LookupKind::IExact => "iexact",
            LookupKind::IContains => "icontains",
            LookupKind::StartsWith => "startswith",
            LookupKind::IStartsWith => "istartswith",
            LookupKind::EndsWith => "endswith",
            LookupKind::IEndsWith => "iendswith",
            LookupKind::Regex => "regex",
            LookupKind::IRegex => "iregex",
            LookupKind::Lt => "lt",
            LookupKind::Lte => "lte",
            LookupKind::Gt => "gt",
            LookupKind::Gte => "gte",
        }
    }

    /// Resolve a lookup name. `contains` means structural containment on a
    /// column and substring matching on an extracted key.
    pub fn from_name(name: &str, on_key: bool) -> Option<Self> {
        let kind = match name {
            "exact" => LookupKind::Exact,
            "isnull" => LookupKind::IsNull,
            "has_key" => LookupKind::HasKey,
            "has_keys" => LookupKind::HasKeys,
            "has_any_keys" => LookupKind::HasAnyKeys,
            "contains" if on_key => LookupKind::TextContains,
            "contains" => LookupKind::Contains,
            "contained_by" => LookupKind::ContainedBy,
            "iexact" => LookupKind::IExact,
            "icontains" => LookupKind::IContains,
            "startswith" => LookupKind::StartsWith,
            "istartswith" => LookupKind::IStartsWith,
            "endswith" => LookupKind::EndsWith,
            "iendswith" => LookupKind::IEndsWith,
            "regex" => LookupKind::Regex,
            "iregex" => LookupKind::IRegex,
            "lt" => LookupKind::Lt,
            "lte" => LookupKind::Lte,
            "gt" => LookupKind::Gt,
            "gte" => LookupKind::Gte,
            _ => return None,
        };
        Some(kind)
    }

    /// Lookups that compare the extracted key as text.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            LookupKind::IExact
                | LookupKind::TextContains
                | LookupKind::IContains
                | LookupKind::StartsWith
                | LookupKind::IStartsWith
                | LookupKind::EndsWith
                | LookupKind::IEndsWith
                | LookupKind::Regex
                | LookupKind::IRegex
        )
    }

    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            LookupKind::IExact
                | LookupKind::IContains
                | LookupKind::IStartsWith
                | LookupKind::IEndsWith
                | LookupKind::IRegex
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LookupKind::Lt | LookupKind::Lte | LookupKind::Gt | LookupKind::Gte
        )
    }

    /// Lookups that only make sense on a key transform.
    pub fn requires_key(&self) -> bool {
        self.is_text() || self.is_numeric()
    }

    /// Combinator joining per-key checks for multi-key lookups.
    pub fn key_combinator(&self) -> Option<&'static str> {
        match self {
            LookupKind::HasKeys => Some(" AND "),
            LookupKind::HasAnyKeys => Some(" OR "),
            _ => None,
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sort order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}
