//! DDL statement text.
//!
//! Field and property maps are `BTreeMap`s, so rendering iterates keys in
//! sorted order and the same request always produces the same text.

use std::collections::BTreeMap;

use crate::models::{ResourceKind, Statement};

/// `CREATE STREAM|TABLE name (fields) WITH (properties);`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub kind: ResourceKind,
    pub name: String,
    /// Column name to column type
    pub fields: BTreeMap<String, String>,
    /// `WITH` properties such as `kafka_topic` and `value_format`
    pub settings: BTreeMap<String, String>,
}

impl CreateRequest {
    pub fn stream(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Stream, name)
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(ResourceKind::Table, name)
    }

    fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            fields: BTreeMap::new(),
            settings: BTreeMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.insert(name.into(), type_name.into());
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn query(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|(name, type_name)| format!("{} {}", name, type_name))
            .collect::<Vec<_>>()
            .join(", ");
        let settings = render_settings(&self.settings);
        format!("CREATE {} {} ({}) WITH ({});", self.kind, self.name, fields, settings)
    }

    pub fn to_statement(&self) -> Statement {
        Statement::new(self.query())
    }
}

/// `CREATE STREAM|TABLE name [WITH (...)] AS SELECT ...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAsSelectRequest {
    pub kind: ResourceKind,
    pub name: String,
    pub settings: BTreeMap<String, String>,
    /// The `SELECT` body, without trailing `;`
    pub select: String,
}

impl CreateAsSelectRequest {
    pub fn new(kind: ResourceKind, name: impl Into<String>, select: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            settings: BTreeMap::new(),
            select: select.into(),
        }
    }

    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn query(&self) -> String {
        let select = self.select.trim().trim_end_matches(';');
        if self.settings.is_empty() {
            format!("CREATE {} {} AS {};", self.kind, self.name, select)
        } else {
            format!(
                "CREATE {} {} WITH ({}) AS {};",
                self.kind,
                self.name,
                render_settings(&self.settings),
                select
            )
        }
    }
}

/// `DROP STREAM|TABLE name;`
pub fn drop_query(kind: ResourceKind, name: &str) -> String {
    format!("DROP {} {};", kind, name)
}

/// `TERMINATE query_id;`
pub fn terminate_query(query_id: &str) -> String {
    format!("TERMINATE {};", query_id)
}

/// `DESCRIBE name;`
pub fn describe_query(name: &str) -> String {
    format!("DESCRIBE {};", name)
}

fn render_settings(settings: &BTreeMap<String, String>) -> String {
    settings
        .iter()
        .map(|(key, value)| format!("{}='{}'", key, value.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}
