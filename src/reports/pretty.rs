//! Pretty report generator.
//!
//! Reproduces the listing printed by `az deployment group what-if`, so the
//! denoised result reads exactly like the output people already know.
//! Rendering happens in two steps: the result is laid out as a list of
//! [`PrettyLine`]s (text, indentation level, prefix marker), then each line
//! is drawn with optional ANSI color on its change symbol.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use super::{ReportError, ReportFormat, ReportGenerator};
use crate::model::{
    Change, ChangeType, DeltaKind, OperationResult, PropertyChange, PropertyChangeType,
    ResourceDescriptor,
};

/// Apply ANSI color formatting if colored output is enabled.
fn ansi_color(text: &str, color: &str, colored: bool) -> String {
    if colored {
        match color {
            "red" => format!("\x1b[31m{text}\x1b[0m"),
            "green" => format!("\x1b[32m{text}\x1b[0m"),
            "blue" => format!("\x1b[34m{text}\x1b[0m"),
            "magenta" => format!("\x1b[35m{text}\x1b[0m"),
            "dim" => format!("\x1b[2m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    } else {
        text.to_string()
    }
}

/// Resource and property change types share one symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSymbol {
    Create,
    Delete,
    Deploy,
    Modify,
    Array,
    NoChange,
    NoEffect,
    Ignore,
}

impl ChangeSymbol {
    #[must_use]
    pub const fn sign(self) -> char {
        match self {
            Self::Create => '+',
            Self::Delete => '-',
            Self::Deploy => '!',
            Self::Modify | Self::Array => '~',
            Self::NoChange => '=',
            Self::NoEffect => 'x',
            Self::Ignore => '*',
        }
    }

    /// Display rank; lower ranks are listed first
    #[must_use]
    pub const fn order(self) -> u8 {
        match self {
            Self::Delete => 1,
            Self::Create => 2,
            Self::Modify | Self::Array | Self::Deploy => 3,
            Self::NoChange | Self::NoEffect => 4,
            Self::Ignore => 5,
        }
    }

    /// Legend text
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Delete => "Delete",
            Self::Deploy => "Deploy",
            Self::Modify | Self::Array => "Modify",
            Self::NoChange => "Nochange",
            Self::NoEffect => "Noeffect",
            Self::Ignore => "Ignore",
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::Create => "green",
            Self::Delete => "red",
            Self::Deploy => "blue",
            Self::Modify | Self::Array => "magenta",
            Self::NoChange | Self::NoEffect | Self::Ignore => "dim",
        }
    }
}

impl From<ChangeType> for ChangeSymbol {
    fn from(change_type: ChangeType) -> Self {
        match change_type {
            ChangeType::Create => Self::Create,
            ChangeType::Delete => Self::Delete,
            ChangeType::Deploy => Self::Deploy,
            ChangeType::Ignore => Self::Ignore,
            ChangeType::Modify => Self::Modify,
            ChangeType::NoChange => Self::NoChange,
        }
    }
}

impl From<PropertyChangeType> for ChangeSymbol {
    fn from(change_type: PropertyChangeType) -> Self {
        match change_type {
            PropertyChangeType::Array => Self::Array,
            PropertyChangeType::Create => Self::Create,
            PropertyChangeType::Delete => Self::Delete,
            PropertyChangeType::Modify => Self::Modify,
            PropertyChangeType::NoEffect => Self::NoEffect,
        }
    }
}

/// Prefix drawn between a line's indentation and its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Nothing
    Bare,
    /// Two spaces, aligning with signed siblings
    Pad,
    /// The change symbol followed by a space
    Sign(ChangeSymbol),
}

/// One laid-out report line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyLine {
    pub text: String,
    /// Indentation level, two spaces each
    pub level: usize,
    pub marker: Marker,
}

impl PrettyLine {
    #[must_use]
    pub fn render(&self, colored: bool) -> String {
        let indent = "  ".repeat(self.level);
        let prefix = match self.marker {
            Marker::Bare => String::new(),
            Marker::Pad => "  ".to_string(),
            Marker::Sign(symbol) => format!(
                "{} ",
                ansi_color(&symbol.sign().to_string(), symbol.color(), colored)
            ),
        };
        format!("{indent}{prefix}{}", self.text)
    }
}

/// Accumulates report lines
#[derive(Default)]
struct Layout {
    lines: Vec<PrettyLine>,
}

impl Layout {
    fn line(&mut self, text: impl Into<String>, level: usize, marker: Marker) {
        self.lines.push(PrettyLine {
            text: text.into(),
            level,
            marker,
        });
    }

    fn text(&mut self, text: impl Into<String>) {
        self.line(text, 0, Marker::Bare);
    }

    fn blank(&mut self) {
        self.text(String::new());
    }

    /// Flattened object listing with aligned values.
    fn object(&mut self, level: usize, value: &Value) {
        let mut flat = Vec::new();
        flatten(value, None, &mut flat);
        let width = key_width(flat.iter().map(|(key, _)| key.as_str()));

        for (key, value) in flat {
            if let Value::Array(items) = value {
                self.line(format!("{key}: ["), level, Marker::Pad);
                self.elements(level, items);
                self.line("]", level, Marker::Pad);
            } else {
                self.line(
                    format!("{}{}", padded_key(&key, width), primitive(value)),
                    level,
                    Marker::Pad,
                );
            }
        }
    }

    /// Array elements, one index per entry.
    fn elements(&mut self, level: usize, items: &[Value]) {
        for (index, item) in items.iter().enumerate() {
            if is_object_like(item) {
                self.line(format!("{index}:"), level + 1, Marker::Pad);
                self.blank();
                self.object(level + 2, item);
                self.blank();
            } else {
                self.line(format!("{index}: {item}"), level + 1, Marker::Pad);
            }
        }
    }

    fn property_changes(&mut self, level: usize, deltas: &[&PropertyChange]) {
        let width = key_width(deltas.iter().map(|d| d.path.as_str()));

        for delta in deltas {
            let path = delta.path.as_str();
            match &delta.kind {
                DeltaKind::Leaf(PropertyChangeType::Modify) => self.line(
                    format!(
                        "{}{} => {}",
                        padded_key(path, width),
                        json_or_null(delta.before.as_ref()),
                        json_or_null(delta.after.as_ref())
                    ),
                    level,
                    Marker::Sign(ChangeSymbol::Modify),
                ),
                DeltaKind::Leaf(PropertyChangeType::Array) => self.array_change(level, path, &[]),
                DeltaKind::Leaf(change_type) => {
                    self.value_change(level, path, width, *change_type, delta);
                }
                DeltaKind::Object(children) => {
                    self.line(
                        format!("{path}:"),
                        level,
                        Marker::Sign(ChangeSymbol::Modify),
                    );
                    self.blank();
                    let children: Vec<&PropertyChange> = children.iter().collect();
                    self.property_changes(level + 1, &children);
                }
                DeltaKind::Array(children) => self.array_change(level, path, children),
            }
        }
    }

    /// A whole value appearing, disappearing, or left as is.
    fn value_change(
        &mut self,
        level: usize,
        path: &str,
        width: usize,
        change_type: PropertyChangeType,
        delta: &PropertyChange,
    ) {
        let sign = Marker::Sign(change_type.into());
        let value = if change_type == PropertyChangeType::Delete {
            delta.before.as_ref()
        } else {
            delta.after.as_ref()
        };

        match value {
            Some(Value::Array(items)) => {
                self.line(format!("{path}: ["), level, sign);
                self.elements(level, items);
                self.line("]", level, Marker::Pad);
            }
            Some(value) if !is_object_like(value) => {
                self.line(
                    format!("{}{}", padded_key(path, width), primitive(value)),
                    level,
                    sign,
                );
            }
            _ => {
                self.line(format!("{path}:"), level, sign);
                self.blank();
                if let Some(value) = value {
                    self.object(level + 1, value);
                }
                self.blank();
            }
        }
    }

    fn array_change(&mut self, level: usize, path: &str, children: &[PropertyChange]) {
        self.line(
            format!("{path}: ["),
            level,
            Marker::Sign(ChangeSymbol::Array),
        );
        let mut elements: Vec<&PropertyChange> = children.iter().collect();
        elements.sort_by_key(|c| c.path.parse::<i64>().unwrap_or(i64::MAX));
        self.property_changes(level + 1, &elements);
        self.blank();
        self.line("]", level, Marker::Pad);
    }
}

/// Objects (and nulls, which print as empty objects) are listed by key
const fn is_object_like(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_) | Value::Null)
}

/// Keys of an object, or indices of an array
fn entries(value: &Value) -> Vec<(String, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// Collapse nested objects into dotted keys. Arrays stay whole; nulls vanish.
fn flatten<'a>(value: &'a Value, prefix: Option<&str>, out: &mut Vec<(String, &'a Value)>) {
    for (key, child) in entries(value) {
        let full_key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key,
        };
        match child {
            Value::Object(_) | Value::Null => flatten(child, Some(&full_key), out),
            _ => out.push((full_key, child)),
        }
    }
}

fn key_width<'a>(keys: impl Iterator<Item = &'a str>) -> usize {
    keys.map(|k| k.chars().count()).max().unwrap_or(0) + 2
}

fn padded_key(key: &str, width: usize) -> String {
    format!("{:<width$}", format!("{key}: "))
}

/// Scalars as the Azure CLI prints them: strings quoted verbatim
fn primitive(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => other.to_string(),
    }
}

fn json_or_null(value: Option<&Value>) -> String {
    value.map_or_else(|| "null".to_string(), ToString::to_string)
}

fn with_api_version(path: &str, change: &Change) -> String {
    match change.api_version() {
        Some(version) => format!("{path} [{version}]"),
        None => path.to_string(),
    }
}

fn without_resource_group(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "resourceGroup")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

/// Symbols present in the result, in first-seen order
fn symbols_present(result: &OperationResult) -> IndexSet<ChangeSymbol> {
    fn visit(node: &PropertyChange, symbols: &mut IndexSet<ChangeSymbol>) {
        symbols.insert(node.change_type().into());
        for child in node.children().unwrap_or_default() {
            visit(child, symbols);
        }
    }

    let mut symbols = IndexSet::new();
    for change in &result.changes {
        symbols.insert(change.change_type.into());
        if change.change_type == ChangeType::Modify {
            for node in change.delta.iter().flatten() {
                visit(node, &mut symbols);
            }
        }
    }
    symbols
}

fn change_order(change_type: ChangeType) -> u8 {
    ChangeSymbol::from(change_type).order()
}

type Scopes<'a> = IndexMap<String, Vec<(&'a Change, ResourceDescriptor)>>;

/// Group changes by resource group (first-seen order), each group sorted by
/// change type.
fn organize(result: &OperationResult) -> Result<Scopes<'_>, ReportError> {
    let mut scopes: Scopes<'_> = IndexMap::new();
    for change in &result.changes {
        let descriptor = ResourceDescriptor::parse(&change.resource_id)
            .map_err(|e| ReportError::UnrenderableResource(e.to_string()))?;
        scopes
            .entry(descriptor.resource_group.id.clone())
            .or_default()
            .push((change, descriptor));
    }
    for changes in scopes.values_mut() {
        changes.sort_by_key(|(change, _)| change_order(change.change_type));
    }
    Ok(scopes)
}

fn summary_phrase(change_type: ChangeType, count: usize) -> Option<String> {
    match change_type {
        ChangeType::Create => Some(format!("{count} to create")),
        ChangeType::Delete => Some(format!("{count} to delete")),
        ChangeType::Deploy => Some(format!("{count} to deploy")),
        ChangeType::Modify => Some(format!("{count} to modify")),
        ChangeType::NoChange => Some(format!("{count} no change")),
        ChangeType::Ignore => None,
    }
}

/// Azure CLI style what-if listing
pub struct PrettyReporter {
    /// Use colored output
    colored: bool,
}

impl PrettyReporter {
    /// Create a new pretty reporter
    #[must_use]
    pub const fn new() -> Self {
        Self { colored: true }
    }

    /// Disable colored output
    #[must_use]
    pub const fn no_color(mut self) -> Self {
        self.colored = false;
        self
    }

    /// Lay out the report without drawing it.
    pub fn lines(&self, result: &OperationResult) -> Result<Vec<PrettyLine>, ReportError> {
        let scopes = organize(result)?;
        let mut out = Layout::default();

        out.text("Note: The result may contain false positive predictions (noise).");
        out.text("You can help us improve the accuracy of the result by opening an issue here: https://aka.ms/WhatIfIssues");
        out.text("This result has been filtered using az-deployment-denoise.");
        out.blank();

        out.text("Resource and property changes are indicated with these symbols:");
        let mut legend: Vec<ChangeSymbol> = symbols_present(result).into_iter().collect();
        legend.sort_by_key(|symbol| symbol.order());
        for symbol in legend {
            out.line(symbol.description(), 1, Marker::Sign(symbol));
        }
        out.blank();

        out.text("The deployment will update the following scope:");
        out.blank();

        for (scope_id, changes) in &scopes {
            out.text(format!("Scope: {scope_id}"));
            out.blank();

            for (change, descriptor) in changes {
                let path = descriptor.path_in_scope.as_str();
                let sign = Marker::Sign(change.change_type.into());
                match change.change_type {
                    ChangeType::Create => {
                        out.line(with_api_version(path, change), 1, sign);
                        out.blank();
                        if let Some(after) = &change.after {
                            out.object(2, &without_resource_group(after));
                        }
                        out.blank();
                    }
                    ChangeType::Delete => {
                        out.line(path, 1, sign);
                        out.blank();
                        if let Some(before) = &change.before {
                            out.object(2, before);
                        }
                        out.blank();
                    }
                    ChangeType::Modify => {
                        out.line(with_api_version(path, change), 1, sign);
                        let mut deltas: Vec<&PropertyChange> =
                            change.delta.iter().flatten().collect();
                        deltas.sort_by_key(|d| ChangeSymbol::from(d.change_type()).order());
                        out.property_changes(2, &deltas);
                        out.blank();
                    }
                    ChangeType::Deploy | ChangeType::NoChange => {
                        out.line(with_api_version(path, change), 1, sign);
                    }
                    ChangeType::Ignore => out.line(path, 1, sign),
                }
            }
        }

        let mut counts: IndexMap<ChangeType, usize> = IndexMap::new();
        for (change, _) in scopes.values().flatten() {
            *counts.entry(change.change_type).or_default() += 1;
        }
        let mut counts: Vec<(ChangeType, usize)> = counts.into_iter().collect();
        counts.sort_by_key(|(change_type, _)| change_order(*change_type));
        let summary = counts
            .into_iter()
            .filter_map(|(change_type, count)| summary_phrase(change_type, count))
            .collect::<Vec<_>>()
            .join(", ");
        out.blank();
        out.text(format!("Resource changes: {summary}."));

        Ok(out.lines)
    }
}

impl Default for PrettyReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for PrettyReporter {
    fn generate_report(&self, result: &OperationResult) -> Result<String, ReportError> {
        let mut report = self
            .lines(result)?
            .iter()
            .map(|line| line.render(self.colored))
            .collect::<Vec<_>>()
            .join("\n");
        report.push('\n');
        Ok(report)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Pretty
    }
}
