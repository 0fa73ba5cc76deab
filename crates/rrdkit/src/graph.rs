//! Graph templates and render argument construction.
//!
//! A [`GraphTemplate`] is a declarative chart description: static engine
//! arguments, color and font directives, data definitions (DEF/CDEF/VDEF),
//! and post-processing script commands (LINE, AREA, GPRINT, ...). At render
//! time a [`SubstitutionContext`] can turn a single template element into
//! one command fragment per context value, which is how one declared line
//! becomes a line per interface, per disk, per whatever the caller feeds in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named color directive (`-c <name><value>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphColor {
    /// Engine color name (e.g. `BACK`, `CANVAS`).
    pub name: String,
    /// Color value, usually `#rrggbb`, concatenated directly to the name.
    pub value: String,
}

impl GraphColor {
    /// Creates a color directive.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A font directive (`--font <name>:<size>:<family>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFont {
    /// Engine font element name (e.g. `TITLE`, `AXIS`).
    pub name: String,
    /// Point size.
    pub size: u32,
    /// Font family.
    pub family: String,
}

impl GraphFont {
    /// Creates a font directive.
    #[must_use]
    pub fn new(name: impl Into<String>, size: u32, family: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            family: family.into(),
        }
    }
}

/// Kind of a data definition element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataKind {
    /// Fetch a data source from a database.
    Def,
    /// Derive a series from others via RPN.
    Cdef,
    /// Reduce a series to a single value.
    Vdef,
}

impl DataKind {
    /// Engine spelling of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Def => "DEF",
            Self::Cdef => "CDEF",
            Self::Vdef => "VDEF",
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data definition element, serialized as `<KIND>:<name>=<value>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    /// DEF, CDEF, or VDEF.
    pub kind: DataKind,
    /// Variable name, possibly containing placeholder keys.
    pub name: String,
    /// Value expression, possibly containing placeholder keys.
    pub value: String,
}

impl DataElement {
    /// Creates a data element.
    #[must_use]
    pub fn new(kind: DataKind, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A script command element, serialized as `<directive>:<value>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCommand {
    /// Engine directive (LINE1, AREA, GPRINT, COMMENT, ...).
    pub directive: String,
    /// Directive value, possibly containing placeholder keys.
    pub value: String,
}

impl ScriptCommand {
    /// Creates a script command.
    #[must_use]
    pub fn new(directive: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            directive: directive.into(),
            value: value.into(),
        }
    }
}

/// A declarative chart description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphTemplate {
    /// Literal engine arguments passed through verbatim, first.
    #[serde(default)]
    pub static_args: Vec<String>,
    /// Ordered color directives.
    #[serde(default)]
    pub colors: Vec<GraphColor>,
    /// Ordered font directives.
    #[serde(default)]
    pub fonts: Vec<GraphFont>,
    /// Ordered data definitions.
    #[serde(default)]
    pub data: Vec<DataElement>,
    /// Ordered script commands.
    #[serde(default)]
    pub script: Vec<ScriptCommand>,
    /// When `false`, forces a legend-free, graph-only render.
    #[serde(default)]
    pub show_legend: bool,
}

impl GraphTemplate {
    /// Creates an empty template with the legend shown.
    #[must_use]
    pub fn new() -> Self {
        Self {
            show_legend: true,
            ..Self::default()
        }
    }

    /// Appends a verbatim static argument.
    #[must_use]
    pub fn static_arg(mut self, arg: impl Into<String>) -> Self {
        self.static_args.push(arg.into());
        self
    }

    /// Appends a color directive.
    #[must_use]
    pub fn color(mut self, color: GraphColor) -> Self {
        self.colors.push(color);
        self
    }

    /// Appends a font directive.
    #[must_use]
    pub fn font(mut self, font: GraphFont) -> Self {
        self.fonts.push(font);
        self
    }

    /// Appends a data element.
    #[must_use]
    pub fn data(mut self, element: DataElement) -> Self {
        self.data.push(element);
        self
    }

    /// Appends a script command.
    #[must_use]
    pub fn script(mut self, command: ScriptCommand) -> Self {
        self.script.push(command);
        self
    }

    /// Sets legend visibility.
    #[must_use]
    pub fn legend(mut self, show: bool) -> Self {
        self.show_legend = show;
        self
    }
}

/// Time range and dimensions for one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Start of the graphed range.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// End of the graphed range.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Image height in pixels.
    pub height: u32,
    /// Image width in pixels.
    pub width: u32,
}

impl RenderOptions {
    /// Creates render options for the given dimensions with an unset range.
    #[must_use]
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            start: None,
            end: None,
            height,
            width,
        }
    }

    /// Sets the range start.
    #[must_use]
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Sets the range end.
    #[must_use]
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }
}

/// Placeholder key → ordered replacement values, supplied per render call.
///
/// Keys iterate in insertion order, which makes the expansion of
/// mixed-length value lists deterministic (the first key whose list length
/// differs from the fragments materialized so far fixes the expansion
/// count). Callers should supply equal-length lists; mixed lengths expand
/// by that first-divergent-key rule and can drop or duplicate trailing
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionContext {
    entries: Vec<(String, Vec<String>)>,
}

impl SubstitutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key with its replacement values.
    ///
    /// Re-inserting an existing key replaces its values in place, keeping
    /// the key's original iteration position.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = values;
        } else {
            self.entries.push((key, values));
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.insert(key, values);
        self
    }

    /// Looks up the values for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Iterates `(key, values)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the context holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any context key appears as a literal substring of
    /// the given text.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|(k, _)| text.contains(k))
    }
}

/// Expands a fragment template into one fragment per context value.
///
/// Keys are visited in insertion order; for each key, the fragment list is
/// seeded with copies of the template whenever its length differs from that
/// key's value count, then every occurrence of the key in fragment `i` is
/// replaced with the key's `i`-th value. With uniform value-list lengths N
/// this yields N fragments with every placeholder resolved.
fn expand_fragment(template: &str, context: &SubstitutionContext) -> Vec<String> {
    let mut fragments: Vec<String> = Vec::new();
    for (key, values) in context.iter() {
        for (index, value) in values.iter().enumerate() {
            if fragments.len() != values.len() {
                fragments.push(template.to_string());
            }
            fragments[index] = fragments[index].replace(key, value);
        }
    }
    fragments
}

/// Appends either the single static fragment or its dynamic expansion.
fn push_element(args: &mut Vec<String>, fragment: String, dynamic: bool, context: &SubstitutionContext) {
    if dynamic {
        args.extend(expand_fragment(&fragment, context));
    } else {
        args.push(fragment);
    }
}

/// Builds the full `graph` argument vector.
///
/// Construction order is significant (later engine flags override earlier
/// ones): output path, static args, range, legend flags, dimensions,
/// colors, fonts, data elements, script commands.
#[must_use]
pub fn graph_args(
    output_path: &Path,
    template: &GraphTemplate,
    options: &RenderOptions,
    context: &SubstitutionContext,
) -> Vec<String> {
    let mut args = vec!["graph".to_string(), output_path.display().to_string()];
    args.extend(template.static_args.iter().cloned());

    if let Some(start) = options.start {
        args.push("--start".to_string());
        args.push(start.timestamp().to_string());
    }
    if let Some(end) = options.end {
        args.push("--end".to_string());
        args.push(end.timestamp().to_string());
    }
    if !template.show_legend {
        args.push("--no-legend".to_string());
        args.push("--only-graph".to_string());
    }
    args.push("--height".to_string());
    args.push(options.height.to_string());
    args.push("--width".to_string());
    args.push(options.width.to_string());
    args.push("--full-size-mode".to_string());

    for color in &template.colors {
        args.push("-c".to_string());
        args.push(format!("{}{}", color.name, color.value));
    }
    for font in &template.fonts {
        args.push("--font".to_string());
        args.push(format!("{}:{}:{}", font.name, font.size, font.family));
    }

    for element in &template.data {
        let dynamic = context.matches(&element.name) || context.matches(&element.value);
        let fragment = format!("{}:{}={}", element.kind, element.name, element.value);
        push_element(&mut args, fragment, dynamic, context);
    }
    for command in &template.script {
        let dynamic = context.matches(&command.directive) || context.matches(&command.value);
        let fragment = format!("{}:{}", command.directive, command.value);
        push_element(&mut args, fragment, dynamic, context);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(args: &[String], needle: &str) -> Vec<usize> {
        args.iter()
            .enumerate()
            .filter_map(|(i, a)| (a == needle).then_some(i))
            .collect()
    }

    #[test]
    fn test_context_insertion_order() {
        let mut context = SubstitutionContext::new();
        context.insert("B", vec!["1".into()]);
        context.insert("A", vec!["2".into()]);
        let keys: Vec<_> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn test_context_reinsert_keeps_position() {
        let mut context = SubstitutionContext::new();
        context.insert("B", vec!["1".into()]);
        context.insert("A", vec!["2".into()]);
        context.insert("B", vec!["3".into()]);
        let keys: Vec<_> = context.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["B", "A"]);
        assert_eq!(context.get("B"), Some(&["3".to_string()][..]));
    }

    #[test]
    fn test_expand_uniform_lengths() {
        let context = SubstitutionContext::new()
            .with("{X}", vec!["a".into(), "b".into()]);
        assert_eq!(
            expand_fragment("DEF:v{X}=foo{X}", &context),
            vec!["DEF:va=fooa", "DEF:vb=foob"]
        );
    }

    #[test]
    fn test_expand_two_keys() {
        let context = SubstitutionContext::new()
            .with("{IF}", vec!["eth0".into(), "eth1".into()])
            .with("{COLOR}", vec!["#ff0000".into(), "#00ff00".into()]);
        assert_eq!(
            expand_fragment("LINE1:{IF}{COLOR}:{IF}", &context),
            vec!["LINE1:eth0#ff0000:eth0", "LINE1:eth1#00ff00:eth1"]
        );
    }

    // Mixed-length lists expand by the first key whose length disagrees
    // with the fragments materialized so far; trailing values of longer
    // later keys spill into extra, partially substituted fragments.
    #[test]
    fn test_expand_mixed_lengths_first_key_wins() {
        let context = SubstitutionContext::new()
            .with("{X}", vec!["a".into(), "b".into()])
            .with("{Y}", vec!["1".into()]);
        let fragments = expand_fragment("{X}-{Y}", &context);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[0], "a-1");
        assert_eq!(fragments[1], "b-{Y}");
        assert_eq!(fragments[2], "{X}-{Y}");
    }

    #[test]
    fn test_static_element_single_fragment() {
        let template = GraphTemplate::new().data(DataElement::new(
            DataKind::Def,
            "in",
            "./net.rrd:in:AVERAGE",
        ));
        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600),
            &SubstitutionContext::new(),
        );
        assert_eq!(
            args.iter().filter(|a| a.starts_with("DEF:")).count(),
            1
        );
        assert!(args.contains(&"DEF:in=./net.rrd:in:AVERAGE".to_string()));
    }

    #[test]
    fn test_dynamic_data_element_expands() {
        let context = SubstitutionContext::new().with("{X}", vec!["a".into(), "b".into()]);
        let template =
            GraphTemplate::new().data(DataElement::new(DataKind::Def, "v{X}", "foo{X}"));
        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600),
            &context,
        );
        assert!(args.contains(&"DEF:va=fooa".to_string()));
        assert!(args.contains(&"DEF:vb=foob".to_string()));
    }

    #[test]
    fn test_legend_hidden_adds_both_flags() {
        let template = GraphTemplate::new().legend(false);
        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600),
            &SubstitutionContext::new(),
        );
        assert!(args.contains(&"--no-legend".to_string()));
        assert!(args.contains(&"--only-graph".to_string()));
    }

    #[test]
    fn test_legend_shown_omits_flags() {
        let template = GraphTemplate::new();
        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600),
            &SubstitutionContext::new(),
        );
        assert!(!args.contains(&"--no-legend".to_string()));
        assert!(!args.contains(&"--only-graph".to_string()));
    }

    #[test]
    fn test_argument_order() {
        let start = chrono::DateTime::from_timestamp(1_000_000_000, 0).expect("valid");
        let end = chrono::DateTime::from_timestamp(1_000_086_400, 0).expect("valid");
        let template = GraphTemplate::new()
            .static_arg("--title")
            .static_arg("Traffic")
            .legend(false)
            .color(GraphColor::new("BACK", "#ffffff"))
            .font(GraphFont::new("TITLE", 12, "DejaVu Sans"))
            .data(DataElement::new(DataKind::Def, "in", "./net.rrd:in:AVERAGE"))
            .script(ScriptCommand::new("LINE1", "in#0000ff:inbound"));

        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600).start(start).end(end),
            &SubstitutionContext::new(),
        );

        assert_eq!(
            args,
            vec![
                "graph",
                "/tmp/out.png",
                "--title",
                "Traffic",
                "--start",
                "1000000000",
                "--end",
                "1000086400",
                "--no-legend",
                "--only-graph",
                "--height",
                "200",
                "--width",
                "600",
                "--full-size-mode",
                "-c",
                "BACK#ffffff",
                "--font",
                "TITLE:12:DejaVu Sans",
                "DEF:in=./net.rrd:in:AVERAGE",
                "LINE1:in#0000ff:inbound",
            ]
        );
    }

    #[test]
    fn test_dynamic_script_command() {
        let context = SubstitutionContext::new()
            .with("{IF}", vec!["eth0".into(), "eth1".into()]);
        let template = GraphTemplate::new()
            .script(ScriptCommand::new("LINE1", "{IF}#0000ff:{IF}"))
            .script(ScriptCommand::new("COMMENT", "static trailer"));
        let args = graph_args(
            Path::new("/tmp/out.png"),
            &template,
            &RenderOptions::new(200, 600),
            &context,
        );
        let line_count = positions(&args, "LINE1:eth0#0000ff:eth0").len()
            + positions(&args, "LINE1:eth1#0000ff:eth1").len();
        assert_eq!(line_count, 2);
        // Static trailer stays a single fragment after the expansion.
        assert_eq!(args.last(), Some(&"COMMENT:static trailer".to_string()));
    }

    #[test]
    fn test_template_serialization_round_trip() {
        let template = GraphTemplate::new()
            .static_arg("--title")
            .color(GraphColor::new("BACK", "#ffffff"))
            .data(DataElement::new(DataKind::Vdef, "peak", "in,MAXIMUM"));
        let json = serde_json::to_string(&template).expect("serialize");
        let parsed: GraphTemplate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, template);
    }
}
