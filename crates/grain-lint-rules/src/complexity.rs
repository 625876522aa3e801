//! Complexity metrics and the threshold rules built on them.
//!
//! # Metrics
//!
//! For each function-like node:
//!
//! - line count: last line of the body minus its first line, inclusive
//! - parameter count: top-level declared parameters (destructured and rest
//!   parameters count as one each)
//! - nesting depth: deepest chain of `if`/loop/`switch`/`try` blocks;
//!   `else if` continues the chain instead of deepening it, and nested
//!   functions start over at zero
//! - cyclomatic complexity: 1, plus one per `if`, loop, `case` (not
//!   `default`), `&&`, `||`, ternary and `catch`; nested functions are
//!   measured on their own
//!
//! For the whole file: lines that contain code, ignoring blank and
//! comment-only lines.
//!
//! # Configuration
//!
//! Each rule takes `max` (defaults: lines 20, params 3, nesting 2,
//! cyclomatic 5, file lines 200). A value equal to the maximum passes.

use grain_lint_core::message::{FormatError, Message, MessageTemplate};
use grain_lint_core::syntax::{is_function_like, named_children, Preorder};
use grain_lint_core::{FileContext, Location, Reporter, Rule, Severity, SourceTree, Violation};
use tree_sitter::Node;

/// Default limits for the complexity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityLimits {
    /// Maximum lines in a function body.
    pub max_function_lines: usize,
    /// Maximum declared parameters.
    pub max_params: usize,
    /// Maximum nesting depth.
    pub max_nesting: usize,
    /// Maximum cyclomatic complexity.
    pub max_complexity: usize,
    /// Maximum code lines in a file.
    pub max_file_lines: usize,
}

impl Default for ComplexityLimits {
    fn default() -> Self {
        Self {
            max_function_lines: 20,
            max_params: 3,
            max_nesting: 2,
            max_complexity: 5,
            max_file_lines: 200,
        }
    }
}

/// Measurements for one function-like node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetrics {
    /// Best-effort name, `<anonymous>` when none can be derived.
    pub name: String,
    /// 1-indexed line of the function start.
    pub line: usize,
    /// Body lines, inclusive.
    pub line_count: usize,
    /// Declared parameters.
    pub param_count: usize,
    /// Deepest block nesting.
    pub max_nesting: usize,
    /// Cyclomatic complexity, at least 1.
    pub cyclomatic: usize,
}

fn function_name(tree: &SourceTree<'_>, node: Node<'_>) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        return tree.text(name).to_string();
    }
    node.parent()
        .and_then(|parent| match parent.kind() {
            "variable_declarator" => parent.child_by_field_name("name"),
            "pair" => parent.child_by_field_name("key"),
            "assignment_expression" => parent.child_by_field_name("left"),
            _ => None,
        })
        .map_or_else(|| "<anonymous>".to_string(), |n| tree.text(n).to_string())
}

fn param_count(node: Node<'_>) -> usize {
    if node.child_by_field_name("parameter").is_some() {
        return 1;
    }
    node.child_by_field_name("parameters")
        .map_or(0, |params| {
            named_children(params)
                .into_iter()
                .filter(|p| p.kind() != "comment")
                .count()
        })
}

fn is_nesting_construct(node: Node<'_>) -> bool {
    match node.kind() {
        "if_statement" => node.parent().map_or(true, |p| p.kind() != "else_clause"),
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
        | "switch_statement" | "try_statement" => true,
        _ => false,
    }
}

/// Deepest nesting below `body`. Nested functions are not entered.
fn nesting_depth(body: Node<'_>) -> usize {
    let mut max = 0;
    let mut stack = vec![(body, 0)];
    while let Some((node, depth)) = stack.pop() {
        max = max.max(depth);
        for child in named_children(node) {
            if is_function_like(child.kind()) {
                continue;
            }
            let child_depth = depth + usize::from(is_nesting_construct(child));
            stack.push((child, child_depth));
        }
    }
    max
}

fn is_decision_point(tree: &SourceTree<'_>, node: Node<'_>) -> bool {
    match node.kind() {
        "if_statement" | "for_statement" | "for_in_statement" | "while_statement"
        | "do_statement" | "switch_case" | "ternary_expression" | "catch_clause" => true,
        "binary_expression" => node
            .child_by_field_name("operator")
            .is_some_and(|op| matches!(tree.text(op), "&&" | "||")),
        _ => false,
    }
}

fn decision_points(tree: &SourceTree<'_>, body: Node<'_>) -> usize {
    let mut count = 0;
    let mut stack = vec![body];
    while let Some(node) = stack.pop() {
        for child in named_children(node) {
            if is_function_like(child.kind()) {
                continue;
            }
            count += usize::from(is_decision_point(tree, child));
            stack.push(child);
        }
    }
    count
}

/// Measures one function-like node.
#[must_use]
pub fn measure_function(tree: &SourceTree<'_>, node: Node<'_>) -> FunctionMetrics {
    let body = node.child_by_field_name("body").unwrap_or(node);
    let line_count = body.end_position().row - body.start_position().row + 1;
    FunctionMetrics {
        name: function_name(tree, node),
        line: node.start_position().row + 1,
        line_count,
        param_count: param_count(node),
        max_nesting: nesting_depth(body),
        cyclomatic: 1 + decision_points(tree, body),
    }
}

/// Measures every function-like node in the file, outermost first.
#[must_use]
pub fn function_metrics<'t>(tree: &'t SourceTree<'_>) -> Vec<(Node<'t>, FunctionMetrics)> {
    Preorder::new(tree.root())
        .filter(|n| n.is_named() && is_function_like(n.kind()))
        .map(|n| (n, measure_function(tree, n)))
        .collect()
}

/// Counts lines containing code, skipping blank and comment-only lines.
#[must_use]
pub fn code_line_count(source: &str) -> usize {
    let mut in_block = false;
    let mut count = 0;
    for line in source.lines() {
        let mut rest = line.trim();
        let mut has_code = false;
        while !rest.is_empty() {
            if in_block {
                match rest.find("*/") {
                    Some(end) => {
                        in_block = false;
                        rest = rest[end + 2..].trim_start();
                    }
                    None => rest = "",
                }
                continue;
            }
            match (rest.find("//"), rest.find("/*")) {
                (Some(line_start), block) if block.map_or(true, |b| line_start < b) => {
                    has_code |= !rest[..line_start].trim().is_empty();
                    rest = "";
                }
                (_, Some(block_start)) => {
                    has_code |= !rest[..block_start].trim().is_empty();
                    in_block = true;
                    rest = &rest[block_start + 2..];
                }
                (_, None) => {
                    has_code = true;
                    rest = "";
                }
            }
        }
        count += usize::from(has_code);
    }
    count
}

/// Which measurement a [`ComplexityRule`] enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// `max-function-lines`
    FunctionLines,
    /// `max-params`
    Params,
    /// `max-nesting`
    Nesting,
    /// `cyclomatic-complexity`
    Cyclomatic,
    /// `max-file-lines`
    FileLines,
}

/// Every metric, in catalogue order.
pub const ALL_METRICS: [Metric; 5] = [
    Metric::FunctionLines,
    Metric::Params,
    Metric::Nesting,
    Metric::Cyclomatic,
    Metric::FileLines,
];

const TOO_MANY_LINES: MessageTemplate = MessageTemplate::new(
    "tooManyLines",
    "Function {{name}} has {{count}} lines (max: {{max}}).\n\
     Long functions mix several steps and are hard to test in isolation.\n\
     Fix: extract each step into a named pipe and compose them.",
);
const TOO_MANY_PARAMS: MessageTemplate = MessageTemplate::new(
    "tooManyParams",
    "Function {{name}} has {{count}} parameters (max: {{max}}).\n\
     Long positional parameter lists are easy to call in the wrong order.\n\
     Fix: accept a single options object: fn({ a, b, c, d }).",
);
const TOO_DEEPLY_NESTED: MessageTemplate = MessageTemplate::new(
    "tooDeeplyNested",
    "Function {{name}} nests blocks {{count}} levels deep (max: {{max}}).\n\
     Deep nesting hides the happy path behind branches.\n\
     Fix: return early, or move inner blocks into their own functions.",
);
const TOO_COMPLEX: MessageTemplate = MessageTemplate::new(
    "tooComplex",
    "Function {{name}} has cyclomatic complexity {{count}} (max: {{max}}).\n\
     Every branch doubles the cases a reader and a test must cover.\n\
     Fix: replace condition chains with a lookup table or split the function.",
);
const FILE_TOO_LONG: MessageTemplate = MessageTemplate::new(
    "fileTooLong",
    "File has {{count}} lines of code (max: {{max}}).\n\
     Large modules usually hold more than one responsibility.\n\
     Fix: split the file by responsibility and re-export from an index.",
);

static LINES_MESSAGES: [MessageTemplate; 1] = [TOO_MANY_LINES];
static PARAMS_MESSAGES: [MessageTemplate; 1] = [TOO_MANY_PARAMS];
static NESTING_MESSAGES: [MessageTemplate; 1] = [TOO_DEEPLY_NESTED];
static COMPLEXITY_MESSAGES: [MessageTemplate; 1] = [TOO_COMPLEX];
static FILE_MESSAGES: [MessageTemplate; 1] = [FILE_TOO_LONG];

impl Metric {
    /// Rule name enforcing this metric.
    #[must_use]
    pub const fn rule_name(self) -> &'static str {
        match self {
            Self::FunctionLines => "max-function-lines",
            Self::Params => "max-params",
            Self::Nesting => "max-nesting",
            Self::Cyclomatic => "cyclomatic-complexity",
            Self::FileLines => "max-file-lines",
        }
    }

    /// Default maximum from [`ComplexityLimits`].
    #[must_use]
    pub fn default_max(self) -> usize {
        let limits = ComplexityLimits::default();
        match self {
            Self::FunctionLines => limits.max_function_lines,
            Self::Params => limits.max_params,
            Self::Nesting => limits.max_nesting,
            Self::Cyclomatic => limits.max_complexity,
            Self::FileLines => limits.max_file_lines,
        }
    }

    const fn description(self) -> &'static str {
        match self {
            Self::FunctionLines => "Limits the number of lines in a function body",
            Self::Params => "Limits the number of declared parameters",
            Self::Nesting => "Limits block nesting depth inside a function",
            Self::Cyclomatic => "Limits cyclomatic complexity of a function",
            Self::FileLines => "Limits the number of code lines in a file",
        }
    }

    fn messages(self) -> &'static [MessageTemplate] {
        match self {
            Self::FunctionLines => &LINES_MESSAGES,
            Self::Params => &PARAMS_MESSAGES,
            Self::Nesting => &NESTING_MESSAGES,
            Self::Cyclomatic => &COMPLEXITY_MESSAGES,
            Self::FileLines => &FILE_MESSAGES,
        }
    }

    fn template(self) -> MessageTemplate {
        match self {
            Self::FunctionLines => TOO_MANY_LINES,
            Self::Params => TOO_MANY_PARAMS,
            Self::Nesting => TOO_DEEPLY_NESTED,
            Self::Cyclomatic => TOO_COMPLEX,
            Self::FileLines => FILE_TOO_LONG,
        }
    }

    fn value(self, metrics: &FunctionMetrics) -> usize {
        match self {
            Self::FunctionLines => metrics.line_count,
            Self::Params => metrics.param_count,
            Self::Nesting => metrics.max_nesting,
            Self::Cyclomatic => metrics.cyclomatic,
            Self::FileLines => 0,
        }
    }
}

/// Reports values of one [`Metric`] above a maximum.
#[derive(Debug, Clone)]
pub struct ComplexityRule {
    metric: Metric,
    max: usize,
    severity: Severity,
}

impl ComplexityRule {
    /// Creates a rule for `metric` with its default maximum.
    #[must_use]
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            max: metric.default_max(),
            severity: Severity::Warning,
        }
    }

    /// Sets the maximum allowed value.
    #[must_use]
    pub fn max(mut self, max: usize) -> Self {
        self.max = max;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// The enforced metric.
    #[must_use]
    pub fn metric(&self) -> Metric {
        self.metric
    }
}

impl Rule for ComplexityRule {
    fn name(&self) -> &'static str {
        self.metric.rule_name()
    }

    fn description(&self) -> &'static str {
        self.metric.description()
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn messages(&self) -> &'static [MessageTemplate] {
        self.metric.messages()
    }

    fn check(&self, ctx: &FileContext, tree: &SourceTree) -> Result<Vec<Violation>, FormatError> {
        let mut reporter =
            Reporter::new(self.metric.rule_name(), self.severity, ctx).doc_ref("#complexity");

        if self.metric == Metric::FileLines {
            let count = code_line_count(tree.source());
            if count > self.max {
                reporter.report_at(
                    Location::new(ctx.relative_path.clone(), 1, 1),
                    Message::new(FILE_TOO_LONG)
                        .arg("count", count)
                        .arg("max", self.max),
                    None,
                )?;
            }
            return Ok(reporter.finish());
        }

        for (node, metrics) in function_metrics(tree) {
            let value = self.metric.value(&metrics);
            if value > self.max {
                tracing::debug!(
                    rule = self.metric.rule_name(),
                    function = %metrics.name,
                    value,
                    max = self.max,
                    "threshold exceeded"
                );
                reporter.report(
                    node,
                    Message::new(self.metric.template())
                        .arg("name", &metrics.name)
                        .arg("count", value)
                        .arg("max", self.max),
                )?;
            }
        }
        Ok(reporter.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{check, ids};
    use grain_lint_core::Dialect;
    use std::fmt::Write;

    fn metrics(src: &str) -> Vec<FunctionMetrics> {
        let tree = SourceTree::parse_as(Dialect::TypeScript, src).unwrap();
        function_metrics(&tree).into_iter().map(|(_, m)| m).collect()
    }

    fn function_with_body_lines(n: usize) -> String {
        let mut src = String::from("function long() {\n");
        for i in 0..n.saturating_sub(2) {
            let _ = writeln!(src, "  const v{i} = {i};");
        }
        src.push_str("}\n");
        src
    }

    fn all_rules(src: &str) -> Vec<Violation> {
        ALL_METRICS
            .iter()
            .flat_map(|m| check(&ComplexityRule::new(*m), "src/pipes/a.pipe.ts", src))
            .collect()
    }

    #[test]
    fn straight_line_function_has_complexity_one() {
        let m = metrics("function f(a: number) { return a + 1; }");
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].cyclomatic, 1);
        assert_eq!(m[0].max_nesting, 0);
        assert_eq!(m[0].param_count, 1);
        assert_eq!(m[0].line_count, 1);
        assert_eq!(m[0].name, "f");
    }

    #[test]
    fn decision_points_are_counted() {
        let src = r"
const f = (a, b) => {
  if (a && b) { return 1; }
  for (const x of b) { if (x || a) { return x; } }
  switch (a) { case 1: return 1; case 2: return 2; default: return 0; }
  const y = a ? 1 : 2;
  try { g(); } catch (e) { return y; }
};
";
        let m = metrics(src);
        // if, &&, for, if, ||, two cases, ternary, catch
        assert_eq!(m[0].cyclomatic, 10);
        assert_eq!(m[0].name, "f");
    }

    #[test]
    fn else_if_does_not_deepen_nesting() {
        let src = r"
function f(a) {
  if (a === 1) {
    return 1;
  } else if (a === 2) {
    return 2;
  } else if (a === 3) {
    if (b) { return 3; }
  }
  return 0;
}
";
        assert_eq!(metrics(src)[0].max_nesting, 2);
    }

    #[test]
    fn nested_functions_are_measured_separately() {
        let src = r"
function outer() {
  if (a) {
    const inner = () => { if (b) { if (c) { return 1; } } };
  }
}
";
        let m = metrics(src);
        assert_eq!(m.len(), 2);
        assert_eq!((m[0].max_nesting, m[0].cyclomatic), (1, 2));
        assert_eq!((m[1].max_nesting, m[1].cyclomatic), (2, 3));
        assert_eq!(m[1].name, "inner");
    }

    #[test]
    fn params_count_top_level_only() {
        let m = metrics("function f({ a, b }: P, [c, d]: Q, ...rest: R[]) {}\nconst g = x => x;");
        assert_eq!(m[0].param_count, 3);
        assert_eq!(m[1].param_count, 1);
    }

    #[test]
    fn function_line_threshold_is_strict() {
        let at_limit = function_with_body_lines(20);
        assert_eq!(metrics(&at_limit)[0].line_count, 20);
        assert!(check(&ComplexityRule::new(Metric::FunctionLines), "a.ts", &at_limit).is_empty());
        let over = function_with_body_lines(21);
        assert_eq!(
            ids(&check(&ComplexityRule::new(Metric::FunctionLines), "a.ts", &over)),
            vec!["tooManyLines"]
        );
    }

    #[test]
    fn param_threshold_is_strict() {
        let rule = ComplexityRule::new(Metric::Params);
        assert!(check(&rule, "a.ts", "function f(a, b, c) {}").is_empty());
        assert_eq!(ids(&check(&rule, "a.ts", "function f(a, b, c, d) {}")), vec!["tooManyParams"]);
    }

    #[test]
    fn nesting_threshold_is_strict() {
        let rule = ComplexityRule::new(Metric::Nesting);
        assert!(check(&rule, "a.ts", "function f() { if (a) { while (b) { g(); } } }").is_empty());
        let deep = "function f() { if (a) { while (b) { for (;;) { g(); } } } }";
        assert_eq!(ids(&check(&rule, "a.ts", deep)), vec!["tooDeeplyNested"]);
    }

    #[test]
    fn cyclomatic_threshold_is_strict() {
        let rule = ComplexityRule::new(Metric::Cyclomatic);
        let five = "function f() { if (a) {} if (b) {} if (c) {} if (d) {} }";
        assert!(check(&rule, "a.ts", five).is_empty());
        let six = "function f() { if (a) {} if (b) {} if (c) {} if (d) {} if (e) {} }";
        assert_eq!(ids(&check(&rule, "a.ts", six)), vec!["tooComplex"]);
    }

    #[test]
    fn file_line_threshold_is_strict() {
        let rule = ComplexityRule::new(Metric::FileLines);
        let lines = |n: usize| (0..n).map(|i| format!("export const v{i} = {i};\n")).collect::<String>();
        assert!(check(&rule, "a.ts", &lines(200)).is_empty());
        let v = check(&rule, "a.ts", &lines(201));
        assert_eq!(ids(&v), vec!["fileTooLong"]);
        assert_eq!(v[0].data.get("count").map(String::as_str), Some("201"));
    }

    #[test]
    fn comments_and_blank_lines_do_not_count() {
        let src = "// header\n\n/* block\n   comment */\nconst a = 1; // trailing\n/* x */ const b = 2;\n";
        assert_eq!(code_line_count(src), 2);
    }

    #[test]
    fn block_comment_opened_after_code_is_tracked() {
        assert_eq!(code_line_count("const a = 1; /*\n comment\n comment\n */\n"), 1);
        assert_eq!(code_line_count("const a = 1; /* x */ const b = 2;\n// c\n"), 1);
        assert_eq!(code_line_count("/* a */ /* b\n*/ const c = 3;\n"), 1);
    }

    #[test]
    fn bare_declaration_and_expression_are_one_function_each() {
        let m = metrics("function f() {}");
        assert_eq!(m.len(), 1);
        assert_eq!((m[0].name.as_str(), m[0].param_count, m[0].cyclomatic), ("f", 0, 1));
        let m = metrics("const g = function (a, b) { return a; };");
        assert_eq!(m.len(), 1);
        assert_eq!((m[0].name.as_str(), m[0].param_count), ("g", 2));
    }

    #[test]
    fn one_function_reports_once_per_metric() {
        let rule = ComplexityRule::new(Metric::Cyclomatic).max(0);
        assert_eq!(ids(&check(&rule, "a.ts", "function f(a) {}")), vec!["tooComplex"]);
    }

    #[test]
    fn long_logical_chain_is_measured_on_a_small_stack() {
        let operands: Vec<String> = (0..3000).map(|i| format!("a{i}")).collect();
        let src = format!("function f() {{ return {}; }}\n", operands.join(" && "));
        let measured = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || {
                let m = metrics(&src);
                (m.len(), m[0].cyclomatic, m[0].max_nesting)
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(measured, (1, 3000, 0));
    }

    #[test]
    fn long_flat_function_fails_only_the_line_rule() {
        let v = all_rules(&function_with_body_lines(27));
        assert_eq!(ids(&v), vec!["tooManyLines"]);
        assert_eq!(v[0].rule_id, "grain/max-function-lines");
    }

    #[test]
    fn configured_max_is_respected() {
        let rule = ComplexityRule::new(Metric::Params).max(5);
        assert!(check(&rule, "a.ts", "function f(a, b, c, d, e) {}").is_empty());
    }
}
