//! Rule presets for common configurations.

use crate::complexity::{ComplexityRule, Metric, ALL_METRICS};
use crate::{
    FileLocation, FileNaming, LayerDependencies, NoAsyncOutsideIo, NoBannedImports,
    NoDefaultExport, NoDeprecatedImports, NoEval, NoInnerHtml, NoMutation, NoObjectMutation,
    NoPromiseMethods, NoReactInPureLayers, NoSensitiveLogging, NoSideEffectsInPipes,
    NoStoreInViews, NoThrow, NoTryCatch,
};
use grain_lint_core::{Config, RuleBox};
use std::fmt;
use std::str::FromStr;

/// Preset configurations for grain-lint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every rule except the opt-in ones, strict dependency table.
    #[default]
    Strict,
    /// Same rules as strict, relaxed dependency table for codebases
    /// mid-migration.
    Legacy,
    /// Architecture, purity, security and mutation rules plus complexity
    /// warnings.
    Recommended,
    /// Layer boundaries and the two injection rules, for gradual adoption.
    Minimal,
}

/// Every preset, in documentation order.
pub const ALL_PRESETS: [Preset; 4] = [
    Preset::Strict,
    Preset::Legacy,
    Preset::Recommended,
    Preset::Minimal,
];

/// Error for an unrecognized preset name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset `{0}`; expected strict, legacy, recommended or minimal")]
pub struct UnknownPreset(pub String);

impl Preset {
    /// Name used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Legacy => "legacy",
            Self::Recommended => "recommended",
            Self::Minimal => "minimal",
        }
    }

    /// Parses a preset name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_PRESETS
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    /// Names of the rules this preset enables.
    #[must_use]
    pub fn rule_names(self) -> Vec<&'static str> {
        match self {
            Self::Strict | Self::Legacy => ALL_RULE_NAMES
                .into_iter()
                .filter(|name| !OPT_IN.contains(name))
                .collect(),
            Self::Recommended => RECOMMENDED.to_vec(),
            Self::Minimal => MINIMAL.to_vec(),
        }
    }

    /// Whether the preset selects the strict dependency table.
    #[must_use]
    pub fn strict_layers(self) -> bool {
        self != Self::Legacy
    }

    /// Returns the rules for this preset with default options.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        self.rules_with_config(&Config::default())
    }

    /// Returns the rules for this preset, applying rule options from
    /// `config`. A rule outside the preset joins it when its config block
    /// sets `enabled = true`.
    ///
    /// Disabling and severity overrides are left to the analyzer, which
    /// reads the same configuration.
    #[must_use]
    pub fn rules_with_config(self, config: &Config) -> Vec<RuleBox> {
        let names = self.rule_names();
        let opted_in = |name: &str| config.rule(name).is_some_and(|rc| rc.enabled == Some(true));
        configured_rules(config, self.strict_layers() && config.architecture.strict)
            .into_iter()
            .filter(|rule| names.contains(&rule.name()) || opted_in(rule.name()))
            .collect()
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

/// Every rule name, in catalogue order.
pub const ALL_RULE_NAMES: [&str; 23] = [
    crate::layer_dependencies::NAME,
    crate::no_react_in_pure_layers::NAME,
    crate::no_side_effects_in_pipes::NAME,
    crate::no_mutation::NAME,
    crate::no_object_mutation::NAME,
    crate::no_try_catch::NAME,
    crate::no_throw::NAME,
    crate::no_promise_methods::NAME,
    crate::no_eval::NAME,
    crate::no_innerhtml::NAME,
    crate::no_sensitive_logging::NAME,
    Metric::FunctionLines.rule_name(),
    Metric::Params.rule_name(),
    Metric::Nesting.rule_name(),
    Metric::Cyclomatic.rule_name(),
    Metric::FileLines.rule_name(),
    crate::no_banned_imports::NAME,
    crate::no_default_export::NAME,
    crate::file_location::NAME,
    crate::no_store_in_views::NAME,
    crate::no_async_outside_io::NAME,
    crate::no_deprecated_imports::NAME,
    crate::file_naming::NAME,
];

/// Rules no preset enables; a config block with `enabled = true` adds them.
pub const OPT_IN: [&str; 1] = [crate::no_deprecated_imports::NAME];

const RECOMMENDED: [&str; 15] = [
    crate::layer_dependencies::NAME,
    crate::no_react_in_pure_layers::NAME,
    crate::no_store_in_views::NAME,
    crate::no_side_effects_in_pipes::NAME,
    crate::no_mutation::NAME,
    crate::no_object_mutation::NAME,
    crate::no_eval::NAME,
    crate::no_innerhtml::NAME,
    crate::no_sensitive_logging::NAME,
    crate::no_banned_imports::NAME,
    Metric::FunctionLines.rule_name(),
    Metric::Params.rule_name(),
    Metric::Nesting.rule_name(),
    Metric::Cyclomatic.rule_name(),
    Metric::FileLines.rule_name(),
];

const MINIMAL: [&str; 4] = [
    crate::layer_dependencies::NAME,
    crate::no_react_in_pure_layers::NAME,
    crate::no_eval::NAME,
    crate::no_innerhtml::NAME,
];

/// Builds every rule with the options found under `[rules.<name>]`.
///
/// `strict_default` selects the dependency table unless
/// `[rules.layer-dependencies] strict` overrides it.
#[must_use]
pub fn configured_rules(config: &Config, strict_default: bool) -> Vec<RuleBox> {
    let bool_option = |rule: &str, key: &str, default: bool| {
        config
            .rule(rule)
            .map_or(default, |rc| rc.get_bool(key, default))
    };

    let mut rules: Vec<RuleBox> = vec![
        Box::new(LayerDependencies::new().strict(bool_option(
            crate::layer_dependencies::NAME,
            "strict",
            strict_default,
        ))),
        Box::new(NoReactInPureLayers::new()),
        Box::new(NoSideEffectsInPipes::new()),
        Box::new(NoMutation::new()),
        Box::new(NoObjectMutation::new()),
        Box::new(NoTryCatch::new().allow_in_tests(bool_option(
            crate::no_try_catch::NAME,
            "allow_in_tests",
            false,
        ))),
        Box::new(NoThrow::new().allow_in_tests(bool_option(
            crate::no_throw::NAME,
            "allow_in_tests",
            false,
        ))),
        Box::new(NoPromiseMethods::new()),
        Box::new(NoEval::new()),
        Box::new(NoInnerHtml::new()),
        Box::new(NoSensitiveLogging::new()),
    ];

    for metric in ALL_METRICS {
        let max = config
            .rule(metric.rule_name())
            .map_or(metric.default_max(), |rc| rc.get_usize("max", metric.default_max()));
        rules.push(Box::new(ComplexityRule::new(metric).max(max)));
    }

    rules.push(Box::new(NoBannedImports::new()));
    rules.push(Box::new(NoDefaultExport::new()));
    rules.push(Box::new(FileLocation::new()));
    rules.push(Box::new(NoStoreInViews::new()));

    let async_rule = NoAsyncOutsideIo::new();
    let allow_layers = config
        .rule(crate::no_async_outside_io::NAME)
        .map(|rc| rc.get_str_array("allow_layers"))
        .filter(|layers| !layers.is_empty());
    rules.push(Box::new(match allow_layers {
        Some(layers) => async_rule.allow_layer_names(layers),
        None => async_rule,
    }));

    rules.push(Box::new(NoDeprecatedImports::new()));
    rules.push(Box::new(FileNaming::new()));
    rules
}

/// Returns all available rules with default options.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    configured_rules(&Config::default(), true)
}
