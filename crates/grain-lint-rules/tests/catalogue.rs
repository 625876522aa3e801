//! Integration test: the message catalogue of every built-in rule.
//!
//! A template with a stray or unterminated placeholder would only fail at
//! report time, so every template is parsed here up front.

use grain_lint_core::message::{FormatError, MessageData};
use grain_lint_rules::{all_rules, ALL_RULE_NAMES};
use std::collections::HashSet;
use std::fmt::Write;

#[test]
fn every_template_parses() {
    for rule in all_rules() {
        for template in rule.messages() {
            assert!(
                template.required_fields().is_ok(),
                "{}: template {} does not parse",
                rule.name(),
                template.id
            );
        }
    }
}

#[test]
fn every_template_renders_once_its_fields_are_supplied() {
    for rule in all_rules() {
        let catalog = rule.catalog();
        for template in catalog.templates() {
            let fields = template.required_fields().unwrap();
            let mut data = MessageData::new();
            for field in &fields {
                data.insert((*field).to_string(), format!("<{field}>"));
            }
            let text = catalog.format(template.id, &data).unwrap();
            assert!(!text.contains("{{"), "{}: {}", rule.name(), template.id);

            if let Some(first) = fields.first() {
                data.remove(*first);
                assert!(matches!(
                    catalog.format(template.id, &data),
                    Err(FormatError::MissingField { .. })
                ));
            }
        }
        assert_eq!(
            catalog.format("noSuchMessage", &MessageData::new()),
            Err(FormatError::UnknownMessage("noSuchMessage".to_string()))
        );
    }
}

#[test]
fn message_ids_are_unique_within_a_rule() {
    for rule in all_rules() {
        let mut seen = HashSet::new();
        for template in rule.messages() {
            assert!(seen.insert(template.id), "{}: duplicate {}", rule.name(), template.id);
        }
        assert!(!seen.is_empty(), "{} has no messages", rule.name());
    }
}

#[test]
fn rule_names_are_unique_and_namespaced() {
    let rules = all_rules();
    let names: HashSet<_> = rules.iter().map(|r| r.name()).collect();
    assert_eq!(names.len(), rules.len());
    assert_eq!(names.len(), ALL_RULE_NAMES.len());
    for rule in &rules {
        assert_eq!(rule.id(), format!("grain/{}", rule.name()));
        assert!(!rule.description().is_empty());
    }
}

#[test]
fn message_catalogue() {
    let mut catalogue = String::new();
    for rule in all_rules() {
        let ids: Vec<&str> = rule.messages().iter().map(|t| t.id).collect();
        let _ = writeln!(
            catalogue,
            "{} [{}]: {}",
            rule.name(),
            rule.default_severity(),
            ids.join(", ")
        );
    }
    insta::assert_snapshot!("message_catalogue", catalogue);
}
