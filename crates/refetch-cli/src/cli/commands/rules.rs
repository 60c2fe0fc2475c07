//! `refetch rules` – edit the ordered intercept rule list.

use crate::cli::RulesAction;
use anyhow::Result;
use refetch_core::rules::InterceptRule;
use refetch_core::settings::SettingsStore;

pub fn run_rules(store: &SettingsStore, extension: &str, action: RulesAction) -> Result<()> {
    match action {
        RulesAction::List => {
            let cfg = store.snapshot(extension);
            if cfg.intercept_rules.is_empty() {
                println!("no intercept rules for {}", extension);
            }
            for (i, rule) in cfg.intercept_rules.iter().enumerate() {
                let note = match InterceptRule::parse(rule) {
                    InterceptRule::Regex { .. } => "regex",
                    InterceptRule::Substring { .. } => "substring",
                    InterceptRule::Invalid { .. } => "invalid regex, never matches",
                };
                println!("{:>3}  {}  ({})", i + 1, rule, note);
            }
        }
        RulesAction::Add { rule } => {
            if let InterceptRule::Invalid { .. } = InterceptRule::parse(&rule) {
                anyhow::bail!("rule {} is not a valid regular expression", rule);
            }
            let mut added = false;
            store.update(extension, |cfg| added = add_rule(&mut cfg.intercept_rules, &rule));
            if added {
                store.save()?;
                println!("added rule {}", rule);
            } else {
                println!("rule {} already present", rule);
            }
        }
        RulesAction::Remove { rule } => {
            let mut removed = false;
            store.update(extension, |cfg| {
                removed = remove_rule(&mut cfg.intercept_rules, &rule)
            });
            if !removed {
                anyhow::bail!("no rule {} for {}", rule, extension);
            }
            store.save()?;
            println!("removed rule {}", rule);
        }
    }
    Ok(())
}

/// Appends `rule` unless an identical entry exists. Returns true if added.
fn add_rule(rules: &mut Vec<String>, rule: &str) -> bool {
    if rules.iter().any(|r| r == rule) {
        return false;
    }
    rules.push(rule.to_string());
    true
}

fn remove_rule(rules: &mut Vec<String>, rule: &str) -> bool {
    let before = rules.len();
    rules.retain(|r| r != rule);
    rules.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_skips_duplicates_and_keeps_order() {
        let mut rules = vec!["api.example.com".to_string()];
        assert!(add_rule(&mut rules, "/v1/chat$/"));
        assert!(!add_rule(&mut rules, "api.example.com"));
        assert_eq!(rules, vec!["api.example.com", "/v1/chat$/"]);
    }

    #[test]
    fn remove_exact_text_only() {
        let mut rules = vec!["api.example.com".to_string(), "/v1/chat$/".to_string()];
        assert!(!remove_rule(&mut rules, "API.example.com"));
        assert!(remove_rule(&mut rules, "api.example.com"));
        assert_eq!(rules, vec!["/v1/chat$/"]);
    }
}
