//! Built-in role templates plus directory overrides

use std::path::Path;

use serde::Serialize;

use super::loader::PromptLoader;
use super::render::PromptRenderer;
use crate::domain::Role;
use crate::error::Result;

pub const PRODUCER_SYSTEM: &str = "producer.system";
pub const PRODUCER_USER: &str = "producer.user";
pub const REVIEWER_SYSTEM: &str = "reviewer.system";
pub const REVIEWER_USER: &str = "reviewer.user";

/// Every template name, in display order
pub const TEMPLATE_NAMES: [&str; 4] = [PRODUCER_SYSTEM, PRODUCER_USER, REVIEWER_SYSTEM, REVIEWER_USER];

const BUILTIN_PRODUCER_SYSTEM: &str = r#"You are the code writer in a refinement loop with a code critic.
This is round {{round}} of {{max_rounds}}.

INSTRUCTIONS:
{{#if latest_code_draft}}
- Revise ONLY the CODE_DRAFT below so that it addresses the CRITICAL_FEEDBACK.
- Return the complete revised program, never a diff.
{{else}}
- Write the first complete version of the program described in PROMPT.
{{/if}}
- Output raw code only. No prose, no explanations, no markdown fences.
- Include the imports, environment setup and logging needed to run standalone.
- When you are done, call handoff_to with agent_name "code_critic".
- Never end the loop and never address the user.
"#;

const BUILTIN_PRODUCER_USER: &str = r#"PROMPT:
{{prompt}}
{{#if latest_code_draft}}

CODE_DRAFT:
{{latest_code_draft}}
{{/if}}
{{#if latest_feedback}}

CRITICAL_FEEDBACK:
{{latest_feedback}}
{{/if}}
"#;

const BUILTIN_REVIEWER_SYSTEM: &str = r#"You are the code critic in a refinement loop with a code writer.
This is round {{round}} of {{max_rounds}}.

Review the CODE_DRAFT against this checklist:
{{#each checklist}}
- {{this}}
{{/each}}

RULES:
- If every item passes, respond with exactly PASS and call exit_loop.
- Otherwise respond with "FAIL:" followed by specific, concise fixes, then call handoff_to with agent_name "code_writer".
{{#if final_round}}
- This is the final round. The loop ends after your review whatever you decide.
{{/if}}
- Never respond to the user or to any other peer.
"#;

const BUILTIN_REVIEWER_USER: &str = r#"CODE_DRAFT:
{{latest_code_draft}}
"#;

/// Variables visible to the producer templates
#[derive(Debug, Serialize)]
pub struct ProducerPrompt<'a> {
    pub prompt: &'a str,
    pub latest_code_draft: &'a str,
    pub latest_feedback: &'a str,
    pub round: u32,
    pub max_rounds: u32,
}

/// Variables visible to the reviewer templates
#[derive(Debug, Serialize)]
pub struct ReviewerPrompt<'a> {
    pub latest_code_draft: &'a str,
    pub checklist: &'a [String],
    pub round: u32,
    pub max_rounds: u32,
    pub final_round: bool,
}

/// A system prompt and user message pair ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub system: String,
    pub user: String,
}

/// Role templates registered under their names
pub struct PromptLibrary {
    renderer: PromptRenderer,
    sources: Vec<(&'static str, String)>,
}

impl PromptLibrary {
    /// Library holding only the built-in templates
    pub fn builtin() -> Result<Self> {
        Self::build(|_| Ok(None))
    }

    /// Built-in templates, replaced by any `<name>.md` found in `dir`
    pub fn with_overrides(dir: impl AsRef<Path>) -> Result<Self> {
        let loader = PromptLoader::new(dir);
        log::debug!("loading prompt overrides from {:?}", loader.templates_dir());
        Self::build(|name| loader.load_optional(name))
    }

    fn build(mut lookup: impl FnMut(&str) -> Result<Option<String>>) -> Result<Self> {
        let mut renderer = PromptRenderer::new();
        let mut sources = Vec::with_capacity(TEMPLATE_NAMES.len());

        for name in TEMPLATE_NAMES {
            let source = match lookup(name)? {
                Some(custom) => {
                    log::info!("using prompt override for {}", name);
                    custom
                }
                None => builtin_source(name).to_string(),
            };
            renderer.register_template(name, &source)?;
            sources.push((name, source));
        }

        Ok(Self { renderer, sources })
    }

    /// Template source registered under `name`
    pub fn source(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, s)| s.as_str())
    }

    pub fn render_producer(&self, vars: &ProducerPrompt<'_>) -> Result<RenderedPrompt> {
        self.render_pair(Role::Producer, vars)
    }

    pub fn render_reviewer(&self, vars: &ReviewerPrompt<'_>) -> Result<RenderedPrompt> {
        self.render_pair(Role::Reviewer, vars)
    }

    fn render_pair<T: Serialize>(&self, role: Role, vars: &T) -> Result<RenderedPrompt> {
        let (system, user) = match role {
            Role::Producer => (PRODUCER_SYSTEM, PRODUCER_USER),
            Role::Reviewer => (REVIEWER_SYSTEM, REVIEWER_USER),
        };
        Ok(RenderedPrompt {
            system: self.renderer.render_named(system, vars)?,
            user: self.renderer.render_named(user, vars)?,
        })
    }
}

fn builtin_source(name: &str) -> &'static str {
    match name {
        PRODUCER_SYSTEM => BUILTIN_PRODUCER_SYSTEM,
        PRODUCER_USER => BUILTIN_PRODUCER_USER,
        REVIEWER_SYSTEM => BUILTIN_REVIEWER_SYSTEM,
        _ => BUILTIN_REVIEWER_USER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn producer_vars<'a>(draft: &'a str, feedback: &'a str) -> ProducerPrompt<'a> {
        ProducerPrompt {
            prompt: "add two numbers",
            latest_code_draft: draft,
            latest_feedback: feedback,
            round: 1,
            max_rounds: 5,
        }
    }

    #[test]
    fn test_builtin_registers_every_template() {
        let library = PromptLibrary::builtin().unwrap();
        for name in TEMPLATE_NAMES {
            assert!(library.source(name).is_some(), "missing {}", name);
        }
        assert!(library.source("consolidator").is_none());
    }

    #[test]
    fn test_producer_initial_prompt_omits_draft_and_feedback() {
        let library = PromptLibrary::builtin().unwrap();
        let rendered = library.render_producer(&producer_vars("", "")).unwrap();

        assert!(rendered.system.contains("first complete version"));
        assert!(rendered.user.contains("add two numbers"));
        assert!(!rendered.user.contains("CODE_DRAFT"));
        assert!(!rendered.user.contains("CRITICAL_FEEDBACK"));
    }

    #[test]
    fn test_producer_revision_prompt_carries_latest_only() {
        let library = PromptLibrary::builtin().unwrap();
        let rendered = library
            .render_producer(&producer_vars("def add(a, b): return a + b", "add a docstring"))
            .unwrap();

        assert!(rendered.system.contains("Revise ONLY"));
        assert!(rendered.user.contains("CODE_DRAFT:\ndef add(a, b): return a + b"));
        assert!(rendered.user.contains("CRITICAL_FEEDBACK:\nadd a docstring"));
    }

    #[test]
    fn test_reviewer_prompt_lists_checklist_and_final_round() {
        let library = PromptLibrary::builtin().unwrap();
        let checklist = vec!["imports compile".to_string(), "no duplicate blocks".to_string()];
        let vars = ReviewerPrompt {
            latest_code_draft: "x = 1",
            checklist: &checklist,
            round: 4,
            max_rounds: 4,
            final_round: true,
        };
        let rendered = library.render_reviewer(&vars).unwrap();

        assert!(rendered.system.contains("round 4 of 4"));
        assert!(rendered.system.contains("- imports compile"));
        assert!(rendered.system.contains("- no duplicate blocks"));
        assert!(rendered.system.contains("final round"));
        assert_eq!(rendered.user.trim(), "CODE_DRAFT:\nx = 1");
    }

    #[test]
    fn test_overrides_replace_only_present_templates() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("reviewer.user.md"), "Judge this: {{latest_code_draft}}").unwrap();

        let library = PromptLibrary::with_overrides(dir.path()).unwrap();
        assert_eq!(library.source(REVIEWER_USER), Some("Judge this: {{latest_code_draft}}"));
        assert_eq!(library.source(PRODUCER_SYSTEM), Some(BUILTIN_PRODUCER_SYSTEM));

        let checklist: Vec<String> = Vec::new();
        let vars = ReviewerPrompt {
            latest_code_draft: "print(1)",
            checklist: &checklist,
            round: 2,
            max_rounds: 5,
            final_round: false,
        };
        assert_eq!(library.render_reviewer(&vars).unwrap().user, "Judge this: print(1)");
    }

    #[test]
    fn test_broken_override_is_template_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("producer.user.md"), "{{#if prompt}}unclosed").unwrap();

        let result = PromptLibrary::with_overrides(dir.path());
        assert!(matches!(result, Err(crate::error::DraftloopError::Template(_))));
    }
}
