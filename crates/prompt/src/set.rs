//! The pair of prompts the answering pipeline needs.

use crate::builder::build_prompt;
use crate::loader::{
    builtin_prompt, list_prompts, load_prompt, ANSWER_PROMPT_ID, CONTEXTUALIZE_PROMPT_ID,
};
use crate::types::{PromptDefinition, PromptSource};
use sift_core::AppResult;
use std::collections::HashMap;
use std::path::Path;

/// Resolved prompts for question rewriting and answering.
#[derive(Debug, Clone)]
pub struct PromptSet {
    contextualize: PromptDefinition,
    answer: PromptDefinition,
}

impl PromptSet {
    /// Built-in prompts only.
    pub fn builtin() -> AppResult<Self> {
        Ok(Self {
            contextualize: builtin_prompt(CONTEXTUALIZE_PROMPT_ID)?,
            answer: builtin_prompt(ANSWER_PROMPT_ID)?,
        })
    }

    /// Built-in prompts, with any `<id>.yml` found in `prompts_dir`
    /// taking precedence. An override that exists but is invalid is an
    /// error.
    pub fn load(prompts_dir: Option<&Path>) -> AppResult<Self> {
        if let Some(dir) = prompts_dir {
            for id in unrecognized_prompts(dir)? {
                tracing::warn!("Ignoring unknown prompt '{}' in {:?}", id, dir);
            }
        }

        let (contextualize, source) = resolve(prompts_dir, CONTEXTUALIZE_PROMPT_ID)?;
        tracing::debug!("Prompt {} from {:?}", CONTEXTUALIZE_PROMPT_ID, source);
        let (answer, source) = resolve(prompts_dir, ANSWER_PROMPT_ID)?;
        tracing::debug!("Prompt {} from {:?}", ANSWER_PROMPT_ID, source);

        Ok(Self {
            contextualize,
            answer,
        })
    }

    /// System instruction for the standalone-question rewrite.
    pub fn contextualize_instruction(&self) -> AppResult<String> {
        build_prompt(&self.contextualize, &HashMap::new())
    }

    /// System instruction for the final answer with `context` injected.
    pub fn answer_instruction(&self, context: &str) -> AppResult<String> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        build_prompt(&self.answer, &vars)
    }
}

/// Prompt files in `prompts_dir` whose id matches no prompt the pipeline
/// uses, usually a misspelt override.
pub fn unrecognized_prompts(prompts_dir: &Path) -> AppResult<Vec<String>> {
    Ok(list_prompts(prompts_dir)?
        .into_iter()
        .filter(|id| id != CONTEXTUALIZE_PROMPT_ID && id != ANSWER_PROMPT_ID)
        .collect())
}

fn resolve(
    prompts_dir: Option<&Path>,
    prompt_id: &str,
) -> AppResult<(PromptDefinition, PromptSource)> {
    if let Some(dir) = prompts_dir {
        let file = dir.join(format!("{}.yml", prompt_id));
        if file.exists() {
            return Ok((load_prompt(dir, prompt_id)?, PromptSource::File(file)));
        }
    }
    Ok((builtin_prompt(prompt_id)?, PromptSource::Builtin))
}
