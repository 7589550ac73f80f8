use super::{PreparedAction, TaskForm};
use crate::error::Result;
use crate::init::AiConfig;
use crate::models::{PromptRequest, TaskMode};

pub fn build_prompt(business_name: &str, industry: &str, goals: &str) -> String {
    format!(
        "Write a detailed marketing plan for a company named {} in the {} industry, \
         focusing on these goals: {}.\n\
         Include introduction, body, conclusion, charts if needed.",
        business_name, industry, goals
    )
}

/// All three fields must be filled; nothing partial is ever submitted.
pub fn prepare(form: &TaskForm, ai: &AiConfig) -> Result<PreparedAction> {
    let values = form.require(TaskMode::MarketingPlan.required_fields())?;
    let prompt = build_prompt(values[0], values[1], values[2]);
    Ok(PreparedAction::new(
        TaskMode::MarketingPlan,
        PromptRequest::new(&ai.report_model, prompt),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_prompt_names_all_inputs() {
        let form = TaskForm::new()
            .with_field("business_name", "Bean There")
            .with_field("industry", "coffee")
            .with_field("goals", "double foot traffic");
        let prepared = prepare(&form, &AiConfig::default()).unwrap();

        let prompt = &prepared.prompt.prompt;
        assert!(prompt.contains("company named Bean There"));
        assert!(prompt.contains("in the coffee industry"));
        assert!(prompt.contains("these goals: double foot traffic."));
        assert_eq!(prepared.prompt.model, "llama2");
        assert_eq!(prepared.export_filename, Some("MarketingPlan.pdf"));
    }

    #[test]
    fn test_missing_goals_blocks_the_action() {
        let form = TaskForm::new()
            .with_field("business_name", "Bean There")
            .with_field("industry", "coffee")
            .with_field("goals", "");
        let err = prepare(&form, &AiConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("goals"));
    }
}
