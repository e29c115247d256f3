use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::models::context::dedup_preserving_order;
use crate::models::CaseContext;
use crate::numeric::is_positive_finite;
use crate::oracle::{json, OracleClient};
use crate::pipeline::context::fallback::fill_missing_demographics;
use crate::pipeline::context::prompt::{build_context_prompt, CONTEXT_SYSTEM_PROMPT};

pub struct ContextExtractor {
    client: Arc<dyn OracleClient>,
    top_n: usize,
}

impl ContextExtractor {
    pub fn new(client: Arc<dyn OracleClient>, top_n: usize) -> Self {
        Self { client, top_n }
    }

    pub fn from_config(client: Arc<dyn OracleClient>, config: &PipelineConfig) -> Self {
        Self::new(client, config.suggestion_top_n)
    }

    /// Extract a case context from a transcript. Never fails: an
    /// unreachable oracle or unparseable response leaves the oracle
    /// fields empty, and the demographics regex pass runs either way.
    pub fn extract(&self, transcript: &str) -> CaseContext {
        let mut context = CaseContext {
            transcript: Some(transcript.to_string()),
            ..CaseContext::default()
        };

        match self
            .client
            .generate(CONTEXT_SYSTEM_PROMPT, &build_context_prompt(transcript, self.top_n))
        {
            Ok(raw) => {
                let object = json::extract_object(&raw);
                context.condition = json::str_field(&object, "condition");
                context.description = json::str_field(&object, "description");
                context.age_years =
                    json::number_field(&object, "age_years").filter(|v| is_positive_finite(*v));
                context.weight_kg =
                    json::number_field(&object, "weight_kg").filter(|v| is_positive_finite(*v));
                let mut suggestions =
                    dedup_preserving_order(json::string_list_field(&object, "drug_suggestions"));
                suggestions.truncate(self.top_n);
                context.drug_suggestions = suggestions;
            }
            Err(e) => {
                tracing::warn!(error = %e, "context oracle call failed, regex fallback only");
            }
        }

        fill_missing_demographics(&mut context, transcript);
        context
    }
}
