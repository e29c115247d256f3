pub const CONTEXT_SYSTEM_PROMPT: &str = r#"
You are a clinical context extraction assistant. Your ONLY role is to pull
the consultation's key facts out of a transcript: the primary condition, a
short description, patient demographics, and evidence-based candidate
drugs for the condition.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Extract ONLY what the transcript states or directly supports.
2. DO NOT invent values. If a value is not found, use null or an empty
   list.
3. Drug suggestions are lowercase generic names, unique, most relevant
   first.
4. Output STRICT JSON only (no extra text).
"#;

/// Build the context extraction prompt for one transcript.
pub fn build_context_prompt(transcript: &str, top_n: usize) -> String {
    format!(
        r#"From the following patient consultation transcript, extract these fields as STRICT JSON (no extra text):

{{
  "condition": "short primary condition/diagnosis or reason for visit",
  "description": "one-sentence summary of the presentation, or null",
  "age_years": number | null,
  "weight_kg": number | null,
  "drug_suggestions": ["top {top_n} evidence-based candidate drugs for the condition (generic names)"]
}}

If a value is not found, use null or an empty list. DO NOT invent values.

<transcript>
{transcript}
</transcript>
"#
    )
}
