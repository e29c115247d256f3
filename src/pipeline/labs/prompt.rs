pub const LAB_SYSTEM_PROMPT: &str = r#"
You are a clinical laboratory extraction assistant. Your ONLY role is to pull
laboratory test results out of raw medical text. You report what the text
states and nothing else.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Extract ONLY results explicitly stated in the text.
2. NEVER invent values, units, or reference ranges.
3. If a unit or reference range is not written, output null for it.
4. Ignore headers, patient identifiers, dates, and narrative prose.
5. Prefer the reference range printed next to the result over any general
   knowledge of normal ranges.
6. Output STRICT JSON only (no extra text).
"#;

/// Build the lab extraction prompt for one document.
pub fn build_lab_prompt(text: &str) -> String {
    format!(
        r#"<document>
{text}
</document>

Extract every laboratory result from the above document as STRICT JSON
(no extra text). For any field not present, use null.

```json
{{
  "labs": [
    {{
      "name": "test name as written",
      "value": 0.0,
      "unit": "unit as written or null",
      "low": 0.0,
      "high": 0.0
    }}
  ]
}}
```

If the document contains no laboratory results, output {{"labs": []}}.
"#
    )
}
