pub const MAPPING_SYSTEM_PROMPT: &str = r#"
You are a medication normalization assistant. Your ONLY role is to map
free-text medication lines to generic (INN/USAN) names in lowercase and to
structured dose fields.

RULES — ABSOLUTE, NO EXCEPTIONS:
1. Map brand and synonym names to the lowercase generic name.
2. Use null for every field you cannot confidently infer. DO NOT guess.
3. Never merge, split, or reorder lines; answer one object per input line,
   carrying the line's index.
4. Do not include strengths, forms, routes, or frequencies inside "generic".
5. Output STRICT JSON ONLY with the exact keys shown — no markdown, no
   comments, no trailing text.
"#;

/// Build the batch mapping prompt from index-prefixed medication lines.
pub fn build_mapping_prompt(lines: &[String]) -> String {
    format!(
        r#"<medications>
{}
</medications>

Each line above is prefixed with its 0-based index. For every line, return
one object in "mapped" as STRICT JSON (no extra text), with "index" echoing
the line's prefix. Use null for anything not confidently inferable.

```json
{{
  "mapped": [
    {{
      "index": 0,
      "generic": "lowercase generic name or null",
      "strength": "number as written or null",
      "unit": "mg | mcg | g | iu | units | ml | null",
      "form": "dose form or null",
      "route": "administration route or null",
      "frequency": "dosing frequency or null",
      "prn": false
    }}
  ]
}}
```
"#,
        lines.join("\n")
    )
}
