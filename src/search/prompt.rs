use std::fmt::Write;

use crate::context::SearchContext;

/// Keys the reply object is asked to carry
pub const REPLY_KEYS: [&str; 8] = [
    "answer",
    "location",
    "value",
    "explanation",
    "calculation",
    "tabsUsed",
    "alternatives",
    "suggestion",
];

const REPLY_TEMPLATE: &str = r#"{
  "answer": "Clear, direct answer to the question",
  "location": "Specific sheet and cell references",
  "value": "The resulting number or value, as a STRING",
  "explanation": "Short explanation of how the answer was found",
  "calculation": "Formula used, if any, as a STRING",
  "tabsUsed": ["names", "of", "sheets", "used"],
  "alternatives": ["other", "relevant", "findings"],
  "suggestion": "Further insight or recommendation"
}"#;

/// Compose the single structured prompt for a query
pub fn build_search_prompt(query: &str, context: &SearchContext) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "You are an expert spreadsheet analyst. A user asks: \"{}\"\n",
        query
    );
    let _ = writeln!(prompt, "SPREADSHEET DATA (ALL TABS):\n{}", context.main);

    if let Some((sheet, glossary)) = &context.glossary {
        let _ = writeln!(prompt, "GLOSSARY from tab \"{}\":\n{}", sheet, glossary);
        prompt.push_str("Use this glossary to interpret business terms and definitions.\n\n");
    }

    prompt.push_str(
        "Instructions:\n\
         1. Look across ALL tabs for the best answer\n\
         2. Combine data from several tabs when needed\n\
         3. Prefer formulas that already exist in the spreadsheet over recomputing\n\
         4. If a calculation is needed, show the formula\n\
         5. Give ONE answer with a clear explanation\n\n",
    );

    let _ = writeln!(
        prompt,
        "Reply with a single valid JSON object and nothing else:\n{}\n",
        REPLY_TEMPLATE
    );
    let _ = writeln!(prompt, "Use exactly these keys: {}", REPLY_KEYS.join(", "));
    prompt.push_str(
        "Every value must be a string or an array of strings. Never use nested objects.\n",
    );

    prompt
}

/// Prompt asking for a one-sentence description of the data
pub fn build_description_prompt(main_context: &str) -> String {
    format!(
        "Describe in ONE sentence what this spreadsheet data contains:\n\n{}\n\
         Reply with just the sentence, for example:\n\
         \"Your data is company financial statements with revenue, costs and profitability metrics across 3 tabs\"",
        main_context
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(glossary: Option<(&str, &str)>) -> SearchContext {
        SearchContext {
            main: "\nSHEET: Sales\nHEADERS: Region, Revenue\n".to_string(),
            glossary: glossary.map(|(n, g)| (n.to_string(), g.to_string())),
        }
    }

    #[test]
    fn test_prompt_carries_query_context_and_schema() {
        let prompt = build_search_prompt("total revenue?", &context(None));

        assert!(prompt.contains("\"total revenue?\""));
        assert!(prompt.contains("SHEET: Sales"));
        assert!(prompt.contains("Prefer formulas that already exist"));
        assert!(prompt.contains("Never use nested objects"));
        for key in REPLY_KEYS {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing key {}", key);
        }
        assert!(prompt.contains(
            "Use exactly these keys: answer, location, value, explanation, calculation, \
             tabsUsed, alternatives, suggestion"
        ));
        assert!(!prompt.contains("GLOSSARY"));
    }

    #[test]
    fn test_prompt_includes_glossary_when_selected() {
        let prompt = build_search_prompt(
            "ARR?",
            &context(Some((
                "Terms",
                "DEFINITIONS AND BUSINESS TERMS:\nARR: Annual recurring revenue\n",
            ))),
        );
        assert!(prompt.contains("GLOSSARY from tab \"Terms\""));
        assert!(prompt.contains("ARR: Annual recurring revenue"));
    }

    #[test]
    fn test_description_prompt() {
        let prompt = build_description_prompt("SHEET: Fees");
        assert!(prompt.contains("ONE sentence"));
        assert!(prompt.contains("SHEET: Fees"));
    }
}
