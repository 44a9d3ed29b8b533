//! Instructions sent alongside the formatted data

use minijinja::{Environment, context};

use crate::error::Result;
use crate::formatter::FormattedPrompt;

/// Researcher persona for the system message
pub const FUNDAMENTAL_SYSTEM_PROMPT: &str = "\
You are a researcher tasked with analyzing fundamental information about a company. \
Write a comprehensive report covering the company's financial documents, company profile, \
basic financials, and financial history to give traders a full view of the company's \
fundamental health. Include as much detail as possible. Do not simply state that trends \
are mixed; provide detailed and fine-grained analysis and insights that may help traders \
make decisions. Append a Markdown table at the end of the report to organize key points, \
making it easy to read.";

/// Report sections the model is asked for, in order
pub const REPORT_SECTIONS: [&str; 8] = [
    "Company Overview and Business Model",
    "Financial Health Analysis (Balance Sheet)",
    "Profitability Analysis (Income Statement)",
    "Cash Flow Analysis",
    "Valuation Metrics and Trends",
    "Key Strengths and Weaknesses",
    "Investment Considerations",
    "Summary table with key metrics and insights",
];

const USER_TEMPLATE: &str = "\
Current Date: {{ current_date }}
Company Ticker: {{ ticker }}

Please analyze the following fundamental and financial data:

{{ data }}
Please provide a comprehensive fundamental analysis report including:
{% for section in sections -%}
{{ loop.index }}. {{ section }}
{% endfor %}";

/// Render the user message for one ticker
///
/// `current_date` is inserted verbatim, e.g. `January 15, 2025`.
pub fn render_user_message(ticker: &str, current_date: &str, prompt: &FormattedPrompt) -> Result<String> {
    let env = Environment::new();
    let message = env.render_str(
        USER_TEMPLATE,
        context! {
            current_date => current_date,
            ticker => ticker,
            data => prompt.render(),
            sections => REPORT_SECTIONS,
        },
    )?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::load_and_format;
    use crate::test_support::write_complete_set;
    use tempfile::TempDir;

    #[test]
    fn test_user_message_layout() {
        let dir = TempDir::new().unwrap();
        write_complete_set(dir.path(), "AAPL");
        let prompt = load_and_format("AAPL", dir.path()).unwrap();

        let message = render_user_message("AAPL", "January 15, 2025", &prompt).unwrap();
        assert!(message.starts_with("Current Date: January 15, 2025\nCompany Ticker: AAPL\n"));
        assert!(message.contains(&prompt.render()));
        assert!(message.contains("1. Company Overview and Business Model\n"));
        assert!(message.contains("8. Summary table with key metrics and insights"));

        let data_at = message.find("# Fundamental Analysis Data for AAPL").unwrap();
        let request_at = message.find("Please provide a comprehensive").unwrap();
        assert!(data_at < request_at);
    }

    #[test]
    fn test_sections_are_numbered_in_order() {
        let dir = TempDir::new().unwrap();
        write_complete_set(dir.path(), "AAPL");
        let prompt = load_and_format("AAPL", dir.path()).unwrap();

        let message = render_user_message("AAPL", "January 15, 2025", &prompt).unwrap();
        for (idx, section) in REPORT_SECTIONS.iter().enumerate() {
            assert!(message.contains(&format!("{}. {section}", idx + 1)), "{section}");
        }
    }

    #[test]
    fn test_template_does_not_escape_data() {
        let dir = TempDir::new().unwrap();
        write_complete_set(dir.path(), "AAPL");
        let prompt = load_and_format("AAPL", dir.path()).unwrap();

        let message = render_user_message("AAPL", "January 15, 2025", &prompt).unwrap();
        assert!(message.contains("Dividend %: 0.41%"));
        assert!(!message.contains("&amp;"));
    }
}
