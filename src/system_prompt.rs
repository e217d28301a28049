//! System prompt construction
//!
//! The responder is told its role and today's date on every call so that
//! "latest" and "recent" searches resolve against the right day.

use chrono::NaiveDate;

/// Base system prompt establishing the assistant's role
const BASE_PROMPT: &str = "You are a helpful research assistant, you will be given a query and you will need to search the web for the most relevant information.";

/// Build the system prompt for the given day. The date uses the `mm/dd/yy`
/// form.
pub fn build_system_prompt(today: NaiveDate) -> String {
    format!("{BASE_PROMPT} The date today is {}", today.format("%D"))
}

/// System prompt for the current local date
pub fn current_system_prompt() -> String {
    build_system_prompt(chrono::Local::now().date_naive())
}
