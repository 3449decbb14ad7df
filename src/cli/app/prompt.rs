use rustyline::{Config, Editor, Result};

use crate::cli::app::Mode;

pub fn generate_prompt(mode: Mode) -> String {
    match mode {
        Mode::NutritionAnalysis => "nutrition> ".to_string(),
        Mode::Conversational => "chat> ".to_string(),
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}
