pub mod catalog;
pub mod chart;
pub mod nutrition;
pub mod prompt;
pub mod responder;
pub mod session;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use color_print::cformat;
use crossterm::style::Stylize;
use eyre::{Result, bail};
use tracing::{debug, error, warn};

use crate::cli::app::catalog::fetch_food_catalog;
use crate::cli::app::chart::render_chart;
use crate::cli::app::nutrition::{NutritionInfo, get_food_nutrition};
use crate::cli::app::responder::generate_response;
use crate::cli::app::session::{Role, SessionState};
use crate::ollama_client::OllamaClient;
use crate::usda_client::UsdaClient;

const WELCOME_TEXT: &str = "
Look up a food's nutrition, or ask me anything about what you eat.

Things to try
• /foods                Browse the food list, then enter an item number
• Grilled Salmon        Analyze any food or recipe by name
• /quantity 2.5         Scale every nutrient to 2.5 servings
• /mode chat            Switch to conversational mode

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
FoodGO CLI

/mode <analysis|chat>   Switch between Nutrition Analysis and Conversational mode
/quantity <n>           Set the serving multiplier (0.1 - 10.0)
/foods                  Fetch the food-group catalog and list the results
/save                   Save the conversation transcript to disk
/clear                  Clear the conversation history
/help                   Show this help dialogue
/quit                   Quit the application

In analysis mode, type a food name (or a number from /foods) to analyze it.
In chat mode, type a question to ask the nutrition assistant.
";

pub const MIN_QUANTITY: f64 = 0.1;
pub const MAX_QUANTITY: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    NutritionAnalysis,
    Conversational,
}

/// A single non-interactive action, selected on the command line.
pub enum Action {
    Analyze { food: String, quantity: f64 },
    Chat { input: String },
}

pub struct AppContext {
    output: Box<dyn Write>,
    mode: Mode,
    quantity: f64,
    session: SessionState,
    usda_client: Option<UsdaClient>,
    ollama_client: OllamaClient,
    food_list: Vec<String>,
}

impl AppContext {
    pub fn new(output: Box<dyn Write>, mode: Mode) -> Self {
        Self {
            output,
            mode,
            quantity: 1.0,
            session: SessionState::new(),
            usda_client: None,
            ollama_client: OllamaClient::from_env(),
            food_list: Vec::new(),
        }
    }

    pub async fn run(&mut self, action: Option<Action>) -> Result<ExitCode> {
        // Initialize the USDA client
        self.usda_client = match UsdaClient::new() {
            Ok(client) => Some(client),
            Err(e) => {
                writeln!(self.output, "Failed to initialize USDA client: {}", e)?;
                return Ok(ExitCode::FAILURE);
            }
        };

        if let Some(client) = &self.usda_client {
            debug!("Using USDA endpoint {}", client.base_url());
        }
        debug!(
            "Using Ollama model {} at {}",
            self.ollama_client.model(),
            self.ollama_client.base_url()
        );

        // The conversations directory exists from startup on
        let dir = conversations_dir();
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(
                "Could not create conversations directory {}: {}",
                dir.display(),
                e
            );
        }

        // Handle non-interactive mode (single action)
        if let Some(action) = action {
            match action {
                Action::Analyze { food, quantity } => {
                    if !self.set_quantity(quantity)? {
                        return Ok(ExitCode::FAILURE);
                    }
                    self.analyze_food(&food).await?;
                }
                Action::Chat { input } => {
                    self.chat_turn(&input).await?;
                }
            }
            return Ok(ExitCode::SUCCESS);
        }

        self.print_welcome()?;
        self.run_interactive().await?;

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "{}",
            cformat!("<bold>🍎 FoodGO</bold> - your terminal nutrition assistant")
        )?;
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = prompt::generate_prompt(self.mode);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        let trimmed = input.trim();

        match trimmed {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/clear" => {
                self.clear_conversation()?;
            }
            "/foods" => {
                self.show_food_list().await?;
            }
            "/save" => {
                self.save_conversation()?;
            }
            _ => {
                if let Some(arg) = trimmed.strip_prefix("/mode ") {
                    self.switch_mode(arg.trim())?;
                } else if trimmed == "/mode" {
                    writeln!(self.output, "Usage: /mode <analysis|chat>")?;
                } else if let Some(arg) = trimmed.strip_prefix("/quantity ") {
                    self.handle_quantity_command(arg.trim())?;
                } else if trimmed == "/quantity" {
                    writeln!(
                        self.output,
                        "Usage: /quantity <number between {} and {}>",
                        MIN_QUANTITY, MAX_QUANTITY
                    )?;
                } else if trimmed.starts_with('/') {
                    writeln!(
                        self.output,
                        "Unknown command: {}. Type /help for the command list.",
                        trimmed
                    )?;
                } else {
                    match self.mode {
                        Mode::NutritionAnalysis => {
                            if let Some(food) = self.resolve_food_input(trimmed)? {
                                self.analyze_food(&food).await?;
                            }
                        }
                        Mode::Conversational => {
                            self.chat_turn(trimmed).await?;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// In analysis mode a bare number selects from the last fetched list;
    /// anything else is analyzed as a custom food or recipe.
    fn resolve_food_input(&mut self, input: &str) -> Result<Option<String>> {
        if let Ok(index) = input.parse::<usize>() {
            if self.food_list.is_empty() {
                writeln!(
                    self.output,
                    "No food list loaded yet. Run /foods first, or type a food name."
                )?;
                return Ok(None);
            }
            if index == 0 || index > self.food_list.len() {
                writeln!(
                    self.output,
                    "Pick a number between 1 and {}.",
                    self.food_list.len()
                )?;
                return Ok(None);
            }
            return Ok(Some(self.food_list[index - 1].clone()));
        }

        Ok(Some(input.to_string()))
    }

    async fn analyze_food(&mut self, food: &str) -> Result<()> {
        let client = match &self.usda_client {
            Some(client) => client,
            None => bail!("USDA client not initialized"),
        };

        self.session.current_food = Some(food.to_string());

        let result = get_food_nutrition(client, food, self.quantity, &mut self.session).await;

        match result {
            Ok(Some(lookup)) => {
                writeln!(self.output)?;
                writeln!(
                    self.output,
                    "{}",
                    format!("Nutritional Details for {}", food).bold()
                )?;
                writeln!(self.output, "Matched record: {}", lookup.description)?;
                render_chart(&mut self.output, &lookup.info)?;
                self.print_nutrition_table(&lookup.info)?;
            }
            Ok(None) => {
                writeln!(self.output, "{}", "No nutrition data found.".yellow())?;
            }
            Err(e) => {
                error!("Nutrition lookup failed for {:?}: {}", food, e);
                writeln!(
                    self.output,
                    "{}",
                    format!("Error fetching nutrition: {}", e).yellow()
                )?;
            }
        }

        Ok(())
    }

    fn print_nutrition_table(&mut self, info: &NutritionInfo) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{:<16} Value", "Nutrient")?;
        writeln!(self.output, "{:-<40}", "")?;
        for (label, value) in info.macros() {
            writeln!(self.output, "{:<16} {}", label, value.unwrap_or("N/A"))?;
        }

        if !info.vitamins_minerals.is_empty() {
            writeln!(self.output)?;
            writeln!(self.output, "{}", "Vitamins/Minerals".bold())?;
            for entry in &info.vitamins_minerals {
                writeln!(self.output, "  - {}", entry)?;
            }
        }

        Ok(())
    }

    async fn chat_turn(&mut self, query: &str) -> Result<()> {
        self.session.push_user(query);

        let reply = match generate_response(&self.ollama_client, &self.session, query).await {
            Ok(text) => text,
            Err(e) => {
                error!("Model call failed: {}", e);
                writeln!(
                    self.output,
                    "{}",
                    format!("Error generating conversational response: {}", e).yellow()
                )?;
                String::new()
            }
        };

        self.session.push_assistant(&reply);
        self.redraw_transcript()?;

        Ok(())
    }

    fn redraw_transcript(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", "Nutrition Conversation".bold())?;
        for entry in self.session.conversation() {
            let prefix = match entry.role {
                Role::User => "user".cyan().bold(),
                Role::Assistant => "assistant".green().bold(),
            };
            writeln!(self.output, "{}: {}", prefix, entry.content)?;
        }
        Ok(())
    }

    fn clear_conversation(&mut self) -> Result<()> {
        self.session.clear_conversation();
        writeln!(self.output, "Conversation cleared.")?;
        self.redraw_transcript()?;
        Ok(())
    }

    async fn show_food_list(&mut self) -> Result<()> {
        let client = match &self.usda_client {
            Some(client) => client,
            None => bail!("USDA client not initialized"),
        };

        writeln!(self.output, "Fetching the food list...")?;
        let catalog = fetch_food_catalog(client).await;

        for warning in &catalog.warnings {
            writeln!(self.output, "{}", warning.as_str().yellow())?;
        }

        if catalog.foods.is_empty() {
            writeln!(self.output, "No foods returned.")?;
            return Ok(());
        }

        for (i, food) in catalog.foods.iter().enumerate() {
            writeln!(self.output, "{:>4}. {}", i + 1, food)?;
        }
        writeln!(
            self.output,
            "Enter a number to analyze an item, or type any food name."
        )?;

        self.food_list = catalog.foods;
        Ok(())
    }

    fn switch_mode(&mut self, arg: &str) -> Result<()> {
        match arg {
            "analysis" => {
                self.mode = Mode::NutritionAnalysis;
                writeln!(self.output, "Switched to Nutrition Analysis mode.")?;
            }
            "chat" => {
                self.mode = Mode::Conversational;
                writeln!(self.output, "Switched to Conversational mode.")?;
            }
            _ => {
                writeln!(self.output, "Usage: /mode <analysis|chat>")?;
            }
        }
        Ok(())
    }

    fn handle_quantity_command(&mut self, arg: &str) -> Result<()> {
        match arg.parse::<f64>() {
            Ok(quantity) => {
                self.set_quantity(quantity)?;
            }
            Err(_) => {
                writeln!(
                    self.output,
                    "Usage: /quantity <number between {} and {}>",
                    MIN_QUANTITY, MAX_QUANTITY
                )?;
            }
        }
        Ok(())
    }

    fn set_quantity(&mut self, quantity: f64) -> Result<bool> {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&quantity) {
            writeln!(
                self.output,
                "Quantity must be between {} and {} servings.",
                MIN_QUANTITY, MAX_QUANTITY
            )?;
            return Ok(false);
        }
        self.quantity = quantity;
        writeln!(self.output, "Quantity set to {} serving(s).", quantity)?;
        Ok(true)
    }

    fn save_conversation(&mut self) -> Result<()> {
        if self.session.conversation().is_empty() {
            writeln!(self.output, "Nothing to save yet.")?;
            return Ok(());
        }

        match self.session.save_transcript(&conversations_dir()) {
            Ok(path) => {
                writeln!(self.output, "Conversation saved to {}", path.display())?;
            }
            Err(e) => {
                writeln!(
                    self.output,
                    "{}",
                    format!("Failed to save conversation: {}", e).yellow()
                )?;
            }
        }
        Ok(())
    }
}

pub fn conversations_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".foodgo").join("conversations"))
        .unwrap_or_else(|| PathBuf::from("conversations"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppContext {
        AppContext::new(Box::new(Vec::<u8>::new()), Mode::NutritionAnalysis)
    }

    #[test]
    fn quantity_outside_bounds_is_rejected() {
        let mut app = app();
        assert!(!app.set_quantity(0.05).unwrap());
        assert!(!app.set_quantity(10.5).unwrap());
        assert_eq!(app.quantity, 1.0);
    }

    #[test]
    fn quantity_bounds_are_inclusive() {
        let mut app = app();
        assert!(app.set_quantity(0.1).unwrap());
        assert!(app.set_quantity(10.0).unwrap());
        assert_eq!(app.quantity, 10.0);
    }

    #[test]
    fn numeric_input_selects_from_the_fetched_list() {
        let mut app = app();
        app.food_list = vec!["Apple, raw".to_string(), "Banana, raw".to_string()];

        assert_eq!(
            app.resolve_food_input("2").unwrap(),
            Some("Banana, raw".to_string())
        );
        assert_eq!(app.resolve_food_input("0").unwrap(), None);
        assert_eq!(app.resolve_food_input("3").unwrap(), None);
    }

    #[test]
    fn numeric_input_without_a_list_is_refused() {
        let mut app = app();
        assert_eq!(app.resolve_food_input("1").unwrap(), None);
    }

    #[test]
    fn free_text_input_passes_through() {
        let mut app = app();
        assert_eq!(
            app.resolve_food_input("Grilled Salmon").unwrap(),
            Some("Grilled Salmon".to_string())
        );
    }

    #[test]
    fn clearing_resets_the_transcript() {
        let mut app = app();
        app.session.push_user("hello");
        app.session.push_assistant("hi");

        app.clear_conversation().unwrap();
        assert!(app.session.conversation().is_empty());
    }
}
