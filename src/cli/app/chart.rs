use std::io::Write;

use crossterm::style::{Color, Stylize};
use eyre::Result;
use regex::Regex;

use crate::cli::app::nutrition::NutritionInfo;

const MAX_BAR_WIDTH: usize = 40;

const BAR_COLORS: [Color; 5] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Blue,
];

/// Pull the leading numeric token out of a formatted "value unit" string.
pub(crate) fn leading_number(formatted: &str) -> Option<f64> {
    let re = Regex::new(r"[0-9.]+").ok()?;
    let token = re.find(formatted)?;
    token.as_str().parse::<f64>().ok()
}

/// The (label, value) pairs that will get a bar. Fields that are absent or
/// yield no parseable number are skipped.
pub(crate) fn chart_data(info: &NutritionInfo) -> Vec<(&'static str, f64)> {
    info.macros()
        .into_iter()
        .filter_map(|(label, value)| {
            let parsed = leading_number(value?)?;
            Some((label, parsed))
        })
        .collect()
}

/// Draw a labeled horizontal bar chart of the macro-nutrients.
///
/// Bars are scaled relative to the largest value. Drawing nothing is fine:
/// if no field parses, no chart is emitted.
pub fn render_chart(output: &mut dyn Write, info: &NutritionInfo) -> Result<()> {
    let data = chart_data(info);
    if data.is_empty() {
        return Ok(());
    }

    let max = data.iter().map(|(_, value)| *value).fold(f64::MIN, f64::max);

    writeln!(output)?;
    writeln!(output, "{}", "Nutritional Content Overview".bold())?;

    for (i, (label, value)) in data.iter().enumerate() {
        let width = if max > 0.0 {
            ((value / max) * MAX_BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = "█".repeat(width);
        writeln!(
            output,
            "{:>13}  {} {:.1}",
            label,
            bar.with(BAR_COLORS[i % BAR_COLORS.len()]),
            value
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_with(calories: Option<&str>, protein: Option<&str>) -> NutritionInfo {
        NutritionInfo {
            calories: calories.map(str::to_string),
            protein: protein.map(str::to_string),
            ..NutritionInfo::default()
        }
    }

    #[test]
    fn extracts_the_leading_numeric_token() {
        assert_eq!(leading_number("10.0 G"), Some(10.0));
        assert_eq!(leading_number("250 KCAL"), Some(250.0));
    }

    #[test]
    fn unparseable_strings_yield_nothing() {
        assert_eq!(leading_number(""), None);
        assert_eq!(leading_number("N/A"), None);
        assert_eq!(leading_number("... G"), None);
    }

    #[test]
    fn chart_skips_absent_and_malformed_fields() {
        let info = info_with(Some("89.0 KCAL"), Some("no value"));
        assert_eq!(chart_data(&info), vec![("Calories", 89.0)]);
    }

    #[test]
    fn empty_info_renders_nothing() {
        let mut buffer = Vec::new();
        render_chart(&mut buffer, &NutritionInfo::default()).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn rendered_chart_labels_each_bar() {
        let info = info_with(Some("89.0 KCAL"), Some("1.1 G"));
        let mut buffer = Vec::new();
        render_chart(&mut buffer, &info).unwrap();

        let text = String::from_utf8_lossy(&buffer);
        assert!(text.contains("Nutritional Content Overview"));
        assert!(text.contains("Calories"));
        assert!(text.contains("89.0"));
        assert!(text.contains("Protein"));
        assert!(text.contains("1.1"));
    }
}
