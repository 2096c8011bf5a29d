//! Questions command - Open questions grouped by area

use anyhow::Result;
use colored::Colorize;

use crate::app::App;
use crate::types::CategorizedQuestions;

const CATEGORY_ORDER: [(&str, &str); 6] = [
    ("Frontend", "🎨"),
    ("Backend", "⚙️"),
    ("Arquitetura", "📐"),
    ("Produto", "📦"),
    ("UX/UI", "🎭"),
    ("Geral", "💡"),
];
const OTHER_ICON: &str = "❓";

pub fn category_icon(category: &str) -> &'static str {
    CATEGORY_ORDER
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(OTHER_ICON, |(_, icon)| icon)
}

/// Non-empty categories: the known ones in fixed order, the rest alphabetically.
pub fn ordered_categories(questions: &CategorizedQuestions) -> Vec<(&str, &[String])> {
    let known = CATEGORY_ORDER
        .iter()
        .filter_map(|(name, _)| questions.get_key_value(*name));
    let others = questions
        .iter()
        .filter(|(name, _)| !CATEGORY_ORDER.iter().any(|(known, _)| *known == name.as_str()));

    known
        .chain(others)
        .filter(|(_, items)| !items.is_empty())
        .map(|(name, items)| (name.as_str(), items.as_slice()))
        .collect()
}

pub fn run(app: &App, slug: &str) -> Result<()> {
    let activity = app.storage.require_activity(slug)?;
    let state = app.state_for(slug)?;

    println!("{}", format!("\nOpen questions: {}\n", activity.title).bold());

    let groups = ordered_categories(&state.open_questions);
    if groups.is_empty() {
        println!("{}", "No open questions.".green());
        return Ok(());
    }

    for (category, items) in &groups {
        println!(
            "{} {} ({})",
            category_icon(category),
            category.bold(),
            items.len()
        );
        for question in *items {
            println!("  - {question}");
        }
        println!();
    }
    println!(
        "{}",
        format!("Total: {} question(s)", state.question_count()).dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(pairs: &[(&str, &[&str])]) -> CategorizedQuestions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_ordered_categories_known_first_then_alphabetical() {
        let q = questions(&[
            ("Segurança", &["Usar MFA?"]),
            ("Geral", &["Prazo?"]),
            ("Backend", &["Qual banco?"]),
            ("Dados", &["Retenção?"]),
            ("Frontend", &[]),
        ]);
        let names: Vec<&str> = ordered_categories(&q).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Backend", "Geral", "Dados", "Segurança"]);
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(category_icon("Frontend"), "🎨");
        assert_eq!(category_icon("UX/UI"), "🎭");
        assert_eq!(category_icon("Geral"), "💡");
        assert_eq!(category_icon("Segurança"), "❓");
    }
}
