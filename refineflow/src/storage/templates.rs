//! Markdown renderers for the human-readable activity files.

use crate::timestamp;
use crate::types::Activity;

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        "_Não informado_"
    } else {
        value
    }
}

pub fn render_activity(activity: &Activity) -> String {
    let stakeholders = if activity.stakeholders.is_empty() {
        "_Não informado_".to_string()
    } else {
        activity
            .stakeholders
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let metadata = if activity.metadata.is_empty() {
        "_Nenhum_".to_string()
    } else {
        activity
            .metadata
            .iter()
            .map(|(k, v)| format!("- **{k}**: {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "# {title}\n\n\
         **Status**: {status}\n\
         **Criado em**: {created}\n\
         **Última Atualização**: {updated}\n\n\
         ## Descrição\n\n{description}\n\n\
         ## Declaração do Problema\n\n{problem}\n\n\
         ## Stakeholders\n\n{stakeholders}\n\n\
         ## Restrições e Cronograma\n\n{constraints}\n\n\
         ## Sistema/Produto Afetado\n\n{affected}\n\n\
         ## Metadados\n\n{metadata}\n",
        title = activity.title,
        status = activity.status,
        created = timestamp::format(&activity.created_at),
        updated = timestamp::format(&activity.updated_at),
        description = or_placeholder(&activity.description),
        problem = or_placeholder(&activity.problem),
        constraints = or_placeholder(&activity.constraints),
        affected = or_placeholder(&activity.affected_system),
    )
}

pub fn render_log_header(title: &str) -> String {
    format!(
        "# Log da Atividade: {title}\n\n\
         Todas as entradas são registradas aqui em ordem cronológica.\n\n\
         ---\n\n"
    )
}

pub fn render_canvas_placeholder(title: &str) -> String {
    format!(
        "# Business Case Canvas: {title}\n\n\
         _Canvas ainda não gerado. Use a opção de canvas para gerá-lo._\n"
    )
}

pub fn render_jira_header(title: &str, generated_at: &str) -> String {
    format!("# Exportação Jira: {title}\n\nGerado em: {generated_at}\n\n---\n\n")
}

pub fn render_chat_header(title: &str) -> String {
    format!("# Chat: {title}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActivityStatus;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_activity_fills_placeholders() {
        let activity = Activity {
            slug: "login".into(),
            title: "Login".into(),
            description: "Autenticação".into(),
            status: ActivityStatus::InProgress,
            created_at: "2024-01-15T10:30:00+00:00".into(),
            updated_at: "2024-01-15T10:30:00+00:00".into(),
            metadata: BTreeMap::new(),
            problem: String::new(),
            stakeholders: vec!["PO".into()],
            constraints: String::new(),
            affected_system: String::new(),
        };
        let md = render_activity(&activity);
        assert!(md.starts_with("# Login\n"));
        assert!(md.contains("**Status**: in_progress"));
        assert!(md.contains("2024-01-15 10:30:00 UTC"));
        assert!(md.contains("## Descrição\n\nAutenticação"));
        assert!(md.contains("## Declaração do Problema\n\n_Não informado_"));
        assert!(md.contains("- PO"));
        assert!(md.contains("## Metadados\n\n_Nenhum_"));
    }

    #[test]
    fn test_render_log_header() {
        let header = render_log_header("Login");
        assert!(header.starts_with("# Log da Atividade: Login"));
        assert!(header.ends_with("---\n\n"));
    }
}
