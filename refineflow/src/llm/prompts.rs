//! Prompt builders. Generated artifacts are written in Brazilian Portuguese.

use crate::types::{Activity, ActivityState, EntryType, Record};

const TSHIRT_SIZES: &str = "\
- PP: Muito simples (até 2 semanas) - Ajuste pontual, 1 endpoint simples
- P: Simples/Baixa complexidade (até 1 mês) - Pequena feature isolada
- M: Complexidade média (até 2 meses) - Feature com UI, API e fluxo
- G: Alta complexidade (até 3 meses) - Múltiplos serviços/integrações
- GG: Muito complexo (até 5 meses) - Refatorações grandes, projetos amplos
- XGG: Extremamente complexo (meses) - Iniciativas estratégicas";

pub const EXTRACTION_SYSTEM: &str = "\
Você é um assistente especializado em refinamento de atividades técnicas.
Sua tarefa é extrair informações estruturadas de entradas do usuário e atualizar o estado da atividade.

Analise cuidadosamente a entrada e identifique:
- Itens de ação (com responsável e status quando possível)
- Perguntas abertas ou incertezas, categorizadas por área
- Decisões tomadas
- Requisitos funcionais e não-funcionais
- Riscos com impacto e mitigação
- Dependências internas e externas
- Métricas e estimativas de custo (utilize modelo T-Shirt quando aplicável)
- Lacunas de informação

Categorias de perguntas: Frontend, Backend, Arquitetura, Produto, UX/UI, Geral.
Uma pergunta pode aparecer em mais de uma categoria quando envolver mais de uma área.
Use Geral apenas quando nenhuma outra categoria se aplicar.

Seja específico, conciso e extraia apenas informações explícitas ou claramente implícitas.

Responda SOMENTE com um objeto JSON com exatamente estas chaves:
{
  \"summary\": \"resumo conciso da atividade\",
  \"action_items\": [{\"action\": \"\", \"owner\": \"\", \"status\": \"\"}],
  \"open_questions\": {\"Frontend\": [], \"Backend\": [], \"Arquitetura\": [], \"Produto\": [], \"UX/UI\": [], \"Geral\": []},
  \"decisions\": [{\"decision\": \"\", \"rationale\": \"\", \"date\": \"\"}],
  \"functional_requirements\": [\"\"],
  \"non_functional_requirements\": [\"\"],
  \"identified_risks\": [{\"risk\": \"\", \"impact\": \"\", \"mitigation\": \"\"}],
  \"dependencies\": [{\"dependency\": \"\", \"type\": \"internal|external\", \"status\": \"\"}],
  \"metrics\": [{\"metric\": \"\", \"target\": \"\", \"measurement\": \"\"}],
  \"cost_estimates\": [{\"item\": \"\", \"amount\": \"\", \"notes\": \"\"}],
  \"information_gaps\": [\"\"]
}
Omita itens vazios das listas.";

pub const CHAT_SYSTEM: &str = "\
Você é um assistente especializado em refinamento de atividades técnicas.
Sua tarefa é responder perguntas sobre a atividade usando o contexto disponível.

Diretrizes:
- Cite informações específicas do log quando relevante
- Se a informação não estiver disponível, declare claramente o que falta
- Sugira próximos passos quando apropriado
- Seja conciso mas completo";

pub const JIRA_SYSTEM: &str = "\
Você é um especialista em criar histórias Jira bem estruturadas.
Sua tarefa é gerar uma tarefa pai e subtarefas de backend e frontend baseadas na atividade.

Estrutura esperada:
1. **Tarefa Pai**: visão geral completa com contexto e critérios de aceitação.
2. **Subtarefas Backend**: quebre o trabalho de backend (APIs, banco de dados, integrações) \
em 2 a 7 subtarefas (2-7), baseado na complexidade e no tamanho do trabalho. \
Use cabeçalhos no formato `## Subtarefa Backend N`.
3. **Subtarefas Frontend**: quebre o trabalho de frontend (UI/UX, componentes, estado) \
em 2 a 7 subtarefas (2-7), baseado na complexidade. Use cabeçalhos `## Subtarefa Frontend N`.
4. **Testes E2E**: crie tarefas de testes E2E (end-to-end) separadas e independentes \
das subtarefas de implementação, em uma seção `## Testes E2E`.

Cada subtarefa de implementação deve incluir:
- Título claro e conciso
- Descrição detalhada
- Critérios de aceitação específicos e testáveis
- Testes unitários incluídos na própria subtarefa, seguindo TDD (escreva o teste primeiro, depois o código)
- Estimativa no formato `T-Shirt / N weeks` com valor exato (ex.: `M / 2 weeks`, `P / 1.5 weeks`), \
nunca intervalos ou aproximações, e no mínimo 0.5 weeks
- **Dependências:** quais subtarefas precisam ser concluídas antes
- Considerações sobre observabilidade e riscos

Ao final, descreva o **Workflow** de execução entre as subtarefas (ex.: Subtarefa Backend 1 → Subtarefa Frontend 1).

**Modelo de Estimativas T-Shirt:**
- PP: até 2 semanas | P: até 1 mês | M: até 2 meses
- G: até 3 meses | GG: até 5 meses | XGG: meses de trabalho";

pub const CANVAS_SYSTEM: &str = "\
Você é um especialista em análise de negócios e criação de Business Case Canvas.
Sua tarefa é gerar um Business Case Canvas completo baseado nas informações da atividade.

O canvas deve cobrir:
1. **Problema**: o que, quem tem, por que é importante
2. **Solução**: proposta e relação com o problema
3. **Recursos**: tangíveis, intangíveis, dependências
4. **Benefícios**: propósito, objetivos, benefícios financeiros/não-financeiros
5. **Escopo**: dentro/fora, cronograma, relevância estratégica
6. **Riscos**: identificados com mitigações
7. **Stakeholders**: listados com papéis
8. **Complexidade**: esforços usando modelo T-Shirt (PP a XGG)
9. **Comunicação**: materiais, vídeos, treinamento
10. **Custos**: fontes, orçamento, total ao longo do tempo
11. **Métricas**: sucesso e benefícios

Sempre inclua uma seção \"Modelo de Estimativas T-Shirt Sizing\" com a tabela completa \
e uma estimativa inicial para a atividade baseada nos dados disponíveis.

Identifique lacunas de informação e sugira perguntas para completar.";

pub const CLASSIFICATION_SYSTEM: &str = "\
Você classifica entradas de um log de refinamento de atividades.
Responda SOMENTE com um objeto JSON no formato {\"entry_type\": \"<tipo>\"}, onde <tipo> é um de:
note, question, answer, transcript, jira_description, decision, requirement, risk, metric, cost, dependency.

- note: observação geral
- question: dúvida em aberto
- answer: resposta a uma pergunta anterior
- transcript: transcrição de reunião ou conversa
- jira_description: descrição copiada de um ticket Jira
- decision: decisão tomada
- requirement: requisito funcional ou não-funcional
- risk: risco identificado
- metric: métrica de sucesso
- cost: custo ou estimativa
- dependency: dependência interna ou externa";

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        "- Nenhum".to_string()
    } else {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn record_list(records: &[Record], key: &str) -> String {
    let items: Vec<String> = records
        .iter()
        .filter_map(|r| r.get(key).map(String::from))
        .collect();
    bullet_list(&items)
}

pub fn extraction_user(
    activity: &Activity,
    entry_type: EntryType,
    entry_content: &str,
    current: &ActivityState,
) -> String {
    format!(
        "**Atividade**: {title}\n\
         **Descrição**: {description}\n\n\
         **Nova Entrada ({entry_type})**:\n{entry_content}\n\n\
         **Estado Atual**:\nResumo: {summary}\n\n\
         **Modelo de Estimativas T-Shirt Sizing:**\n{TSHIRT_SIZES}\n\n\
         Extraia e retorne as informações estruturadas desta entrada.",
        title = activity.title,
        description = activity.description,
        summary = current.summary,
    )
}

pub fn chat_user(
    activity: &Activity,
    state: &ActivityState,
    log_excerpt: &str,
    question: &str,
) -> String {
    format!(
        "**Atividade**: {title}\n\
         **Descrição**: {description}\n\n\
         **Resumo Atual**:\n{summary}\n\n\
         **Entradas Recentes do Log**:\n{log_excerpt}\n\n\
         **Pergunta**: {question}\n\n\
         Forneça uma resposta útil baseada no contexto disponível.",
        title = activity.title,
        description = activity.description,
        summary = state.summary,
    )
}

pub fn jira_user(activity: &Activity, state: &ActivityState) -> String {
    format!(
        "**Atividade**: {title}\n\
         **Descrição**: {description}\n\n\
         **Resumo**: {summary}\n\n\
         **Requisitos Funcionais**:\n{functional}\n\n\
         **Requisitos Não-Funcionais**:\n{non_functional}\n\n\
         **Riscos Identificados**:\n{risks}\n\n\
         **Dependências**:\n{dependencies}\n\n\
         Gere as tarefas Jira no formato Markdown.",
        title = activity.title,
        description = activity.description,
        summary = state.summary,
        functional = bullet_list(&state.functional_requirements),
        non_functional = bullet_list(&state.non_functional_requirements),
        risks = record_list(&state.identified_risks, "risk"),
        dependencies = record_list(&state.dependencies, "dependency"),
    )
}

pub fn canvas_user(activity: &Activity, state: &ActivityState) -> String {
    let state_json = serde_json::to_string_pretty(state).unwrap_or_default();
    format!(
        "**Atividade**: {title}\n\
         **Descrição**: {description}\n\n\
         **Resumo**: {summary}\n\n\
         **Informações Disponíveis**:\n\
         - Requisitos: {requirements}\n\
         - Riscos: {risks}\n\
         - Dependências: {dependencies}\n\
         - Stakeholders: {stakeholders}\n\
         - Decisões: {decisions}\n\n\
         **Detalhes do Estado**:\n{state_json}\n\n\
         Gere o Business Case Canvas completo em Markdown.",
        title = activity.title,
        description = activity.description,
        summary = state.summary,
        requirements = state.requirement_count(),
        risks = state.identified_risks.len(),
        dependencies = state.dependencies.len(),
        stakeholders = activity.stakeholders.len(),
        decisions = state.decisions.len(),
    )
}
