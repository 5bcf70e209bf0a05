//! PDF export of a finalized teaching plan.
//!
//! The record is laid out as simple HTML following the institutional
//! numbered-section template, then rendered to PDF through printpdf's HTML
//! path. Complex CSS is avoided on purpose.

use std::collections::BTreeMap;

use db::models::{
    outline::OutlineNode,
    plano::PlanoDetalhe,
    secoes::{self, CriterioAvaliacao, CronogramaItem, RecursoUtilizado, VisitaTecnica},
};
use printpdf::{GeneratePdfOptions, PdfDocument};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("apenas planos finalizados podem ser exportados")]
    NaoFinalizado,
    #[error("falha ao gerar o PDF: {0}")]
    Pdf(String),
}

/// Render `plano` to PDF bytes. Only finalized records are exportable.
pub fn gerar_pdf(
    plano: &PlanoDetalhe,
    curso_nome: &str,
    professor_nome: &str,
) -> Result<Vec<u8>, ExportError> {
    if !plano.finalizado {
        return Err(ExportError::NaoFinalizado);
    }

    let html = render_html(plano, curso_nome, professor_nome);
    let mut warnings = Vec::new();
    let doc = PdfDocument::from_html(
        &html,
        &BTreeMap::new(),
        &BTreeMap::new(),
        &GeneratePdfOptions::default(),
        &mut warnings,
    )
    .map_err(|e| ExportError::Pdf(e.to_string()))?;
    if !warnings.is_empty() {
        warn!(titulo = %plano.titulo, ?warnings, "PDF generation warnings");
    }
    let mut save_warnings = Vec::new();
    Ok(doc.save(&Default::default(), &mut save_warnings))
}

fn escape(texto: &str) -> String {
    texto
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn paragrafo(html: &mut String, texto: &str) {
    if texto.trim().is_empty() {
        html.push_str("<p>—</p>");
    } else {
        for linha in texto.lines().filter(|l| !l.trim().is_empty()) {
            html.push_str(&format!("<p>{}</p>", escape(linha.trim())));
        }
    }
}

/// `n.` roots and `n.m.` children, matching the printed template the import
/// heuristics read back.
fn outline_html(html: &mut String, nodes: &[OutlineNode]) {
    for (index, node) in nodes.iter().enumerate() {
        html.push_str(&format!("<p>{}. {}</p>", index + 1, escape(&node.titulo)));
        for (sub_index, sub) in node.subtopicos.iter().enumerate() {
            html.push_str(&format!(
                "<p>{}.{}. {}</p>",
                index + 1,
                sub_index + 1,
                escape(&sub.titulo)
            ));
        }
    }
}

fn titulos_outline(nodes: &[OutlineNode]) -> String {
    nodes
        .iter()
        .map(|node| escape(&node.titulo))
        .collect::<Vec<_>>()
        .join("; ")
}

fn secao(html: &mut String, numero: usize, titulo: &str) {
    html.push_str(&format!("<h2>{numero}) {titulo}</h2>"));
}

pub fn render_html(plano: &PlanoDetalhe, curso_nome: &str, professor_nome: &str) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html><html><head><style>body { font-family: sans-serif; } \
         table { width: 100%; } th, td { border: 1px solid #444; padding: 2px; }</style>\
         </head><body>",
    );
    html.push_str(&format!("<h1>Plano de Ensino — {}</h1>", escape(&plano.titulo)));

    secao(&mut html, 1, "Identificação");
    html.push_str(&format!(
        "<p>Curso: {}</p><p>Componente Curricular: {} ({})</p><p>Período: {} — {}</p>\
         <p>Professor(a): {}</p>",
        escape(curso_nome),
        escape(&plano.disciplina),
        escape(&plano.abreviatura),
        escape(&plano.periodo),
        escape(&plano.ano_periodo),
        escape(professor_nome),
    ));

    secao(&mut html, 2, "Carga Horária");
    html.push_str("<table><tr><th></th><th>Horas</th><th>%</th></tr>");
    let linhas = [
        ("Total", plano.carga_horaria_total, 100.0),
        (
            "Presencial",
            plano.carga_horaria_presencial,
            plano.carga_horaria_presencial_percentual,
        ),
        (
            "Teórica",
            plano.carga_horaria_teorica,
            plano.carga_horaria_teorica_percentual,
        ),
        (
            "Prática",
            plano.carga_horaria_pratica,
            plano.carga_horaria_pratica_percentual,
        ),
        (
            "Semanal",
            plano.carga_horaria_semanal,
            plano.carga_horaria_semanal_percentual,
        ),
        (
            "À distância",
            plano.carga_horaria_distancia,
            plano.carga_horaria_distancia_percentual,
        ),
    ];
    for (rotulo, horas, percentual) in linhas {
        html.push_str(&format!(
            "<tr><td>{rotulo}</td><td>{horas}</td><td>{percentual:.2}%</td></tr>"
        ));
    }
    html.push_str("</table>");

    secao(&mut html, 3, "Ementa");
    paragrafo(&mut html, &plano.ementa);

    secao(&mut html, 4, "Objetivos");
    html.push_str("<h3>4.1 Geral</h3>");
    paragrafo(&mut html, &plano.objetivo_geral);
    html.push_str("<h3>4.2 Específicos</h3>");
    outline_html(&mut html, &plano.objetivos_especificos);

    secao(&mut html, 5, "Conteúdo Programático");
    outline_html(&mut html, &plano.conteudo_programatico);

    secao(&mut html, 6, "Metodologia");
    paragrafo(&mut html, &plano.metodologia);

    secao(&mut html, 7, "Justificativa da Modalidade");
    paragrafo(&mut html, &plano.justificativa_modalidade);

    secao(&mut html, 8, "Atividades de Extensão");
    paragrafo(&mut html, &plano.atividades_extensao);

    secao(&mut html, 9, "Critérios de Avaliação");
    criterios_html(&mut html, &plano.criterios_avaliacao);

    secao(&mut html, 10, "Recursos Utilizados");
    recursos_html(&mut html, &plano.recursos_utilizados);

    secao(&mut html, 11, "Visitas Técnicas");
    visitas_html(&mut html, &plano.visitas_tecnicas);

    secao(&mut html, 12, "Cronograma");
    cronograma_html(&mut html, &plano.cronograma);

    secao(&mut html, 13, "Bibliografia");
    html.push_str("<h3>13.1 Básica</h3>");
    referencias_html(&mut html, &plano.bibliografia_basica);
    html.push_str("<h3>13.2 Complementar</h3>");
    referencias_html(&mut html, &plano.bibliografia_complementar);

    html.push_str("</body></html>");
    html
}

fn criterios_html(html: &mut String, criterios: &[CriterioAvaliacao]) {
    if criterios.is_empty() {
        html.push_str("<p>—</p>");
        return;
    }
    html.push_str("<table><tr><th>Critério</th><th>Peso</th></tr>");
    for criterio in criterios {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}%</td></tr>",
            escape(&criterio.descricao),
            criterio.peso
        ));
    }
    html.push_str(&format!(
        "<tr><td>Total</td><td>{}%</td></tr></table>",
        secoes::total_peso(criterios)
    ));
}

fn recursos_html(html: &mut String, recursos: &[RecursoUtilizado]) {
    if recursos.is_empty() {
        html.push_str("<p>—</p>");
        return;
    }
    for (index, recurso) in recursos.iter().enumerate() {
        let quantidade = recurso
            .quantidade
            .map(|q| format!(" (qtd. {q})"))
            .unwrap_or_default();
        html.push_str(&format!(
            "<p>{}. [{}] {}{}</p>",
            index + 1,
            recurso.tipo,
            escape(&recurso.descricao),
            quantidade
        ));
    }
}

fn visitas_html(html: &mut String, visitas: &[VisitaTecnica]) {
    if visitas.is_empty() {
        html.push_str("<p>—</p>");
        return;
    }
    for (index, visita) in visitas.iter().enumerate() {
        html.push_str(&format!(
            "<p>{}. {} — {}</p>",
            index + 1,
            escape(&visita.local),
            escape(&visita.data_prevista)
        ));
        if !visita.materiais_necessarios.is_empty() {
            html.push_str(&format!(
                "<p>Materiais necessários: {}</p>",
                escape(&visita.materiais_necessarios.join(", "))
            ));
        }
    }
}

fn cronograma_html(html: &mut String, cronograma: &[CronogramaItem]) {
    if cronograma.is_empty() {
        html.push_str("<p>—</p>");
        return;
    }
    html.push_str(
        "<table><tr><th>Semana</th><th>Início</th><th>Fim</th>\
         <th>Atividades</th><th>Avaliação</th></tr>",
    );
    for item in cronograma {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            item.semana,
            escape(&item.data_inicio),
            escape(&item.data_fim),
            titulos_outline(&item.atividades),
            titulos_outline(&item.avaliacao),
        ));
    }
    html.push_str("</table>");
}

fn referencias_html(html: &mut String, referencias: &[String]) {
    if referencias.is_empty() {
        html.push_str("<p>—</p>");
        return;
    }
    for (index, referencia) in referencias.iter().enumerate() {
        html.push_str(&format!("<p>{}. {}</p>", index + 1, escape(referencia)));
    }
}
