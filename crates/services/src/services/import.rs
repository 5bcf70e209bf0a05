//! Best-effort import of a teaching plan from an uploaded PDF.
//!
//! The extraction is regex pattern-matching tuned against one institutional
//! template, not a parser with a grammar. Every extractor returns a partial
//! result or a fixed default and never fails; the imported record is saved as
//! a draft so the professor reviews everything before finalizing.

use chrono::{Datelike, Utc};
use db::models::{
    curso::Curso,
    outline::OutlineNode,
    plano::{CargaHoraria, PlanoEnsino, PlanoPayload},
    secoes::{CronogramaItem, RecursoUtilizado, TipoRecurso, VisitaTecnica},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("falha ao ler o PDF: {0}")]
    Pdf(String),
    #[error("PDF vazio ou ilegível")]
    PdfVazio,
    #[error("nenhum curso cadastrado no sistema")]
    SemCurso,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything the heuristics managed to pull out of the text stream.
#[derive(Debug, Default, Clone)]
pub struct DadosExtraidos {
    pub disciplina: String,
    pub abreviatura: String,
    pub curso: String,
    pub periodo_numero: i64,
    pub ementa: String,
    pub objetivo_geral: String,
    pub metodologia: String,
    pub justificativa_modalidade: String,
    pub atividades_extensao: String,
    pub carga_horaria: CargaHoraria,
    pub objetivos_especificos: Vec<OutlineNode>,
    pub conteudo_programatico: Vec<OutlineNode>,
    pub cronograma: Vec<CronogramaItem>,
    pub recursos_utilizados: Vec<RecursoUtilizado>,
    pub visitas_tecnicas: Vec<VisitaTecnica>,
    pub bibliografia_basica: Vec<String>,
    pub bibliografia_complementar: Vec<String>,
}

pub struct PlanoImporter {
    pool: SqlitePool,
}

impl PlanoImporter {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Extract text from the PDF, run the heuristics and persist the result
    /// as a new draft owned by `professor_id`.
    pub async fn importar(
        &self,
        filename: &str,
        bytes: &[u8],
        professor_id: Uuid,
    ) -> Result<PlanoEnsino, ImportError> {
        let content = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ImportError::Pdf(e.to_string()))?;
        if content.trim().is_empty() {
            return Err(ImportError::PdfVazio);
        }

        let dados = extrair_plano(&content);
        info!(
            disciplina = %dados.disciplina,
            topicos = dados.conteudo_programatico.len(),
            objetivos = dados.objetivos_especificos.len(),
            semanas = dados.cronograma.len(),
            "PDF extraction finished"
        );

        // Map the extracted course name onto a registered course, falling
        // back to the first one on record.
        let curso = if dados.curso.is_empty() {
            None
        } else {
            Curso::find_by_nome_like(&self.pool, &dados.curso).await?
        };
        let curso = match curso {
            Some(curso) => curso,
            None => {
                warn!(extraido = %dados.curso, "extracted course not registered, using first");
                Curso::find_first(&self.pool)
                    .await?
                    .ok_or(ImportError::SemCurso)?
            }
        };

        let agora = Utc::now();
        let semestre = if agora.month() <= 6 { 1 } else { 2 };
        let titulo = filename.trim_end_matches(".pdf").to_string();

        let payload = PlanoPayload {
            titulo,
            abreviatura: dados.abreviatura,
            periodo_numero: dados.periodo_numero,
            curso_id: curso.id,
            professor_id,
            disciplina: dados.disciplina,
            ano_periodo: format!("{}/{}", agora.year(), semestre),
            carga_horaria: dados.carga_horaria,
            ementa: dados.ementa,
            objetivo_geral: dados.objetivo_geral,
            metodologia: dados.metodologia,
            justificativa_modalidade: dados.justificativa_modalidade,
            atividades_extensao: dados.atividades_extensao,
            objetivos_especificos: dados.objetivos_especificos,
            conteudo_programatico: dados.conteudo_programatico,
            cronograma: dados.cronograma,
            recursos_utilizados: dados.recursos_utilizados,
            visitas_tecnicas: dados.visitas_tecnicas,
            criterios_avaliacao: Vec::new(),
            bibliografia_basica: dados.bibliografia_basica,
            bibliografia_complementar: dados.bibliografia_complementar,
            status: None, // always a draft, user review required
        };

        Ok(PlanoEnsino::create(&self.pool, Uuid::new_v4(), &payload).await?)
    }
}

/// Run every extractor over the raw text stream.
pub fn extrair_plano(content: &str) -> DadosExtraidos {
    let (disciplina, abreviatura) = extrair_disciplina(content);
    DadosExtraidos {
        disciplina,
        abreviatura,
        curso: extrair_curso(content),
        periodo_numero: extrair_periodo_numero(content),
        ementa: extrair_entre(content, r"(?:2|II)\)\s*Ementa", r"(?:3|III)\)"),
        objetivo_geral: extrair_entre(content, r"(?:3\.1|III\.1)\.?\s*Geral", r"(?:3\.2|III\.2)"),
        metodologia: extrair_entre(content, r"(?:5|V)\)\s*Metodologia", r"(?:6|VI)\)"),
        justificativa_modalidade: extrair_entre(
            content,
            r"(?:6|VI)\)\s*Justificativa\s+da\s+Modalidade",
            r"(?:7|VII)\)",
        ),
        atividades_extensao: extrair_entre(
            content,
            r"(?:7|VII)\)\s*Atividades\s+de\s+Extens[ãa]o",
            r"(?:8|VIII)\)",
        ),
        carga_horaria: extrair_carga_horaria(content),
        objetivos_especificos: extrair_itens_numerados(&extrair_entre(
            content,
            r"(?:3\.2|III\.2)\.?\s*Espec[íi]ficos",
            r"(?:4|IV)\)",
        )),
        conteudo_programatico: extrair_itens_numerados(&extrair_entre(
            content,
            r"(?:4|IV)\)\s*Conte[úu]do\s+Program[áa]tico",
            r"(?:5|V)\)",
        )),
        cronograma: extrair_cronograma(&extrair_entre(
            content,
            r"(?:10|X)\)\s*Cronograma",
            r"(?:11|XI)\)",
        )),
        recursos_utilizados: extrair_recursos(&extrair_entre(
            content,
            r"(?:8|VIII)\)\s*Recursos\s+Utilizados",
            r"(?:9|IX)\)",
        )),
        visitas_tecnicas: extrair_visitas(&extrair_entre(
            content,
            r"(?:9|IX)\)\s*Visitas\s+T[ée]cnicas",
            r"(?:10|X)\)",
        )),
        bibliografia_basica: extrair_referencias(&extrair_entre(
            content,
            r"11\.1\.?\s*B[áa]sica",
            r"11\.2",
        )),
        bibliografia_complementar: extrair_referencias(&extrair_entre(
            content,
            r"11\.2\.?\s*Complementar",
            r"(?:12|XII)\)",
        )),
    }
}

/// Slice the text between a section header and the next one. Missing headers
/// yield an empty string.
fn extrair_entre(content: &str, inicio: &str, fim: &str) -> String {
    let pattern = format!(r"(?si){inicio}\s*(.*?)\s*(?:{fim}|\z)");
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(content)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        Err(error) => {
            warn!(%error, "invalid section pattern");
            String::new()
        }
    }
}

static ITEM_PRINCIPAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)[.)]\s+(\S.*)$").unwrap());
static SUBITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\.(\d+)[.)]?\s+(\S.*)$").unwrap());

/// Turn `1. Topic` / `1.1 Subtopic` numbered lines into an outline. A
/// sub-item attaches to the last main item carrying its leading number;
/// `ordem` comes from the printed number minus one.
pub fn extrair_itens_numerados(section: &str) -> Vec<OutlineNode> {
    let mut items: Vec<OutlineNode> = Vec::new();
    for line in section.lines() {
        if let Some(caps) = SUBITEM.captures(line) {
            let principal: i64 = caps[1].parse().unwrap_or(0);
            let sub: i64 = caps[2].parse().unwrap_or(1);
            if let Some(parent) = items
                .iter_mut()
                .rev()
                .find(|item| item.ordem == principal - 1)
            {
                parent
                    .subtopicos
                    .push(OutlineNode::new(caps[3].trim(), sub - 1));
                continue;
            }
            // Sub-item with no matching parent: keep it as a root so no
            // text is silently dropped.
            items.push(OutlineNode::new(caps[3].trim(), items.len() as i64));
        } else if let Some(caps) = ITEM_PRINCIPAL.captures(line) {
            let numero: i64 = caps[1].parse().unwrap_or(1);
            items.push(OutlineNode::new(caps[2].trim(), numero - 1));
        }
    }
    items
}

/// Workload numbers with the template's hard-coded defaults for anything the
/// regexes miss.
pub fn extrair_carga_horaria(content: &str) -> CargaHoraria {
    static TOTAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)carga\s+hor[áa]ria\s+total:?\s*(\d+)").unwrap());
    static PRESENCIAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)carga\s+hor[áa]ria\s+presencial:?\s*(\d+)").unwrap());
    static TEORICA: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)carga\s+hor[áa]ria\s+te[óo]rica:?\s*(\d+)").unwrap());
    static PRATICA: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)carga\s+hor[áa]ria\s+pr[áa]tica:?\s*(\d+)").unwrap());
    static SEMANAL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)carga\s+hor[áa]ria\s+semanal:?\s*(\d+)").unwrap());
    static DISTANCIA: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)carga\s+hor[áa]ria\s+[àa]\s+dist[âa]ncia:?\s*(\d+)").unwrap()
    });

    let numero = |re: &Regex, default: f64| -> f64 {
        re.captures(content)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(default)
    };

    CargaHoraria {
        carga_horaria_total: numero(&TOTAL, 60.0),
        carga_horaria_presencial: numero(&PRESENCIAL, 48.0),
        carga_horaria_teorica: numero(&TEORICA, 30.0),
        carga_horaria_pratica: numero(&PRATICA, 30.0),
        carga_horaria_semanal: numero(&SEMANAL, 4.0),
        carga_horaria_distancia: numero(&DISTANCIA, 12.0),
    }
}

fn extrair_disciplina(content: &str) -> (String, String) {
    static PADROES: Lazy<Vec<Regex>> = Lazy::new(|| {
        vec![
            Regex::new(
                r"(?i)componente\s+curricular:?\s*([^:\n]+?)(?:\s+abreviatura:?\s*([A-Za-z0-9]+))?\s*$",
            )
            .unwrap(),
            Regex::new(r"(?i)disciplina:?\s*([^:\n]+?)(?:\s+abreviatura:?\s*([A-Za-z0-9]+))?\s*$")
                .unwrap(),
        ]
    });
    for line in content.lines() {
        for pattern in PADROES.iter() {
            if let Some(caps) = pattern.captures(line) {
                let disciplina = caps
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                let abreviatura = caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                if !disciplina.is_empty() {
                    return (disciplina, abreviatura);
                }
            }
        }
    }
    (String::new(), String::new())
}

fn extrair_curso(content: &str) -> String {
    static PADROES: Lazy<Vec<Regex>> = Lazy::new(|| {
        vec![
            Regex::new(r"(?i)curso:?\s*([^:\n]+?)\s*(?:per[íi]odo|disciplina|$)").unwrap(),
            Regex::new(r"(?i)gradua[çc][ãa]o\s+em:?\s*([^:\n]+?)\s*(?:per[íi]odo|disciplina|$)")
                .unwrap(),
        ]
    });
    for line in content.lines() {
        for pattern in PADROES.iter() {
            if let Some(caps) = pattern.captures(line) {
                let nome = caps[1].trim();
                if !nome.is_empty() {
                    return nome.to_string();
                }
            }
        }
    }
    String::new()
}

fn extrair_periodo_numero(content: &str) -> i64 {
    static PERIODO: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)per[íi]odo:?\s*(\d+)").unwrap());
    PERIODO
        .captures(content)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(1)
}

static DATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})").unwrap());

/// `d/m/yy[yy]` (or dashes) to ISO `yyyy-mm-dd`; anything else becomes "".
pub fn parse_data(texto: &str) -> String {
    let Some(caps) = DATA.captures(texto) else {
        return String::new();
    };
    let dia = &caps[1];
    let mes = &caps[2];
    let ano = &caps[3];
    let ano = if ano.len() == 2 {
        format!("20{ano}")
    } else {
        ano.to_string()
    };
    format!("{ano}-{mes:0>2}-{dia:0>2}")
}

static MARCADOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.|[-•]").unwrap());

fn extrair_recursos(section: &str) -> Vec<RecursoUtilizado> {
    MARCADOR
        .split(section)
        .map(str::trim)
        .filter(|texto| !texto.is_empty())
        .map(|descricao| RecursoUtilizado {
            id: Uuid::new_v4(),
            tipo: TipoRecurso::Material,
            descricao: descricao.to_string(),
            quantidade: Some(1),
            observacoes: None,
        })
        .collect()
}

fn extrair_visitas(section: &str) -> Vec<VisitaTecnica> {
    static MATERIAIS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)materiais[^:]*:\s*(.*?)\s*(?:data|\z)").unwrap());
    MARCADOR
        .split(section)
        .map(str::trim)
        .filter(|texto| !texto.is_empty())
        .map(|bloco| {
            let local = bloco.lines().next().unwrap_or("").trim().to_string();
            let materiais = MATERIAIS
                .captures(bloco)
                .map(|caps| {
                    caps[1]
                        .split([',', ';'])
                        .map(str::trim)
                        .filter(|material| !material.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            VisitaTecnica {
                id: Uuid::new_v4(),
                local,
                data_prevista: parse_data(bloco),
                materiais_necessarios: materiais,
                observacoes: None,
            }
        })
        .collect()
}

fn extrair_cronograma(section: &str) -> Vec<CronogramaItem> {
    static SEMANA: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"(?is)semana\s*(\d+)(?:\s*[-:]\s*)?(?:(\d{1,2}/\d{1,2}/\d{2,4})\s*(?:a|até|e)\s*(\d{1,2}/\d{1,2}/\d{2,4}))?\s*(.*?)\s*(?:semana\s*\d|\z)",
        )
        .unwrap()
    });

    let mut items = Vec::new();
    let mut resto = section;
    while let Some(caps) = SEMANA.captures(resto) {
        let semana: i64 = caps[1].parse().unwrap_or(items.len() as i64 + 1);
        let corpo = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        let mut atividades = Vec::new();
        let mut recursos = Vec::new();
        for line in corpo.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.to_lowercase().contains("recurso") {
                recursos.push(line.to_string());
            } else {
                atividades.push(OutlineNode::new(line, atividades.len() as i64));
            }
        }

        let mut item = CronogramaItem::new(semana);
        item.data_inicio = caps.get(2).map(|m| parse_data(m.as_str())).unwrap_or_default();
        item.data_fim = caps.get(3).map(|m| parse_data(m.as_str())).unwrap_or_default();
        item.atividades = atividades;
        item.recursos = recursos;
        items.push(item);

        // The body group swallows up to the next "Semana N"; resume there.
        let consumed = caps.get(4).map(|m| m.end()).unwrap_or(resto.len());
        if consumed == 0 || consumed >= resto.len() {
            break;
        }
        resto = &resto[consumed..];
    }
    items
}

fn extrair_referencias(section: &str) -> Vec<String> {
    extrair_itens_numerados(section)
        .into_iter()
        .map(|item| item.titulo)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMOSTRA: &str = "\
Curso: Engenharia de Software Período: 3
Componente Curricular: Algoritmos e Estruturas de Dados abreviatura: AED
Carga horária Total: 60
Carga horária Presencial: 48
Carga horária Teórica: 30
Carga horária Prática: 30
Carga horária Semanal: 4
Carga horária à Distância: 12
2) Ementa
Estudo de estruturas de dados lineares e não lineares.
3) Objetivos
3.1 Geral
Capacitar o aluno a projetar algoritmos eficientes.
3.2 Específicos
1. Compreender análise assintótica
1.1 Notação O
1.2 Casos médio e pior
2. Implementar estruturas lineares
4) Conteúdo Programático
1. Introdução
1.1 Histórico
2. Listas encadeadas
5) Metodologia
Aulas expositivas e laboratórios.
6) Justificativa da Modalidade
Não se aplica.
7) Atividades de Extensão
Oficina aberta à comunidade.
8) Recursos Utilizados
1. Projetor
2. Laboratório de informática
9) Visitas Técnicas
1. Parque tecnológico Materiais necessários: crachá, caderno Data: 15/09/2025
10) Cronograma
Semana 1 - 04/08/2025 a 08/08/2025
Apresentação da disciplina
Recurso: projetor
Semana 2 - 11/08/2025 a 15/08/2025
Análise assintótica
11) Bibliografia
11.1 Básica
1. CORMEN, T. et al. Algoritmos: teoria e prática
11.2 Complementar
1. SEDGEWICK, R. Algorithms
";

    #[test]
    fn extracts_scalar_sections() {
        let dados = extrair_plano(AMOSTRA);
        assert_eq!(dados.disciplina, "Algoritmos e Estruturas de Dados");
        assert_eq!(dados.abreviatura, "AED");
        assert_eq!(dados.curso, "Engenharia de Software");
        assert_eq!(dados.periodo_numero, 3);
        assert!(dados.ementa.starts_with("Estudo de estruturas"));
        assert!(dados.objetivo_geral.contains("projetar algoritmos"));
        assert!(dados.metodologia.contains("laboratórios"));
        assert!(dados.atividades_extensao.contains("Oficina"));
    }

    #[test]
    fn extracts_carga_horaria_from_sample() {
        let carga = extrair_carga_horaria(AMOSTRA);
        assert_eq!(carga.carga_horaria_total, 60.0);
        assert_eq!(carga.carga_horaria_presencial, 48.0);
        assert_eq!(carga.carga_horaria_distancia, 12.0);
    }

    #[test]
    fn carga_horaria_falls_back_to_defaults() {
        let carga = extrair_carga_horaria("texto sem nenhuma carga");
        assert_eq!(carga.carga_horaria_total, 60.0);
        assert_eq!(carga.carga_horaria_presencial, 48.0);
        assert_eq!(carga.carga_horaria_teorica, 30.0);
        assert_eq!(carga.carga_horaria_pratica, 30.0);
        assert_eq!(carga.carga_horaria_semanal, 4.0);
        assert_eq!(carga.carga_horaria_distancia, 12.0);
    }

    #[test]
    fn numbered_items_build_a_one_level_outline() {
        let dados = extrair_plano(AMOSTRA);
        let objetivos = &dados.objetivos_especificos;
        assert_eq!(objetivos.len(), 2);
        assert_eq!(objetivos[0].titulo, "Compreender análise assintótica");
        assert_eq!(objetivos[0].ordem, 0);
        assert_eq!(objetivos[0].subtopicos.len(), 2);
        assert_eq!(objetivos[0].subtopicos[0].titulo, "Notação O");
        assert_eq!(objetivos[0].subtopicos[1].ordem, 1);
        assert_eq!(objetivos[1].titulo, "Implementar estruturas lineares");
        assert!(objetivos[1].subtopicos.is_empty());
    }

    #[test]
    fn conteudo_programatico_is_scoped_to_its_section() {
        let dados = extrair_plano(AMOSTRA);
        assert_eq!(dados.conteudo_programatico.len(), 2);
        assert_eq!(dados.conteudo_programatico[0].titulo, "Introdução");
        assert_eq!(dados.conteudo_programatico[1].titulo, "Listas encadeadas");
    }

    #[test]
    fn cronograma_weeks_split_activities_and_resources() {
        let dados = extrair_plano(AMOSTRA);
        assert_eq!(dados.cronograma.len(), 2);
        let semana1 = &dados.cronograma[0];
        assert_eq!(semana1.semana, 1);
        assert_eq!(semana1.data_inicio, "2025-08-04");
        assert_eq!(semana1.data_fim, "2025-08-08");
        assert_eq!(semana1.atividades.len(), 1);
        assert_eq!(semana1.atividades[0].titulo, "Apresentação da disciplina");
        assert_eq!(semana1.recursos, vec!["Recurso: projetor"]);
        assert_eq!(dados.cronograma[1].semana, 2);
    }

    #[test]
    fn visitas_carry_date_and_materials() {
        let dados = extrair_plano(AMOSTRA);
        assert_eq!(dados.visitas_tecnicas.len(), 1);
        let visita = &dados.visitas_tecnicas[0];
        assert!(visita.local.starts_with("Parque tecnológico"));
        assert_eq!(visita.data_prevista, "2025-09-15");
        assert_eq!(visita.materiais_necessarios, vec!["crachá", "caderno"]);
    }

    #[test]
    fn bibliografia_lists_titles() {
        let dados = extrair_plano(AMOSTRA);
        assert_eq!(
            dados.bibliografia_basica,
            vec!["CORMEN, T. et al. Algoritmos: teoria e prática"]
        );
        assert_eq!(dados.bibliografia_complementar, vec!["SEDGEWICK, R. Algorithms"]);
    }

    #[test]
    fn empty_text_yields_defaults_not_errors() {
        let dados = extrair_plano("");
        assert_eq!(dados.disciplina, "");
        assert_eq!(dados.periodo_numero, 1);
        assert!(dados.conteudo_programatico.is_empty());
        assert!(dados.cronograma.is_empty());
        assert_eq!(dados.carga_horaria.carga_horaria_total, 60.0);
    }

    #[test]
    fn parse_data_handles_two_digit_years() {
        assert_eq!(parse_data("5/3/25"), "2025-03-05");
        assert_eq!(parse_data("15/09/2025"), "2025-09-15");
        assert_eq!(parse_data("15-09-2025"), "2025-09-15");
        assert_eq!(parse_data("sem data"), "");
    }
}
