use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::{
    outline::OutlineNode,
    secoes::{CriterioAvaliacao, CronogramaItem, RecursoUtilizado, VisitaTecnica},
};

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "plano_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlanoStatus {
    #[default]
    Rascunho,
    Finalizado,
}

/// Percentage of `parte` over `total`, with the degenerate total-zero case
/// defined as 0 rather than NaN/Infinity.
pub fn percentual(parte: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        (parte / total) * 100.0
    }
}

/// The raw workload numbers as entered in the form. Percentages are always
/// derived from these, never stored independently by the caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, TS)]
pub struct CargaHoraria {
    #[serde(default)]
    pub carga_horaria_total: f64,
    #[serde(default)]
    pub carga_horaria_presencial: f64,
    #[serde(default)]
    pub carga_horaria_teorica: f64,
    #[serde(default)]
    pub carga_horaria_pratica: f64,
    #[serde(default)]
    pub carga_horaria_semanal: f64,
    #[serde(default)]
    pub carga_horaria_distancia: f64,
}

impl CargaHoraria {
    pub fn percentual_de(&self, parte: f64) -> f64 {
        percentual(parte, self.carga_horaria_total)
    }
}

/// One row of `planos_ensino`. Nested collections stay as opaque JSON text
/// here; use the `parsed_*` accessors or [`PlanoEnsino::into_detalhe`] to get
/// structured values.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PlanoEnsino {
    pub id: Uuid,
    pub titulo: String,
    pub abreviatura: String,
    pub periodo: String,
    pub periodo_numero: i64,
    pub curso_id: Uuid,
    pub professor_id: Uuid,
    pub disciplina: String,
    pub ano_periodo: String,

    pub carga_horaria_total: f64,
    pub carga_horaria_presencial: f64,
    pub carga_horaria_presencial_percentual: f64,
    pub carga_horaria_teorica: f64,
    pub carga_horaria_teorica_percentual: f64,
    pub carga_horaria_pratica: f64,
    pub carga_horaria_pratica_percentual: f64,
    pub carga_horaria_semanal: f64,
    pub carga_horaria_semanal_percentual: f64,
    pub carga_horaria_distancia: f64,
    pub carga_horaria_distancia_percentual: f64,

    pub ementa: String,
    pub objetivo_geral: String,
    pub metodologia: String,
    pub justificativa_modalidade: String,
    pub atividades_extensao: String,

    pub objetivos_especificos: Option<String>,
    pub conteudo_programatico: Option<String>,
    pub cronograma: Option<String>,
    pub recursos_utilizados: Option<String>,
    pub visitas_tecnicas: Option<String>,
    pub criterios_avaliacao: Option<String>,
    pub bibliografia_basica: Option<String>,
    pub bibliografia_complementar: Option<String>,

    pub status: PlanoStatus,
    pub finalizado: bool,
    pub created_at: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Full record with every nested collection parsed, as served to the editor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PlanoDetalhe {
    pub id: Uuid,
    pub titulo: String,
    pub abreviatura: String,
    pub periodo: String,
    pub periodo_numero: i64,
    pub curso_id: Uuid,
    pub professor_id: Uuid,
    pub disciplina: String,
    pub ano_periodo: String,

    pub carga_horaria_total: f64,
    pub carga_horaria_presencial: f64,
    pub carga_horaria_presencial_percentual: f64,
    pub carga_horaria_teorica: f64,
    pub carga_horaria_teorica_percentual: f64,
    pub carga_horaria_pratica: f64,
    pub carga_horaria_pratica_percentual: f64,
    pub carga_horaria_semanal: f64,
    pub carga_horaria_semanal_percentual: f64,
    pub carga_horaria_distancia: f64,
    pub carga_horaria_distancia_percentual: f64,

    pub ementa: String,
    pub objetivo_geral: String,
    pub metodologia: String,
    pub justificativa_modalidade: String,
    pub atividades_extensao: String,

    pub objetivos_especificos: Vec<OutlineNode>,
    pub conteudo_programatico: Vec<OutlineNode>,
    pub cronograma: Vec<CronogramaItem>,
    pub recursos_utilizados: Vec<RecursoUtilizado>,
    pub visitas_tecnicas: Vec<VisitaTecnica>,
    pub criterios_avaliacao: Vec<CriterioAvaliacao>,
    pub bibliografia_basica: Vec<String>,
    pub bibliografia_complementar: Vec<String>,

    pub status: PlanoStatus,
    pub finalizado: bool,
    pub created_at: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
}

/// Payload shared by the create and whole-record-update operations. The
/// editing pages always send the complete next state of the record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PlanoPayload {
    pub titulo: String,
    #[serde(default)]
    pub abreviatura: String,
    #[serde(default = "default_periodo_numero")]
    pub periodo_numero: i64,
    pub curso_id: Uuid,
    pub professor_id: Uuid,
    #[serde(default)]
    pub disciplina: String,
    #[serde(default)]
    pub ano_periodo: String,

    #[serde(flatten)]
    #[ts(flatten)]
    pub carga_horaria: CargaHoraria,

    #[serde(default)]
    pub ementa: String,
    #[serde(default)]
    pub objetivo_geral: String,
    #[serde(default)]
    pub metodologia: String,
    #[serde(default)]
    pub justificativa_modalidade: String,
    #[serde(default)]
    pub atividades_extensao: String,

    #[serde(default)]
    pub objetivos_especificos: Vec<OutlineNode>,
    #[serde(default)]
    pub conteudo_programatico: Vec<OutlineNode>,
    #[serde(default)]
    pub cronograma: Vec<CronogramaItem>,
    #[serde(default)]
    pub recursos_utilizados: Vec<RecursoUtilizado>,
    #[serde(default)]
    pub visitas_tecnicas: Vec<VisitaTecnica>,
    #[serde(default)]
    pub criterios_avaliacao: Vec<CriterioAvaliacao>,
    #[serde(default)]
    pub bibliografia_basica: Vec<String>,
    #[serde(default)]
    pub bibliografia_complementar: Vec<String>,

    #[serde(default)]
    pub status: Option<PlanoStatus>,
}

fn default_periodo_numero() -> i64 {
    1
}

/// Aggregate row for the admin drill-down view: finalized plans per course
/// and period.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PlanoResumo {
    pub curso_id: Uuid,
    pub curso_nome: String,
    pub periodo: String,
    pub total: i64,
}

fn parse_or_default<T: DeserializeOwned + Default>(raw: Option<&str>) -> T {
    raw.and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default()
}

fn to_json(value: &impl Serialize) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Protocol(e.to_string()))
}

const COLUMNS: &str = "id, titulo, abreviatura, periodo, periodo_numero, curso_id, professor_id, \
     disciplina, ano_periodo, \
     carga_horaria_total, carga_horaria_presencial, carga_horaria_presencial_percentual, \
     carga_horaria_teorica, carga_horaria_teorica_percentual, \
     carga_horaria_pratica, carga_horaria_pratica_percentual, \
     carga_horaria_semanal, carga_horaria_semanal_percentual, \
     carga_horaria_distancia, carga_horaria_distancia_percentual, \
     ementa, objetivo_geral, metodologia, justificativa_modalidade, atividades_extensao, \
     objetivos_especificos, conteudo_programatico, cronograma, recursos_utilizados, \
     visitas_tecnicas, criterios_avaliacao, bibliografia_basica, bibliografia_complementar, \
     status, finalizado, created_at, atualizado_em";

impl PlanoEnsino {
    pub fn parsed_objetivos_especificos(&self) -> Vec<OutlineNode> {
        parse_or_default(self.objetivos_especificos.as_deref())
    }

    pub fn parsed_conteudo_programatico(&self) -> Vec<OutlineNode> {
        parse_or_default(self.conteudo_programatico.as_deref())
    }

    pub fn parsed_cronograma(&self) -> Vec<CronogramaItem> {
        parse_or_default(self.cronograma.as_deref())
    }

    pub fn parsed_recursos_utilizados(&self) -> Vec<RecursoUtilizado> {
        parse_or_default(self.recursos_utilizados.as_deref())
    }

    pub fn parsed_visitas_tecnicas(&self) -> Vec<VisitaTecnica> {
        parse_or_default(self.visitas_tecnicas.as_deref())
    }

    pub fn parsed_criterios_avaliacao(&self) -> Vec<CriterioAvaliacao> {
        parse_or_default(self.criterios_avaliacao.as_deref())
    }

    pub fn parsed_bibliografia_basica(&self) -> Vec<String> {
        parse_or_default(self.bibliografia_basica.as_deref())
    }

    pub fn parsed_bibliografia_complementar(&self) -> Vec<String> {
        parse_or_default(self.bibliografia_complementar.as_deref())
    }

    pub fn into_detalhe(self) -> PlanoDetalhe {
        PlanoDetalhe {
            objetivos_especificos: self.parsed_objetivos_especificos(),
            conteudo_programatico: self.parsed_conteudo_programatico(),
            cronograma: self.parsed_cronograma(),
            recursos_utilizados: self.parsed_recursos_utilizados(),
            visitas_tecnicas: self.parsed_visitas_tecnicas(),
            criterios_avaliacao: self.parsed_criterios_avaliacao(),
            bibliografia_basica: self.parsed_bibliografia_basica(),
            bibliografia_complementar: self.parsed_bibliografia_complementar(),
            id: self.id,
            titulo: self.titulo,
            abreviatura: self.abreviatura,
            periodo: self.periodo,
            periodo_numero: self.periodo_numero,
            curso_id: self.curso_id,
            professor_id: self.professor_id,
            disciplina: self.disciplina,
            ano_periodo: self.ano_periodo,
            carga_horaria_total: self.carga_horaria_total,
            carga_horaria_presencial: self.carga_horaria_presencial,
            carga_horaria_presencial_percentual: self.carga_horaria_presencial_percentual,
            carga_horaria_teorica: self.carga_horaria_teorica,
            carga_horaria_teorica_percentual: self.carga_horaria_teorica_percentual,
            carga_horaria_pratica: self.carga_horaria_pratica,
            carga_horaria_pratica_percentual: self.carga_horaria_pratica_percentual,
            carga_horaria_semanal: self.carga_horaria_semanal,
            carga_horaria_semanal_percentual: self.carga_horaria_semanal_percentual,
            carga_horaria_distancia: self.carga_horaria_distancia,
            carga_horaria_distancia_percentual: self.carga_horaria_distancia_percentual,
            ementa: self.ementa,
            objetivo_geral: self.objetivo_geral,
            metodologia: self.metodologia,
            justificativa_modalidade: self.justificativa_modalidade,
            atividades_extensao: self.atividades_extensao,
            status: self.status,
            finalizado: self.finalizado,
            created_at: self.created_at,
            atualizado_em: self.atualizado_em,
        }
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PlanoEnsino>(&format!(
            "SELECT {COLUMNS} FROM planos_ensino ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, PlanoEnsino>(&format!(
            "SELECT {COLUMNS} FROM planos_ensino WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &PlanoPayload,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        let carga = &data.carga_horaria;
        sqlx::query_as::<_, PlanoEnsino>(&format!(
            "INSERT INTO planos_ensino (
                id, titulo, abreviatura, periodo, periodo_numero, curso_id, professor_id,
                disciplina, ano_periodo,
                carga_horaria_total,
                carga_horaria_presencial, carga_horaria_presencial_percentual,
                carga_horaria_teorica, carga_horaria_teorica_percentual,
                carga_horaria_pratica, carga_horaria_pratica_percentual,
                carga_horaria_semanal, carga_horaria_semanal_percentual,
                carga_horaria_distancia, carga_horaria_distancia_percentual,
                ementa, objetivo_geral, metodologia, justificativa_modalidade,
                atividades_extensao,
                objetivos_especificos, conteudo_programatico, cronograma,
                recursos_utilizados, visitas_tecnicas, criterios_avaliacao,
                bibliografia_basica, bibliografia_complementar,
                status, finalizado
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9,
                $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25,
                $26, $27, $28, $29, $30, $31, $32, $33,
                $34, $35
            ) RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.titulo)
        .bind(&data.abreviatura)
        .bind(periodo_label(data.periodo_numero))
        .bind(data.periodo_numero)
        .bind(data.curso_id)
        .bind(data.professor_id)
        .bind(&data.disciplina)
        .bind(&data.ano_periodo)
        .bind(carga.carga_horaria_total)
        .bind(carga.carga_horaria_presencial)
        .bind(carga.percentual_de(carga.carga_horaria_presencial))
        .bind(carga.carga_horaria_teorica)
        .bind(carga.percentual_de(carga.carga_horaria_teorica))
        .bind(carga.carga_horaria_pratica)
        .bind(carga.percentual_de(carga.carga_horaria_pratica))
        .bind(carga.carga_horaria_semanal)
        .bind(carga.percentual_de(carga.carga_horaria_semanal))
        .bind(carga.carga_horaria_distancia)
        .bind(carga.percentual_de(carga.carga_horaria_distancia))
        .bind(&data.ementa)
        .bind(&data.objetivo_geral)
        .bind(&data.metodologia)
        .bind(&data.justificativa_modalidade)
        .bind(&data.atividades_extensao)
        .bind(to_json(&data.objetivos_especificos)?)
        .bind(to_json(&data.conteudo_programatico)?)
        .bind(to_json(&data.cronograma)?)
        .bind(to_json(&data.recursos_utilizados)?)
        .bind(to_json(&data.visitas_tecnicas)?)
        .bind(to_json(&data.criterios_avaliacao)?)
        .bind(to_json(&data.bibliografia_basica)?)
        .bind(to_json(&data.bibliografia_complementar)?)
        .bind(status)
        .bind(status == PlanoStatus::Finalizado)
        .fetch_one(pool)
        .await
    }

    /// Whole-record replace. The payload carries the complete next state;
    /// percentages are recomputed here, and `finalizado` tracks `status`.
    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &PlanoPayload,
    ) -> Result<Option<Self>, sqlx::Error> {
        let status = data.status.unwrap_or_default();
        let carga = &data.carga_horaria;
        sqlx::query_as::<_, PlanoEnsino>(&format!(
            "UPDATE planos_ensino SET
                titulo = $2, abreviatura = $3, periodo = $4, periodo_numero = $5,
                curso_id = $6, professor_id = $7, disciplina = $8, ano_periodo = $9,
                carga_horaria_total = $10,
                carga_horaria_presencial = $11, carga_horaria_presencial_percentual = $12,
                carga_horaria_teorica = $13, carga_horaria_teorica_percentual = $14,
                carga_horaria_pratica = $15, carga_horaria_pratica_percentual = $16,
                carga_horaria_semanal = $17, carga_horaria_semanal_percentual = $18,
                carga_horaria_distancia = $19, carga_horaria_distancia_percentual = $20,
                ementa = $21, objetivo_geral = $22, metodologia = $23,
                justificativa_modalidade = $24, atividades_extensao = $25,
                objetivos_especificos = $26, conteudo_programatico = $27, cronograma = $28,
                recursos_utilizados = $29, visitas_tecnicas = $30, criterios_avaliacao = $31,
                bibliografia_basica = $32, bibliografia_complementar = $33,
                status = $34, finalizado = $35,
                atualizado_em = datetime('now', 'subsec')
            WHERE id = $1
            RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.titulo)
        .bind(&data.abreviatura)
        .bind(periodo_label(data.periodo_numero))
        .bind(data.periodo_numero)
        .bind(data.curso_id)
        .bind(data.professor_id)
        .bind(&data.disciplina)
        .bind(&data.ano_periodo)
        .bind(carga.carga_horaria_total)
        .bind(carga.carga_horaria_presencial)
        .bind(carga.percentual_de(carga.carga_horaria_presencial))
        .bind(carga.carga_horaria_teorica)
        .bind(carga.percentual_de(carga.carga_horaria_teorica))
        .bind(carga.carga_horaria_pratica)
        .bind(carga.percentual_de(carga.carga_horaria_pratica))
        .bind(carga.carga_horaria_semanal)
        .bind(carga.percentual_de(carga.carga_horaria_semanal))
        .bind(carga.carga_horaria_distancia)
        .bind(carga.percentual_de(carga.carga_horaria_distancia))
        .bind(&data.ementa)
        .bind(&data.objetivo_geral)
        .bind(&data.metodologia)
        .bind(&data.justificativa_modalidade)
        .bind(&data.atividades_extensao)
        .bind(to_json(&data.objetivos_especificos)?)
        .bind(to_json(&data.conteudo_programatico)?)
        .bind(to_json(&data.cronograma)?)
        .bind(to_json(&data.recursos_utilizados)?)
        .bind(to_json(&data.visitas_tecnicas)?)
        .bind(to_json(&data.criterios_avaliacao)?)
        .bind(to_json(&data.bibliografia_basica)?)
        .bind(to_json(&data.bibliografia_complementar)?)
        .bind(status)
        .bind(status == PlanoStatus::Finalizado)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM planos_ensino WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Finalized-plan counts per course and period for the admin overview.
    pub async fn resumo(pool: &SqlitePool) -> Result<Vec<PlanoResumo>, sqlx::Error> {
        sqlx::query_as::<_, PlanoResumo>(
            "SELECT p.curso_id, c.nome AS curso_nome, p.periodo, COUNT(*) AS total
             FROM planos_ensino p
             JOIN cursos c ON c.id = p.curso_id
             WHERE p.finalizado = 1
             GROUP BY p.curso_id, p.periodo
             ORDER BY c.nome, p.periodo_numero",
        )
        .fetch_all(pool)
        .await
    }
}

pub fn periodo_label(periodo_numero: i64) -> String {
    format!("{periodo_numero}º Período")
}
