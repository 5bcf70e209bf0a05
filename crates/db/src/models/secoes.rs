//! Row types for the nested sections of a teaching plan. All of these live
//! inside JSON text columns of `planos_ensino` and never get their own table.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::outline::OutlineNode;

/// One week of the course schedule. Activities and assessment are outlines
/// so the editor can nest sub-items under each entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CronogramaItem {
    pub id: Uuid,
    pub semana: i64,
    #[serde(default)]
    pub data_inicio: String,
    #[serde(default)]
    pub data_fim: String,
    #[serde(default)]
    pub atividades: Vec<OutlineNode>,
    #[serde(default)]
    pub avaliacao: Vec<OutlineNode>,
    #[serde(default)]
    pub recursos: Vec<String>,
}

impl CronogramaItem {
    pub fn new(semana: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            semana,
            data_inicio: String::new(),
            data_fim: String::new(),
            atividades: Vec::new(),
            avaliacao: Vec::new(),
            recursos: Vec::new(),
        }
    }
}

#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, TS, EnumString, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TipoRecurso {
    Fisico,
    #[default]
    Material,
    Tecnologia,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct RecursoUtilizado {
    pub id: Uuid,
    #[serde(default)]
    pub tipo: TipoRecurso,
    pub descricao: String,
    #[serde(default)]
    pub quantidade: Option<i64>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct VisitaTecnica {
    pub id: Uuid,
    pub local: String,
    #[serde(default)]
    pub data_prevista: String,
    #[serde(default)]
    pub materiais_necessarios: Vec<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

/// Evaluation criterion with its weight in percent. Weights not summing to
/// 100 are flagged in the UI but never block a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CriterioAvaliacao {
    pub descricao: String,
    #[serde(default)]
    pub peso: f64,
}

pub fn total_peso(criterios: &[CriterioAvaliacao]) -> f64 {
    criterios.iter().map(|criterio| criterio.peso).sum()
}
