pub mod cursos;
pub mod planos;
pub mod professores;
