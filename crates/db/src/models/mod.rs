pub mod curso;
pub mod outline;
pub mod plano;
pub mod professor;
pub mod secoes;
