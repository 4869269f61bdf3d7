use std::path::PathBuf;

/// Failures that callers classify into user-visible responses.
///
/// Display strings are shown to API clients as-is.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Nenhum arquivo Excel carregado. Use /recarregar-dados para carregar os dados.")]
    NoDataLoaded,

    #[error("Nenhum arquivo .xlsx ou .xls encontrado no diretório {}", dir.display())]
    SourceUnavailable { dir: PathBuf },

    #[error("Erro ao ler o arquivo Excel {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error(
        "Erro ao processar o arquivo Excel {}. Verifique a estrutura do arquivo.",
        path.display()
    )]
    EmptyCatalog { path: PathBuf },

    #[error("IES '{0}' não encontrada")]
    InstitutionNotFound(String),

    #[error("Semestre '{semester}' não encontrado para a IES '{institution}'")]
    SemesterNotFound {
        institution: String,
        semester: String,
    },

    #[error("Erro ao recarregar dados: {0}")]
    Reload(String),
}
