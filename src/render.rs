use std::cmp::Ordering;
use std::path::Path;

use url::Url;

use crate::catalog::Catalog;
use crate::formats::{InstitutionView, Lesson, SubjectView};

const BASE_CSS: &str = "
body { font-family: Arial, sans-serif; margin: 40px; }
h1, h2 { color: #333; }
ul { list-style-type: none; padding: 0; }
li { margin: 10px 0; }
a { text-decoration: none; color: #0366d6; }
a.button { font-weight: bold; padding: 8px 12px; border: 1px solid #0366d6; border-radius: 4px; display: inline-block; }
a.button:hover { background-color: #f0f7ff; }
.notice { padding: 15px; border-radius: 5px; margin: 20px 0; }
.warning { background-color: #fff3cd; border: 1px solid #ffeaa7; color: #856404; }
.info { background-color: #d1ecf1; border: 1px solid #bee5eb; color: #0c5460; }
.success { background-color: #d4edda; border: 1px solid #c3e6cb; color: #155724; }
.error { background-color: #f8d7da; border: 1px solid #f5c6cb; color: #721c24; }
.materia { margin-top: 20px; border-left: 4px solid #0366d6; padding-left: 15px; }
.tema { margin-left: 20px; }
.subtema { margin-left: 40px; }
.aula { margin-left: 60px; }
";

/// What the home page says about the data source.
#[derive(Debug, Clone, Copy)]
pub enum HomeStatus<'a> {
    Loaded,
    WorkbookFound(&'a Path),
    NoWorkbook { dir: &'a Path },
}

pub fn home_page(catalog: &Catalog, status: HomeStatus<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h1>API de Conteúdos de IES</h1>\n");
    body.push_str("<p>API para acesso aos conteúdos das IES a partir de arquivo Excel.</p>\n");

    match status {
        HomeStatus::Loaded => {}
        HomeStatus::WorkbookFound(path) => {
            body.push_str("<div class=\"notice info\">\n");
            body.push_str(&format!(
                "<h2>Arquivo Excel encontrado: {}</h2>\n",
                escape_html(&path.display().to_string())
            ));
            body.push_str(
                "<p><a class=\"button\" href=\"/recarregar-dados\">Carregar Dados do Arquivo</a></p>\n",
            );
            body.push_str("</div>\n");
        }
        HomeStatus::NoWorkbook { dir } => {
            body.push_str("<div class=\"notice warning\">\n");
            body.push_str("<h2>Atenção: Nenhum arquivo Excel encontrado</h2>\n");
            body.push_str(
                "<p>Coloque um arquivo Excel (.xlsx ou .xls) com a estrutura correta no diretório do servidor.</p>\n",
            );
            body.push_str(&format!(
                "<p>Diretório: {}</p>\n",
                escape_html(&dir.display().to_string())
            ));
            body.push_str("</div>\n");
        }
    }

    body.push_str("<h2>Endpoints disponíveis:</h2>\n<ul>\n");
    body.push_str(
        "<li><a class=\"button\" href=\"/listar-ies\">/listar-ies</a> - Lista todas as IES disponíveis</li>\n",
    );
    body.push_str("<li><code>/&lt;nome_ies&gt;</code> - Todos os conteúdos de uma IES</li>\n");
    body.push_str(
        "<li><code>/&lt;nome_ies&gt;/&lt;semestre&gt;</code> - Conteúdos de uma IES por semestre</li>\n",
    );
    body.push_str("</ul>\n");

    if !catalog.is_empty() {
        body.push_str("<h2>IES Disponíveis (clique para acessar):</h2>\n<ul>\n");
        let mut names: Vec<&str> = catalog.institutions().map(|(name, _)| name).collect();
        sort_for_display(&mut names);
        for name in names {
            body.push_str(&format!(
                "<li><a class=\"button\" href=\"{}?format=html\">{}</a></li>\n",
                escape_html(&route_href(&[name])),
                escape_html(name)
            ));
        }
        body.push_str("</ul>\n");
    }

    document("API de Conteúdos de IES", None, &body)
}

pub fn institution_page(name: &str, institution: &InstitutionView) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>Conteúdos da IES {}</h1>\n", escape_html(name)));
    body.push_str("<p><a href=\"/\">← Voltar para página inicial</a></p>\n");
    body.push_str("<h2>Semestres disponíveis:</h2>\n<ul>\n");

    let mut semesters: Vec<&str> = institution
        .semesters
        .iter()
        .map(|semester| semester.name.as_str())
        .collect();
    sort_for_display(&mut semesters);
    for semester in semesters {
        body.push_str(&format!(
            "<li><a class=\"button\" href=\"{}?format=html\">Semestre {}</a></li>\n",
            escape_html(&route_href(&[name, semester])),
            escape_html(semester)
        ));
    }
    body.push_str("</ul>\n");

    document(&format!("Conteúdos da IES {name}"), None, &body)
}

pub fn semester_page(institution: &str, semester: &str, subjects: &[SubjectView]) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<p><a href=\"{}?format=html\">← Voltar para {}</a> | <a href=\"/\">Página inicial</a></p>\n",
        escape_html(&route_href(&[institution])),
        escape_html(institution)
    ));
    body.push_str(&format!(
        "<h1>IES {} - Semestre {}</h1>\n",
        escape_html(institution),
        escape_html(semester)
    ));

    for subject in subjects {
        body.push_str(&format!(
            "<div class=\"materia\"><h2>{}</h2></div>\n",
            escape_html(&subject.subject)
        ));
        for topic in &subject.topics {
            body.push_str(&format!(
                "<div class=\"tema\"><h3>{}</h3></div>\n",
                escape_html(&topic.topic)
            ));
            for subtopic in &topic.subtopics {
                body.push_str(&format!(
                    "<div class=\"subtema\"><h4>{}</h4></div>\n",
                    escape_html(&subtopic.subtopic)
                ));
                for lesson in &subtopic.lessons {
                    body.push_str(&lesson_html(lesson));
                }
            }
        }
    }

    document(
        &format!("Conteúdos da IES {institution} - Semestre {semester}"),
        None,
        &body,
    )
}

fn lesson_html(lesson: &Lesson) -> String {
    let mut out = format!(
        "<div class=\"aula\"><strong>{}</strong>",
        escape_html(&lesson.name)
    );
    let links = [
        (lesson.video_link.as_deref(), "Aula"),
        (lesson.pdf_link.as_deref(), "PDF"),
        (lesson.quiz_link.as_deref(), "Quiz"),
    ];
    for (href, label) in links {
        if let Some(href) = href {
            out.push_str(&format!(
                " | <a href=\"{}\" target=\"_blank\" rel=\"noopener\">{label}</a>",
                escape_html(href)
            ));
        }
    }
    out.push_str("</div>\n");
    out
}

pub fn reload_success_page(workbook: &Path, institutions: &[String]) -> String {
    let body = format!(
        "<div class=\"notice success\">\n<h2>Dados recarregados com sucesso!</h2>\n<p>Arquivo: {}</p>\n<p>IES carregadas: {}</p>\n{}</div>\n",
        escape_html(&workbook.display().to_string()),
        escape_html(&institutions.join(", ")),
        redirect_note(3),
    );
    document("Dados Recarregados", Some(3), &body)
}

pub fn reload_error_page(message: &str) -> String {
    let body = format!(
        "<div class=\"notice error\">\n<h2>Erro ao recarregar dados</h2>\n<p>{}</p>\n{}</div>\n",
        escape_html(message),
        redirect_note(5),
    );
    document("Erro ao Recarregar", Some(5), &body)
}

fn redirect_note(secs: u32) -> String {
    format!(
        "<p>Redirecionando para a página inicial em {secs} segundos...</p>\n<p><a href=\"/\">Clique aqui se não for redirecionado</a></p>\n"
    )
}

fn document(title: &str, refresh_secs: Option<u32>, body_html: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str("  <meta charset=\"utf-8\" />\n");
    out.push_str(&format!("  <title>{}</title>\n", escape_html(title)));
    if let Some(secs) = refresh_secs {
        out.push_str(&format!(
            "  <meta http-equiv=\"refresh\" content=\"{secs};url=/\" />\n"
        ));
    }
    out.push_str(&format!("  <style>{BASE_CSS}</style>\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str(body_html);
    out.push_str("</body>\n</html>\n");
    out
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Absolute path with each segment percent-encoded, e.g. `["IES A", "1"]` →
/// `/IES%20A/1`.
pub fn route_href(segments: &[&str]) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return "/".to_owned();
    };
    if let Ok(mut path) = url.path_segments_mut() {
        path.clear().extend(segments);
    }
    url.path().to_owned()
}

/// Numeric names ascending first, then the rest lexicographically.
fn sort_for_display(names: &mut [&str]) {
    names.sort_by(|a, b| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
}
