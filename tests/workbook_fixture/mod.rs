use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use zip::write::SimpleFileOptions;

#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

pub struct Sheet<'a> {
    pub name: &'a str,
    pub rows: Vec<Vec<Cell<'a>>>,
}

impl<'a> Sheet<'a> {
    /// Text-only sheet; `""` leaves the cell out entirely.
    pub fn text(name: &'a str, rows: &[&[&'a str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.is_empty() { Cell::Blank } else { Cell::Text(v) })
                    .collect()
            })
            .collect();
        Self { name, rows }
    }
}

pub fn write_workbook(path: &Path, sheets: &[Sheet<'_>]) -> anyhow::Result<()> {
    let file =
        File::create(path).with_context(|| format!("create workbook: {}", path.display()))?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_owned(), content_types(sheets.len())),
        ("_rels/.rels".to_owned(), ROOT_RELS.to_owned()),
        ("xl/workbook.xml".to_owned(), workbook_xml(sheets)),
        (
            "xl/_rels/workbook.xml.rels".to_owned(),
            workbook_rels(sheets.len()),
        ),
    ];
    for (idx, sheet) in sheets.iter().enumerate() {
        parts.push((
            format!("xl/worksheets/sheet{}.xml", idx + 1),
            sheet_xml(sheet),
        ));
    }

    for (name, body) in parts {
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("start_file {name}"))?;
        zip.write_all(body.as_bytes())
            .with_context(|| format!("write {name}"))?;
    }
    zip.finish().context("finish workbook zip")?;
    Ok(())
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

fn content_types(sheet_count: usize) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    for idx in 1..=sheet_count {
        out.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }
    out.push_str("</Types>");
    out
}

fn workbook_xml(sheets: &[Sheet<'_>]) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    for (idx, sheet) in sheets.iter().enumerate() {
        out.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            xml_escape(sheet.name),
            idx + 1,
            idx + 1
        ));
    }
    out.push_str("</sheets></workbook>");
    out
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for idx in 1..=sheet_count {
        out.push_str(&format!(
            r#"<Relationship Id="rId{idx}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        ));
    }
    out.push_str("</Relationships>");
    out
}

fn sheet_xml(sheet: &Sheet<'_>) -> String {
    let mut out = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in sheet.rows.iter().enumerate() {
        out.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), r + 1);
            match cell {
                Cell::Text(text) => out.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    xml_escape(text)
                )),
                Cell::Number(n) => {
                    out.push_str(&format!(r#"<c r="{reference}"><v>{n}</v></c>"#))
                }
                Cell::Blank => {}
            }
        }
        out.push_str("</row>");
    }
    out.push_str("</sheetData></worksheet>");
    out
}

fn column_name(mut idx: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
