//! Parseo de la salida del modelo a un `TableOfContents`.
//!
//! Formas aceptadas, en este orden:
//! 1. JSON: un array de objetos `{ "title", "dataPoints" }` (o strings
//!    simples), opcionalmente dentro de un objeto (`{"chapters": [...]}`) y
//!    opcionalmente en un bloque de código markdown o rodeado de texto;
//! 2. una lista numerada, líneas `1. Título` seguidas de viñetas `-`/`*`.

use ebook_domain::{ChapterOutline, TableOfContents};
use serde_json::Value;

const WRAPPER_KEYS: [&str; 5] = ["chapters", "tableOfContents", "table_of_contents", "toc", "outline"];

/// # Errores
/// Un motivo legible cuando ninguna forma da un índice válido.
pub fn parse_table_of_contents(raw: &str) -> Result<TableOfContents, String> {
    let body = strip_code_fence(raw);
    let toc = parse_json(body).or_else(|| parse_json(raw.trim()))
                              .or_else(|| parse_numbered_list(body))
                              .ok_or_else(|| "could not read a table of contents from the generated text".to_string())?;
    toc.validate().map_err(|e| e.to_string())?;
    Ok(toc)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    // salta el info string (```json)
    let after = after.find('\n').map_or(after, |nl| &after[nl + 1..]);
    match after.find("```") {
        Some(end) => after[..end].trim(),
        None => after.trim(),
    }
}

fn parse_json(text: &str) -> Option<TableOfContents> {
    let value = serde_json::from_str::<Value>(text).ok().or_else(|| {
                                                          // tolera prosa alrededor del contenido
                                                          let start = text.find(['[', '{'])?;
                                                          let end = text.rfind([']', '}'])?;
                                                          (end > start).then(|| serde_json::from_str(&text[start..=end]).ok())
                                                                       .flatten()
                                                      })?;
    outline_from_value(&value)
}

fn outline_from_value(value: &Value) -> Option<TableOfContents> {
    match value {
        Value::Array(items) => items.iter().map(outline_entry).collect::<Option<Vec<_>>>().map(TableOfContents::new),
        Value::Object(map) => WRAPPER_KEYS.iter()
                                          .filter_map(|k| map.get(*k))
                                          .chain(map.values())
                                          .find(|v| v.is_array())
                                          .and_then(outline_from_value),
        _ => None,
    }
}

fn outline_entry(item: &Value) -> Option<ChapterOutline> {
    match item {
        Value::String(s) => Some(ChapterOutline::new(s.trim())),
        Value::Object(_) => serde_json::from_value::<ChapterOutline>(item.clone()).ok()
                                                                                  .map(|o| ChapterOutline { title: o.title.trim().to_string(),
                                                                                                            data_points: o.data_points })
                                                                                  .or_else(|| {
                                                                                      item.get("name")
                                                                                          .and_then(Value::as_str)
                                                                                          .map(ChapterOutline::new)
                                                                                  }),
        _ => None,
    }
}

fn parse_numbered_list(text: &str) -> Option<TableOfContents> {
    let mut chapters: Vec<ChapterOutline> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(title) = numbered_title(line) {
            chapters.push(ChapterOutline::new(title));
        } else if let Some(point) = bullet(line) {
            if let Some(current) = chapters.last_mut() {
                current.data_points.push(point.to_string());
            }
        }
    }
    (!chapters.is_empty()).then(|| TableOfContents::new(chapters))
}

/// `"3. Title"` o `"3) Title"` -> `"Title"`, quitando un prefijo `Chapter 3:`.
fn numbered_title(line: &str) -> Option<String> {
    let line = line.trim_start_matches('#').trim_start();
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(['.', ')'])?.trim();
    let rest = strip_chapter_prefix(rest).trim_matches('*').trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

fn strip_chapter_prefix(s: &str) -> &str {
    let lower = s.to_ascii_lowercase();
    if !lower.starts_with("chapter ") {
        return s;
    }
    match s.find(':') {
        Some(colon) => s[colon + 1..].trim_start(),
        None => s,
    }
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .map(str::trim)
        .filter(|p| !p.is_empty())
}
