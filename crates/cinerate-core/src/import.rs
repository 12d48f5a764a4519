use anyhow::{anyhow, Result};
use cinerate_models::MovieDraft;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 7] = ["title", "description", "year", "genre", "director", "cast", "poster_url"];

/// One data row of an import file. `line` is the 1-based line in the file.
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub line: usize,
    pub draft: Result<MovieDraft, String>,
}

/// Parse a catalog CSV file.
///
/// Header problems fail the whole file; a row whose fields cannot be turned
/// into a draft is returned with the reason so the caller can report and skip it.
pub fn parse_movies_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ImportRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| anyhow!("Failed to open {}: {}", path.display(), e))?;
    parse_movies_reader(file)
}

pub fn parse_movies_reader<R: Read>(input: R) -> Result<Vec<ImportRow>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);

    let headers = reader.headers()?.clone();
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();

    let available_columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    debug!("Available CSV columns: {:?}", available_columns);

    for col in &REQUIRED_COLUMNS {
        if !header_map.contains_key(*col) {
            return Err(anyhow!(
                "Missing required column: {}. Available columns: {:?}",
                col,
                available_columns
            ));
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        // Header is line 1
        let fallback_line = rows.len() + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(fallback_line);
                rows.push(ImportRow { line, draft: Err(e.to_string()) });
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(fallback_line);
        if record.len() != headers.len() {
            rows.push(ImportRow {
                line,
                draft: Err(format!("expected {} fields, found {}", headers.len(), record.len())),
            });
            continue;
        }
        let field = |name: &str| record.get(header_map[name]).unwrap_or("").trim().to_string();

        let year = field("year");
        let draft = match year.parse::<i32>() {
            Ok(release_year) => Ok(MovieDraft {
                title: field("title"),
                description: field("description"),
                release_year,
                genre: field("genre"),
                director: field("director"),
                cast: split_cast(&field("cast")),
                poster_url: field("poster_url"),
            }),
            Err(_) => Err(format!("year '{}' is not a number", year)),
        };

        if rows.len() < 3 {
            debug!(line, title = %field("title"), "Parsed catalog CSV row");
        }
        rows.push(ImportRow { line, draft });
    }

    info!("Parsed {} catalog rows", rows.len());
    Ok(rows)
}

fn split_cast(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CSV: &str = "\
title,description,year,genre,director,cast,poster_url
Heat,Cops and robbers,1995,Crime,Michael Mann,Al Pacino|Robert De Niro,https://example.com/heat.jpg
Broken,Bad year,nineteen,Crime,Nobody,,https://example.com/b.jpg
\"Up, Again\",\"Balloons, house\",2009,Animation,Pete Docter,,https://example.com/up.jpg
";

    #[test]
    fn test_parse_rows_and_cast() {
        let rows = parse_movies_reader(CSV.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        let heat = rows[0].draft.as_ref().unwrap();
        assert_eq!(heat.title, "Heat");
        assert_eq!(heat.release_year, 1995);
        assert_eq!(heat.cast, vec!["Al Pacino", "Robert De Niro"]);
        assert_eq!(rows[0].line, 2);

        assert!(rows[1].draft.as_ref().unwrap_err().contains("nineteen"));
        assert_eq!(rows[1].line, 3);

        let up = rows[2].draft.as_ref().unwrap();
        assert_eq!(up.title, "Up, Again");
        assert!(up.cast.is_empty());
    }

    #[test]
    fn test_short_row_is_skipped_not_fatal() {
        let csv = "\
title,description,year,genre,director,cast,poster_url
Heat,Cops and robbers,1995,Crime,Michael Mann,Al Pacino,https://example.com/heat.jpg
Short,Row,2001
Up,Balloons,2009,Animation,Pete Docter,,https://example.com/up.jpg
";
        let rows = parse_movies_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].draft.as_ref().unwrap().title, "Heat");
        assert_eq!(rows[1].line, 3);
        assert!(rows[1].draft.as_ref().unwrap_err().contains("found 3"));
        assert_eq!(rows[2].draft.as_ref().unwrap().title, "Up");
    }

    #[test]
    fn test_missing_column() {
        let err = parse_movies_reader("title,year\nHeat,1995\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Missing required column: description"));
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        assert_eq!(parse_movies_csv(file.path()).unwrap().len(), 3);

        assert!(parse_movies_csv("/definitely/not/here.csv").is_err());
    }
}
